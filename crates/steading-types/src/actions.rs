//! Action descriptors: what an agent is currently doing and at what.
//!
//! A [`CurrentAction`] is the single directive slot on an agent. The
//! orchestrator treats an empty slot as "done, give me a new directive".
//! Targets are parsed from planner step identifiers by the plan executor
//! and stay typed from there on.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{ActionType, ItemKind, StructureKind};
use crate::ids::ContractId;

/// The target of an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionTarget {
    /// No target (idle, sleep).
    None,
    /// Another entity in the registry, by raw id.
    Entity(Uuid),
    /// An item kind (eat, craft outputs).
    Item(ItemKind),
    /// An item held by a container entity — the composite
    /// `container|item` key used by buy/sell/store/retrieve.
    Stored {
        /// The structure holding (or receiving) the item.
        container: Uuid,
        /// The item kind being moved.
        item: ItemKind,
    },
    /// A contract in the contract book.
    Contract(ContractId),
    /// A structure kind (contract drafting).
    Structure(StructureKind),
    /// A well-known named landmark (move fallback).
    Landmark(String),
}

/// The action currently assigned to an agent: a type plus its target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAction {
    /// What the agent is doing.
    pub action: ActionType,
    /// What the action operates on.
    pub target: ActionTarget,
}

impl CurrentAction {
    /// Build a descriptor.
    pub const fn new(action: ActionType, target: ActionTarget) -> Self {
        Self { action, target }
    }

    /// The idle fallback directive.
    pub const fn idle() -> Self {
        Self {
            action: ActionType::Idle,
            target: ActionTarget::None,
        }
    }
}

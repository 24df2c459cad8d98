//! Per-tick changesets and full state snapshots for remote observers.
//!
//! The core exposes two fidelities of change log, built from the entity
//! registry's drained mutation events:
//!
//! - The **full cast** carries every created entity's snapshot, every
//!   update's top-level field diff, and every removal. It is enough to
//!   mirror authoritative state field-by-field.
//! - The **limited cast** carries only position moves, newly-created
//!   entities (kind + position), and removed ids — enough to keep a
//!   remote renderer visually correct without exposing entity detail.
//!
//! Consumers read these; they never mutate the registry directly.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use steading_types::{Agent, EntityKind, EntityRef, Position, Resource, Structure};

use crate::registry::{EntityEvent, EntityRegistry};

/// One entry in the full-fidelity cast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FullChange {
    /// An entity was created; carries its full serialized record.
    Created {
        /// The created entity.
        entity: EntityRef,
        /// Full serialized record at creation.
        snapshot: Value,
    },
    /// An entity changed; carries the top-level field diff.
    Updated {
        /// The mutated entity.
        entity: EntityRef,
        /// Changed top-level fields with their new values.
        fields: BTreeMap<String, Value>,
    },
    /// An entity was removed.
    Removed {
        /// The removed entity.
        entity: EntityRef,
    },
}

/// One entry in the limited (renderer-sufficient) cast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LimitedChange {
    /// An entity moved.
    Moved {
        /// The entity that moved.
        entity: EntityRef,
        /// Its new position.
        position: Position,
    },
    /// An entity appeared.
    Created {
        /// The new entity.
        entity: EntityRef,
        /// Where it appeared.
        position: Position,
    },
    /// An entity disappeared.
    Removed {
        /// The removed entity.
        entity: EntityRef,
    },
}

/// The per-tick change log at both fidelities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ChangeSet {
    /// The tick these changes belong to.
    pub tick: u64,
    /// Full-fidelity entries.
    pub full: Vec<FullChange>,
    /// Renderer-sufficient entries.
    pub limited: Vec<LimitedChange>,
}

impl ChangeSet {
    /// Whether the tick produced no changes at all.
    pub const fn is_empty(&self) -> bool {
        self.full.is_empty() && self.limited.is_empty()
    }
}

/// Build the tick's changeset from drained registry events.
///
/// Updates that did not move the entity are full-cast only; the limited
/// cast stays silent about them.
pub fn build_changeset(tick: u64, events: Vec<EntityEvent>) -> ChangeSet {
    let mut full = Vec::new();
    let mut limited = Vec::new();

    for event in events {
        match event {
            EntityEvent::Created {
                entity,
                position,
                snapshot,
            } => {
                full.push(FullChange::Created { entity, snapshot });
                limited.push(LimitedChange::Created { entity, position });
            }
            EntityEvent::Updated {
                entity,
                fields,
                moved,
            } => {
                full.push(FullChange::Updated { entity, fields });
                if let Some(position) = moved {
                    limited.push(LimitedChange::Moved { entity, position });
                }
            }
            EntityEvent::Removed { entity } => {
                full.push(FullChange::Removed { entity });
                limited.push(LimitedChange::Removed { entity });
            }
        }
    }

    ChangeSet {
        tick,
        full,
        limited,
    }
}

/// A full authoritative snapshot of world state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// The tick the snapshot was taken at.
    pub tick: u64,
    /// All agents.
    pub agents: Vec<Agent>,
    /// All resources.
    pub resources: Vec<Resource>,
    /// All structures.
    pub structures: Vec<Structure>,
}

/// Take a full snapshot of the registry.
pub fn snapshot(registry: &EntityRegistry, tick: u64) -> WorldSnapshot {
    WorldSnapshot {
        tick,
        agents: registry.agents().cloned().collect(),
        resources: registry.resources().cloned().collect(),
        structures: registry.structures().cloned().collect(),
    }
}

//! Shared type definitions for the Steading simulation.
//!
//! This crate is the single source of truth for all data shapes used
//! across the workspace.
//!
//! # Modules
//!
//! - [`ids`] — Type-safe UUID wrappers for all entity identifiers
//! - [`geometry`] — Positions on the continuous world plane
//! - [`enums`] — Closed vocabularies (kinds, actions, goals, contracts)
//! - [`structs`] — Entity records and their attached state
//! - [`actions`] — The current-action descriptor and its targets
//! - [`perception`] — Sighting payloads and the planner wire protocol

pub mod actions;
pub mod enums;
pub mod geometry;
pub mod ids;
pub mod perception;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use actions::{ActionTarget, CurrentAction};
pub use enums::{
    ActionType, ConditionOp, ContextState, ContractStatus, EntityKind, GoalKind, ItemKind,
    ResourceKind, SkillKind, StorageClass, StructureKind,
};
pub use geometry::Position;
pub use ids::{AgentId, ContractId, EntityRef, GoalId, ResourceId, StructureId};
pub use perception::{
    AgentView, CandidateAction, PlanRequest, ScoredAction, SightedEntity, UtilityRequest,
};
pub use structs::{
    ActionProgress, Agent, Condition, Contract, Goal, ItemStack, MemoryItem, Needs, Personality,
    Plan, Resource, Skills, Stats, Structure, WorkProgress,
};

//! Error types for agent cognition and action execution.
//!
//! Every variant here is a *validation failure* or *invariant warning*
//! in the spec's taxonomy: non-fatal, logged by the orchestrator, and
//! resolved by resetting the agent to idle so it can re-plan. Nothing
//! in this enum should ever abort a tick.

use rust_decimal::Decimal;

use steading_types::{ContractStatus, ItemKind, SkillKind, StructureKind};

/// Errors from action validation and execution.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ActionError {
    /// The actor is too far from its target.
    #[error("out of range: {distance:.2} units away, limit {limit:.2}")]
    OutOfRange {
        /// Actual distance to the target.
        distance: f64,
        /// Maximum allowed distance for this action.
        limit: f64,
    },

    /// The action target does not resolve to a live entity.
    #[error("target entity no longer exists")]
    EntityMissing,

    /// The target entity exists but is the wrong kind or subtype for
    /// this action.
    #[error("wrong target subtype: {found}")]
    WrongSubtype {
        /// What the target actually is.
        found: String,
    },

    /// A harvest action is missing its required tool.
    #[error("missing tool: {tool:?}")]
    MissingTool {
        /// The tool kind required.
        tool: ItemKind,
    },

    /// Not enough of an input item.
    #[error("missing materials: need {needed} {item:?}, have {have}")]
    MissingMaterials {
        /// The item in short supply.
        item: ItemKind,
        /// Quantity required.
        needed: u32,
        /// Quantity actually held.
        have: u32,
    },

    /// Not enough money for a purchase or payment.
    #[error("insufficient funds: need {needed}, have {have}")]
    InsufficientFunds {
        /// Amount required.
        needed: Decimal,
        /// Amount actually held.
        have: Decimal,
    },

    /// The agent's hands/inventory are in the wrong state for a pickup
    /// or placement (full hands, missing container, no sack).
    #[error("invalid carry state: {reason}")]
    InvalidCarryState {
        /// What was wrong.
        reason: String,
    },

    /// A station-gated recipe has no workstation within reach.
    #[error("no {station:?} within reach")]
    NoWorkstation {
        /// The workstation kind the recipe requires.
        station: StructureKind,
    },

    /// The item cannot be eaten.
    #[error("{item:?} is not edible")]
    Inedible {
        /// The item in question.
        item: ItemKind,
    },

    /// A skill-gated recipe is above the agent's skill.
    #[error("skill too low: {skill:?} {have} < {needed}")]
    SkillTooLow {
        /// The gating skill.
        skill: SkillKind,
        /// Level required.
        needed: u32,
        /// Level actually held.
        have: u32,
    },

    /// No recipe produces the requested output.
    #[error("no recipe for {output:?}")]
    UnknownRecipe {
        /// The requested output item.
        output: ItemKind,
    },

    /// A contract transition was attempted out of order. The contract
    /// is left untouched.
    #[error("invalid contract status: expected {expected:?}, found {found:?}")]
    InvalidContractStatus {
        /// The status the transition requires.
        expected: ContractStatus,
        /// The contract's actual status.
        found: ContractStatus,
    },

    /// The acting agent holds the wrong role for a contract transition.
    #[error("wrong contract role: {reason}")]
    WrongRole {
        /// Why the actor is not allowed to drive this transition.
        reason: String,
    },

    /// A planner step identifier did not parse into a known action.
    #[error("unknown action step: {step}")]
    UnknownStep {
        /// The unparseable identifier.
        step: String,
    },

    /// The action's target variant does not fit the action type.
    #[error("malformed target for this action")]
    MalformedTarget,
}

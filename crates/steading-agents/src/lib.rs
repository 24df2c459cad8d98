//! Agent cognition and action execution for the Steading simulation.
//!
//! Everything between "the tick fired" and "the world changed" lives
//! here: item handling, need drift, skill growth, the memory model,
//! goal generation and queueing, the plan executor, and the action
//! execution engine with its per-type handlers.
//!
//! # Modules
//!
//! - [`items`] — Static item catalog (carry classes, prices, nutrition)
//! - [`inventory`] — Stack-list operations shared by agents and
//!   structures
//! - [`needs`] — Per-tick need drift
//! - [`skills`] — Skill growth and duration modifiers
//! - [`memory`] — Remembered locations with reinforcement and decay
//! - [`goals`] — Need/context goal generation and the goal store
//! - [`plan`] — Step translation, durations, and the plan cursor
//! - [`actions`] — The dispatch engine and per-type handlers
//! - [`error`] — The non-fatal validation error taxonomy

pub mod actions;
pub mod error;
pub mod goals;
pub mod inventory;
pub mod items;
pub mod memory;
pub mod needs;
pub mod plan;
pub mod skills;

pub use actions::{ActionEffect, execute};
pub use error::ActionError;
pub use goals::GoalStore;
pub use memory::VisibilityTracker;
pub use plan::StartOutcome;

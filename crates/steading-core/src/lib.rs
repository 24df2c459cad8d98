//! Tick scheduling and agent update orchestration for the Steading
//! simulation.
//!
//! # Modules
//!
//! - [`scheduler`] — The wall-clock-to-tick boundary with pause/speed
//!   controls
//! - [`orchestrator`] — The per-tick, per-agent update pipeline
//! - [`perception`] — Sighting assembly and planner-facing agent views
//! - [`planner`] — The `PlanSource` seam, mailbox, and stub
//! - [`config`] — YAML-backed simulation configuration

pub mod config;
pub mod orchestrator;
pub mod perception;
pub mod planner;
pub mod scheduler;

pub use config::{ConfigError, SimConfig, WorldConfig};
pub use orchestrator::{SimState, TickReport, step_world};
pub use planner::{PlanError, PlanOutcome, PlanSource, PlannerMailbox, StubPlanner, dispatch_requests};
pub use scheduler::{SchedulerError, SchedulerHandle, SchedulerStatus, TickScheduler, VALID_SPEEDS};

//! Control surface API for the Steading simulation.
//!
//! A thin Axum layer over the tick scheduler and entity registry:
//! play/pause/speed/status, world generation and snapshots, the
//! changeset feed for remote renderers, entity editing, and a
//! passthrough to the planner's utility scorer. All decision logic
//! stays in `steading-core`; this crate only routes commands and reads
//! snapshots.
//!
//! The `steading-server` binary in this crate wires configuration,
//! world generation, the scheduler, the simulation loop, and the HTTP
//! server together.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use server::tick_loop;
pub use state::AppState;

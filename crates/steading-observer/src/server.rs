//! The tick-driven simulation loop and HTTP serving.
//!
//! [`tick_loop`] subscribes to the scheduler's tick events and, for
//! each tick: takes the write lock, runs the orchestrator's
//! [`step_world`], dispatches any queued planner requests as
//! fire-and-continue tasks, then records the tick's changeset for the
//! `/world/changes` endpoint. The lock is never held across the
//! planner's network calls.

use std::sync::Arc;

use tokio::sync::{RwLock, broadcast};
use tracing::{info, warn};

use steading_core::{SimState, dispatch_requests, step_world};
use steading_planner::HttpPlanner;

use crate::state::AppState;

/// Drive the simulation from tick events until the channel closes.
pub async fn tick_loop(
    app: AppState,
    sim: Arc<RwLock<SimState>>,
    planner: Arc<HttpPlanner>,
    mut ticks: broadcast::Receiver<u64>,
) {
    loop {
        let tick = match ticks.recv().await {
            Ok(tick) => tick,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                // The loop fell behind the scheduler; resume from the
                // newest tick rather than replaying.
                warn!(skipped, "tick loop lagged behind the scheduler");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => {
                info!("tick channel closed, simulation loop exiting");
                return;
            }
        };

        let changes = {
            let mut state = sim.write().await;
            let report = step_world(&mut state, tick);
            dispatch_requests(&mut state.mailbox, &planner);
            report.changes
        };

        if !changes.is_empty() {
            app.record_changes(changes).await;
        }
    }
}

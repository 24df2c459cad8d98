//! Shared application state for the control surface.
//!
//! [`AppState`] bundles the locked simulation state, the scheduler
//! control handle, the planner client, and a bounded ring of recent
//! changesets. Handlers take read or write locks briefly and never
//! hold them across awaits into the planner.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use steading_core::SimState;
use steading_core::scheduler::SchedulerHandle;
use steading_planner::HttpPlanner;
use steading_world::ChangeSet;

/// How many recent changesets the surface retains for `/world/changes`.
pub const CHANGE_RETENTION: usize = 256;

/// Shared state behind every handler.
#[derive(Clone)]
pub struct AppState {
    /// The complete simulation state.
    pub sim: Arc<RwLock<SimState>>,
    /// Scheduler control handle.
    pub scheduler: SchedulerHandle,
    /// Client for the external planning service.
    pub planner: Arc<HttpPlanner>,
    /// Ring of the most recent changesets, oldest first.
    pub changes: Arc<RwLock<VecDeque<ChangeSet>>>,
    /// Wall-clock time the server came up. Operational metadata only:
    /// simulation time stays behind the scheduler's tick boundary.
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Assemble the shared state.
    pub fn new(
        sim: Arc<RwLock<SimState>>,
        scheduler: SchedulerHandle,
        planner: Arc<HttpPlanner>,
    ) -> Self {
        Self {
            sim,
            scheduler,
            planner,
            changes: Arc::new(RwLock::new(VecDeque::new())),
            started_at: Utc::now(),
        }
    }

    /// Append a tick's changeset, evicting the oldest past retention.
    pub async fn record_changes(&self, set: ChangeSet) {
        let mut ring = self.changes.write().await;
        ring.push_back(set);
        while ring.len() > CHANGE_RETENTION {
            ring.pop_front();
        }
    }
}

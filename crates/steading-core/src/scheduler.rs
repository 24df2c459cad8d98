//! The tick scheduler: the simulation's only wall-clock boundary.
//!
//! A tokio timer task maps wall-clock time onto the logical tick
//! counter. The period is `base_interval / multiplier` with the
//! multiplier restricted to {1, 2, 4, 8, 16}; each firing, when not
//! paused, increments the counter and broadcasts the new tick exactly
//! once — strictly increasing, no skips, while the task runs
//! uninterrupted. Speed changes wake the task so the period restarts
//! deterministically without touching the counter; pausing freezes
//! tick advancement without stopping the timer itself.
//!
//! No other component may read the wall clock.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::{Notify, broadcast};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// The accepted speed multipliers.
pub const VALID_SPEEDS: &[u64] = &[1, 2, 4, 8, 16];

/// Broadcast capacity for tick events; slow subscribers lag rather
/// than block the timer.
const TICK_CHANNEL_CAPACITY: usize = 1024;

/// Errors from scheduler operations.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// The requested multiplier is not one of {1, 2, 4, 8, 16}.
    #[error("invalid speed multiplier {value}: must be one of 1, 2, 4, 8, 16")]
    InvalidSpeed {
        /// The rejected multiplier.
        value: u64,
    },

    /// `start` was called while the timer task is already running.
    #[error("scheduler is already running")]
    AlreadyRunning,
}

/// Snapshot of the scheduler's control state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStatus {
    /// Whether tick advancement is paused.
    pub paused: bool,
    /// The current speed multiplier.
    pub speed: u64,
    /// The current tick number.
    pub tick: u64,
    /// Whether the timer task is running.
    pub running: bool,
}

/// State shared between the control surface and the timer task.
#[derive(Debug)]
struct Shared {
    /// The logical tick counter.
    tick: AtomicU64,
    /// Whether tick advancement is paused.
    paused: AtomicBool,
    /// The current speed multiplier.
    speed: AtomicU64,
    /// Whether the timer task should keep running.
    running: AtomicBool,
    /// Base timer period at speed 1, in milliseconds.
    base_interval_ms: u64,
    /// Wakes the timer task on speed changes and stop requests.
    control_changed: Notify,
    /// Tick event fan-out.
    sender: broadcast::Sender<u64>,
}

/// The tick scheduler handle.
///
/// Cheap to share via [`TickScheduler::handle`]; the timer task is
/// owned by the instance that called [`start`](Self::start).
#[derive(Debug)]
pub struct TickScheduler {
    /// Shared control state.
    shared: Arc<Shared>,
    /// The running timer task, if started.
    task: Option<JoinHandle<()>>,
}

/// A cloneable control handle onto a running scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerHandle {
    /// Shared control state.
    shared: Arc<Shared>,
}

impl TickScheduler {
    /// Create a scheduler with the given base interval (period at
    /// speed 1). Intervals of zero are clamped to 1 ms.
    pub fn new(base_interval_ms: u64) -> Self {
        let (sender, _) = broadcast::channel(TICK_CHANNEL_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                tick: AtomicU64::new(0),
                paused: AtomicBool::new(false),
                speed: AtomicU64::new(1),
                running: AtomicBool::new(false),
                base_interval_ms: base_interval_ms.max(1),
                control_changed: Notify::new(),
                sender,
            }),
            task: None,
        }
    }

    /// A cloneable control handle (pause/resume/speed/status/
    /// subscribe) onto this scheduler.
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Subscribe to tick events.
    pub fn subscribe(&self) -> broadcast::Receiver<u64> {
        self.shared.sender.subscribe()
    }

    /// Start the timer task.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::AlreadyRunning`] if it is already up.
    pub fn start(&mut self) -> Result<(), SchedulerError> {
        if self.shared.running.swap(true, Ordering::AcqRel) {
            return Err(SchedulerError::AlreadyRunning);
        }
        let shared = Arc::clone(&self.shared);
        info!(
            base_interval_ms = shared.base_interval_ms,
            "tick scheduler starting"
        );
        self.task = Some(tokio::spawn(run_timer(shared)));
        Ok(())
    }

    /// Stop the timer task. The tick counter is preserved.
    pub fn stop(&mut self) {
        self.shared.running.store(false, Ordering::Release);
        self.shared.control_changed.notify_waiters();
        if let Some(task) = self.task.take() {
            task.abort();
        }
        info!(tick = self.shared.tick.load(Ordering::Acquire), "tick scheduler stopped");
    }

    /// Pause tick advancement. The timer keeps firing but emits
    /// nothing.
    pub fn pause(&self) {
        self.shared.paused.store(true, Ordering::Release);
    }

    /// Resume tick advancement.
    pub fn resume(&self) {
        self.shared.paused.store(false, Ordering::Release);
    }

    /// Change the speed multiplier, restarting the timer period
    /// without losing the current tick.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidSpeed`] for any multiplier
    /// outside {1, 2, 4, 8, 16}.
    pub fn set_speed(&self, multiplier: u64) -> Result<(), SchedulerError> {
        if !VALID_SPEEDS.contains(&multiplier) {
            return Err(SchedulerError::InvalidSpeed { value: multiplier });
        }
        self.shared.speed.store(multiplier, Ordering::Release);
        self.shared.control_changed.notify_waiters();
        debug!(multiplier, "tick speed changed");
        Ok(())
    }

    /// Force the tick counter (state restoration).
    pub fn set_tick(&self, tick: u64) {
        self.shared.tick.store(tick, Ordering::Release);
    }

    /// Snapshot the control state.
    pub fn status(&self) -> SchedulerStatus {
        status_of(&self.shared)
    }
}

impl Drop for TickScheduler {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl SchedulerHandle {
    /// Subscribe to tick events.
    pub fn subscribe(&self) -> broadcast::Receiver<u64> {
        self.shared.sender.subscribe()
    }

    /// Pause tick advancement.
    pub fn pause(&self) {
        self.shared.paused.store(true, Ordering::Release);
    }

    /// Resume tick advancement.
    pub fn resume(&self) {
        self.shared.paused.store(false, Ordering::Release);
    }

    /// Change the speed multiplier.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidSpeed`] for any multiplier
    /// outside {1, 2, 4, 8, 16}.
    pub fn set_speed(&self, multiplier: u64) -> Result<(), SchedulerError> {
        if !VALID_SPEEDS.contains(&multiplier) {
            return Err(SchedulerError::InvalidSpeed { value: multiplier });
        }
        self.shared.speed.store(multiplier, Ordering::Release);
        self.shared.control_changed.notify_waiters();
        Ok(())
    }

    /// Force the tick counter (state restoration).
    pub fn set_tick(&self, tick: u64) {
        self.shared.tick.store(tick, Ordering::Release);
    }

    /// Snapshot the control state.
    pub fn status(&self) -> SchedulerStatus {
        status_of(&self.shared)
    }
}

/// Shared status snapshot.
fn status_of(shared: &Shared) -> SchedulerStatus {
    SchedulerStatus {
        paused: shared.paused.load(Ordering::Acquire),
        speed: shared.speed.load(Ordering::Acquire),
        tick: shared.tick.load(Ordering::Acquire),
        running: shared.running.load(Ordering::Acquire),
    }
}

/// The timer loop: sleep one period, then emit one tick unless paused.
///
/// A control change (speed or stop) interrupts the sleep and restarts
/// the period, so speed changes take effect deterministically and
/// never double-fire a tick.
async fn run_timer(shared: Arc<Shared>) {
    loop {
        if !shared.running.load(Ordering::Acquire) {
            break;
        }
        let speed = shared.speed.load(Ordering::Acquire).max(1);
        let period_ms = shared.base_interval_ms.checked_div(speed).unwrap_or(1).max(1);
        let period = tokio::time::Duration::from_millis(period_ms);

        tokio::select! {
            () = tokio::time::sleep(period) => {
                if !shared.running.load(Ordering::Acquire) {
                    break;
                }
                if !shared.paused.load(Ordering::Acquire) {
                    let tick = shared.tick.fetch_add(1, Ordering::AcqRel).saturating_add(1);
                    // Nobody listening is fine; send only fails then.
                    let _ = shared.sender.send(tick);
                }
            }
            () = shared.control_changed.notified() => {
                // Speed changed or stop requested: restart the period.
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::{Duration, timeout};

    use super::*;

    /// Collect the next `n` ticks from a receiver.
    async fn collect_ticks(rx: &mut broadcast::Receiver<u64>, n: usize) -> Vec<u64> {
        let mut out = Vec::new();
        for _ in 0..n {
            match rx.recv().await {
                Ok(tick) => out.push(tick),
                Err(_) => break,
            }
        }
        out
    }

    #[test]
    fn speed_validation_accepts_exactly_the_five_multipliers() {
        let scheduler = TickScheduler::new(1000);
        for speed in [1, 2, 4, 8, 16] {
            assert!(scheduler.set_speed(speed).is_ok(), "speed {speed}");
        }
        for speed in [0, 3, 5, 10, 32, 100] {
            assert!(
                matches!(
                    scheduler.set_speed(speed),
                    Err(SchedulerError::InvalidSpeed { value }) if value == speed
                ),
                "speed {speed}"
            );
        }
    }

    #[test]
    fn set_tick_restores_counter() {
        let scheduler = TickScheduler::new(1000);
        scheduler.set_tick(100);
        let status = scheduler.status();
        assert_eq!(status.tick, 100);
        assert!(!status.running);
    }

    #[test]
    fn status_reflects_controls() {
        let scheduler = TickScheduler::new(1000);
        scheduler.pause();
        let _ = scheduler.set_speed(8);
        let status = scheduler.status();
        assert!(status.paused);
        assert_eq!(status.speed, 8);

        scheduler.resume();
        assert!(!scheduler.status().paused);
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_are_strictly_monotonic() {
        let mut scheduler = TickScheduler::new(100);
        let mut rx = scheduler.subscribe();
        assert!(scheduler.start().is_ok());

        let ticks = collect_ticks(&mut rx, 5).await;
        assert_eq!(ticks, vec![1, 2, 3, 4, 5]);

        scheduler.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn paused_scheduler_emits_nothing() {
        let mut scheduler = TickScheduler::new(100);
        let mut rx = scheduler.subscribe();
        assert!(scheduler.start().is_ok());
        scheduler.pause();

        let result = timeout(Duration::from_millis(500), rx.recv()).await;
        assert!(result.is_err(), "no ticks while paused");

        // Resuming picks up from the same counter, no skips.
        scheduler.resume();
        let ticks = collect_ticks(&mut rx, 2).await;
        assert_eq!(ticks, vec![1, 2]);

        scheduler.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn speed_change_keeps_the_counter() {
        let mut scheduler = TickScheduler::new(160);
        let mut rx = scheduler.subscribe();
        assert!(scheduler.start().is_ok());

        let first = collect_ticks(&mut rx, 3).await;
        assert_eq!(first, vec![1, 2, 3]);

        let _ = scheduler.set_speed(16);
        let after = collect_ticks(&mut rx, 3).await;
        assert_eq!(after, vec![4, 5, 6]);

        scheduler.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn set_tick_mid_run_renumbers_the_stream() {
        let mut scheduler = TickScheduler::new(100);
        let mut rx = scheduler.subscribe();
        assert!(scheduler.start().is_ok());

        let _ = collect_ticks(&mut rx, 1).await;
        scheduler.set_tick(100);
        let next = collect_ticks(&mut rx, 1).await;
        assert_eq!(next, vec![101]);
        assert_eq!(scheduler.status().tick, 101);

        scheduler.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn double_start_is_rejected() {
        let mut scheduler = TickScheduler::new(100);
        assert!(scheduler.start().is_ok());
        assert!(matches!(
            scheduler.start(),
            Err(SchedulerError::AlreadyRunning)
        ));
        scheduler.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn handle_controls_a_running_scheduler() {
        let mut scheduler = TickScheduler::new(100);
        let handle = scheduler.handle();
        let mut rx = handle.subscribe();
        assert!(scheduler.start().is_ok());

        let _ = collect_ticks(&mut rx, 2).await;
        handle.pause();
        assert!(handle.status().paused);
        let result = timeout(Duration::from_millis(300), rx.recv()).await;
        assert!(result.is_err());

        scheduler.stop();
    }
}

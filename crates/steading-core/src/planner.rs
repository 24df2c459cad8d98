//! The planner seam: the [`PlanSource`] trait, the request/response
//! mailbox, and the in-process stub.
//!
//! The external planner is fallible and latency-bearing, and the
//! orchestrator is strictly sequential within a tick — so planner I/O
//! is fire-and-continue. The orchestrator writes requests into the
//! [`PlannerMailbox`] outbox; [`dispatch_requests`] spawns one task
//! per request against the `PlanSource`; completed outcomes land on an
//! unbounded channel the orchestrator polls at the next tick boundary.
//! A pending call never stalls the rest of the tick's agents.
//!
//! The mailbox also enforces the per-agent cooldown between planning
//! requests and the one-in-flight-per-agent rule.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use steading_types::{AgentId, GoalId, PlanRequest, ScoredAction, UtilityRequest};

/// Errors from the external planning dependency.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// The service could not be reached or timed out.
    #[error("planner unreachable: {message}")]
    Unreachable {
        /// Transport-level detail.
        message: String,
    },

    /// The service answered with something unparseable.
    #[error("planner protocol error: {message}")]
    Protocol {
        /// What was wrong with the response.
        message: String,
    },

    /// The service answered but produced no plan.
    #[error("planner returned no plan")]
    Empty,
}

/// A source of plans and action scores.
///
/// Implemented by the HTTP client against the real planning service
/// and by [`StubPlanner`] for tests and offline runs. Both calls must
/// be treated as fallible and slow.
pub trait PlanSource: Send + Sync {
    /// Convert a goal into an ordered list of action step identifiers.
    fn plan(
        &self,
        request: PlanRequest,
    ) -> impl Future<Output = Result<Vec<String>, PlanError>> + Send;

    /// Score candidate actions and return the best with its utility.
    fn best_action(
        &self,
        request: UtilityRequest,
    ) -> impl Future<Output = Result<ScoredAction, PlanError>> + Send;
}

/// A completed planning call.
#[derive(Debug)]
pub struct PlanOutcome {
    /// The agent the plan is for.
    pub agent_id: AgentId,
    /// The goal the request was made against.
    pub goal_id: GoalId,
    /// The planner's answer.
    pub result: Result<Vec<String>, PlanError>,
}

/// Request/response plumbing between the orchestrator and the planner
/// tasks.
#[derive(Debug)]
pub struct PlannerMailbox {
    /// Requests written this tick, awaiting dispatch.
    outbox: Vec<PlanRequest>,
    /// Agents with a call in flight.
    in_flight: BTreeSet<AgentId>,
    /// Tick of each agent's most recent request.
    last_request: BTreeMap<AgentId, u64>,
    /// Outcome sender handed to planner tasks.
    tx: mpsc::UnboundedSender<PlanOutcome>,
    /// Outcome receiver polled at tick boundaries.
    rx: mpsc::UnboundedReceiver<PlanOutcome>,
}

impl Default for PlannerMailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl PlannerMailbox {
    /// Create an empty mailbox.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            outbox: Vec::new(),
            in_flight: BTreeSet::new(),
            last_request: BTreeMap::new(),
            tx,
            rx,
        }
    }

    /// Whether this agent may issue a planning request now: nothing in
    /// flight and at least `cooldown` ticks since its last request.
    pub fn can_request(&self, agent: AgentId, tick: u64, cooldown: u64) -> bool {
        if self.in_flight.contains(&agent) {
            return false;
        }
        self.last_request
            .get(&agent)
            .is_none_or(|last| tick.saturating_sub(*last) >= cooldown)
    }

    /// Queue a request and record the request tick.
    pub fn enqueue(&mut self, request: PlanRequest) {
        self.in_flight.insert(request.agent.id);
        self.last_request.insert(request.agent.id, request.tick);
        self.outbox.push(request);
    }

    /// Drain the outbox for dispatch.
    pub fn take_requests(&mut self) -> Vec<PlanRequest> {
        std::mem::take(&mut self.outbox)
    }

    /// A sender for planner tasks to deliver outcomes on.
    pub fn sender(&self) -> mpsc::UnboundedSender<PlanOutcome> {
        self.tx.clone()
    }

    /// Collect every outcome that has landed since the last poll,
    /// clearing the in-flight marks.
    pub fn poll(&mut self) -> Vec<PlanOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(outcome) = self.rx.try_recv() {
            self.in_flight.remove(&outcome.agent_id);
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Number of requests currently in flight.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }
}

/// Spawn one planning task per queued request.
///
/// Each task calls the `PlanSource` and posts its outcome back on the
/// mailbox channel; nothing here blocks the tick loop.
pub fn dispatch_requests<P>(mailbox: &mut PlannerMailbox, planner: &Arc<P>)
where
    P: PlanSource + 'static,
{
    for request in mailbox.take_requests() {
        let tx = mailbox.sender();
        let planner = Arc::clone(planner);
        tokio::spawn(async move {
            let agent_id = request.agent.id;
            let goal_id = request.goal.id;
            let result = planner.plan(request).await;
            debug!(agent = %agent_id, ok = result.is_ok(), "planner call finished");
            let _ = tx.send(PlanOutcome {
                agent_id,
                goal_id,
                result,
            });
        });
    }
}

// ---------------------------------------------------------------------------
// Stub
// ---------------------------------------------------------------------------

/// A deterministic in-process planner for tests and offline runs.
///
/// Maps a goal's first condition key to a canned step list; the
/// failing variant always reports the service as unreachable.
#[derive(Debug, Clone, Default)]
pub struct StubPlanner {
    /// When set, every call fails as unreachable.
    fail: bool,
}

impl StubPlanner {
    /// A stub that always answers.
    pub const fn new() -> Self {
        Self { fail: false }
    }

    /// A stub that always fails (planner-outage tests).
    pub const fn failing() -> Self {
        Self { fail: true }
    }
}

impl PlanSource for StubPlanner {
    async fn plan(&self, request: PlanRequest) -> Result<Vec<String>, PlanError> {
        if self.fail {
            return Err(PlanError::Unreachable {
                message: String::from("stub configured to fail"),
            });
        }
        let key = request
            .goal
            .conditions
            .first()
            .map_or("", |c| c.key.as_str());
        let steps = match key {
            "hunger" => vec![String::from("eat_berry")],
            "energy" => vec![String::from("sleep")],
            "social" => vec![String::from("socialize")],
            _ => vec![String::from("idle")],
        };
        Ok(steps)
    }

    async fn best_action(&self, request: UtilityRequest) -> Result<ScoredAction, PlanError> {
        if self.fail {
            return Err(PlanError::Unreachable {
                message: String::from("stub configured to fail"),
            });
        }
        request
            .options
            .first()
            .map(|option| ScoredAction {
                name: option.name.clone(),
                utility: 1.0,
            })
            .ok_or(PlanError::Empty)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use std::collections::BTreeMap;

    use steading_types::{
        AgentView, Condition, ConditionOp, Goal, GoalKind, Needs, Position, Skills,
    };

    use super::*;

    fn make_request(agent: AgentId, tick: u64, key: &str) -> PlanRequest {
        PlanRequest {
            agent: AgentView {
                id: agent,
                name: String::from("Tamsin"),
                position: Position::default(),
                needs: Needs::default(),
                health: 100.0,
                money: Decimal::ZERO,
                skills: Skills::default(),
                inventory: BTreeMap::new(),
                home: None,
            },
            goal: Goal {
                id: GoalId::new(),
                kind: GoalKind::MaintainNeed,
                priority: 0.8,
                conditions: vec![Condition {
                    key: String::from(key),
                    op: ConditionOp::Lt,
                    value: 0.3,
                }],
                is_global: false,
                deadline: None,
                created_at: tick,
            },
            nearby: Vec::new(),
            tick,
        }
    }

    #[test]
    fn cooldown_gates_requests() {
        let mut mailbox = PlannerMailbox::new();
        let agent = AgentId::new();

        assert!(mailbox.can_request(agent, 0, 100));
        mailbox.enqueue(make_request(agent, 0, "hunger"));

        // In flight: blocked regardless of tick.
        assert!(!mailbox.can_request(agent, 500, 100));

        // Simulate the outcome landing.
        let tx = mailbox.sender();
        let _ = tx.send(PlanOutcome {
            agent_id: agent,
            goal_id: GoalId::new(),
            result: Ok(vec![String::from("idle")]),
        });
        let outcomes = mailbox.poll();
        assert_eq!(outcomes.len(), 1);

        // Cooldown still applies after the call resolves.
        assert!(!mailbox.can_request(agent, 99, 100));
        assert!(mailbox.can_request(agent, 100, 100));
    }

    #[test]
    fn poll_clears_in_flight() {
        let mut mailbox = PlannerMailbox::new();
        let agent = AgentId::new();
        mailbox.enqueue(make_request(agent, 0, "hunger"));
        assert_eq!(mailbox.in_flight_count(), 1);

        let tx = mailbox.sender();
        let _ = tx.send(PlanOutcome {
            agent_id: agent,
            goal_id: GoalId::new(),
            result: Err(PlanError::Empty),
        });
        let _ = mailbox.poll();
        assert_eq!(mailbox.in_flight_count(), 0);
    }

    #[tokio::test]
    async fn dispatch_round_trips_through_the_stub() {
        let mut mailbox = PlannerMailbox::new();
        let planner = Arc::new(StubPlanner::new());
        let agent = AgentId::new();
        mailbox.enqueue(make_request(agent, 0, "energy"));

        dispatch_requests(&mut mailbox, &planner);

        // Yield until the spawned task posts its outcome.
        let mut outcomes = Vec::new();
        for _ in 0..100 {
            tokio::task::yield_now().await;
            outcomes = mailbox.poll();
            if !outcomes.is_empty() {
                break;
            }
        }
        assert_eq!(outcomes.len(), 1);
        let first = outcomes.first();
        assert!(first.is_some_and(|o| o.agent_id == agent));
        assert!(first.is_some_and(|o| o.result == Ok(vec![String::from("sleep")])));
    }

    #[tokio::test]
    async fn failing_stub_reports_unreachable() {
        let planner = StubPlanner::failing();
        let result = planner.plan(make_request(AgentId::new(), 0, "hunger")).await;
        assert!(matches!(result, Err(PlanError::Unreachable { .. })));
    }

    #[tokio::test]
    async fn stub_best_action_picks_first_option() {
        let planner = StubPlanner::new();
        let request = UtilityRequest {
            agent: make_request(AgentId::new(), 0, "hunger").agent,
            options: vec![steading_types::CandidateAction {
                name: String::from("eat_berry"),
                kind: String::from("eat"),
                params: BTreeMap::new(),
            }],
        };
        let best = planner.best_action(request).await;
        assert!(best.is_ok_and(|b| b.name == "eat_berry"));
    }
}

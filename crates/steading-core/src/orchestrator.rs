//! The agent update orchestrator: one pass over every agent per tick.
//!
//! The per-agent sequence is strict, with an early return at each
//! stage:
//!
//! 1. Apply need drift and refresh memory from what the agent can see.
//! 2. If an action is in progress and its duration has elapsed, run
//!    the action engine and the plan executor's completion step.
//! 3. Else, if a plan has remaining steps, start the next action.
//! 4. Else, generate goals, take the highest-priority one, and —
//!    subject to the per-agent cooldown — queue a planning request.
//!
//! Agents are processed sequentially in ascending id order, so no two
//! handlers race on shared state within a tick. Planner outcomes are
//! drained at the top of the tick, before any agent updates. A single
//! agent's failure is logged and absorbed; it never touches the other
//! agents in the same tick.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use steading_agents::plan::{self, StartOutcome};
use steading_agents::{GoalStore, VisibilityTracker, actions, goals, memory, needs};
use steading_types::{
    ActionType, Agent, AgentId, CurrentAction, Plan, SightedEntity,
};
use steading_world::{ChangeSet, ContractBook, EntityRegistry, build_changeset};

use crate::config::SimConfig;
use crate::perception;
use crate::planner::{PlanOutcome, PlannerMailbox};

/// The complete mutable simulation state the orchestrator drives.
///
/// The registry and contract book are the persisted world; goal
/// stores, plans, and the visibility tracker are per-process agent
/// bookkeeping; the mailbox is the planner seam.
#[derive(Debug)]
pub struct SimState {
    /// The entity registry (agents, resources, structures).
    pub registry: EntityRegistry,
    /// All construction contracts.
    pub contracts: ContractBook,
    /// Per-agent goal stores.
    pub goal_stores: BTreeMap<AgentId, GoalStore>,
    /// Per-agent active plans (at most one each).
    pub plans: BTreeMap<AgentId, Plan>,
    /// Session side-table for the memory model.
    pub visibility: VisibilityTracker,
    /// Planner request/response plumbing.
    pub mailbox: PlannerMailbox,
    /// Tuning knobs.
    pub config: SimConfig,
}

impl SimState {
    /// Wrap a registry into a fresh simulation state.
    pub fn new(registry: EntityRegistry, config: SimConfig) -> Self {
        Self {
            registry,
            contracts: ContractBook::new(),
            goal_stores: BTreeMap::new(),
            plans: BTreeMap::new(),
            visibility: VisibilityTracker::new(),
            mailbox: PlannerMailbox::new(),
            config,
        }
    }
}

/// What one tick did, for observers.
#[derive(Debug)]
pub struct TickReport {
    /// The tick that ran.
    pub tick: u64,
    /// The tick's change log at both fidelities.
    pub changes: ChangeSet,
    /// Planning requests queued this tick (awaiting dispatch).
    pub planner_requests: usize,
}

/// Run one full tick over every agent.
///
/// Drains planner outcomes first, updates each agent in id order, and
/// finishes by building the tick's changeset from the registry's
/// drained events.
pub fn step_world(state: &mut SimState, tick: u64) -> TickReport {
    let outcomes = state.mailbox.poll();
    for outcome in outcomes {
        install_plan_outcome(state, outcome, tick);
    }

    for agent_id in state.registry.agent_ids() {
        update_agent(state, agent_id, tick);
    }

    let events = state.registry.drain_events();
    let planner_requests = state.mailbox.in_flight_count();
    TickReport {
        tick,
        changes: build_changeset(tick, events),
        planner_requests,
    }
}

/// Apply a completed planning call: install the plan, or abandon the
/// goal and fall back to idle.
fn install_plan_outcome(state: &mut SimState, outcome: PlanOutcome, tick: u64) {
    let agent_id = outcome.agent_id;
    if state.registry.agent(agent_id).is_none() {
        // The agent was deleted while the call was in flight.
        debug!(agent = %agent_id, "planner outcome for a removed agent dropped");
        return;
    }

    match outcome.result {
        Ok(steps) if !steps.is_empty() => {
            debug!(agent = %agent_id, steps = steps.len(), "plan installed");
            state.plans.insert(agent_id, Plan::new(steps));
        }
        Ok(_) => {
            abandon_with_idle(state, agent_id, "planner returned an empty plan", tick);
        }
        Err(err) => {
            abandon_with_idle(state, agent_id, &err.to_string(), tick);
        }
    }
}

/// Abandon the active goal with a reason and install an idle action.
fn abandon_with_idle(state: &mut SimState, agent_id: AgentId, reason: &str, tick: u64) {
    warn!(agent = %agent_id, reason, "goal abandoned, falling back to idle");
    if let Some(store) = state.goal_stores.get_mut(&agent_id) {
        store.abandon(reason);
    }
    let _ = state.registry.update_agent(agent_id, |a| {
        a.current_action = Some(CurrentAction::idle());
        a.progress.in_progress = true;
        a.progress.started_at = tick;
        a.progress.duration = plan::duration_for(ActionType::Idle, a);
    });
}

/// The strict per-agent update sequence.
fn update_agent(state: &mut SimState, agent_id: AgentId, tick: u64) {
    // --- Stage 1: need drift + memory refresh ---
    let Some(agent) = state.registry.agent(agent_id).cloned() else {
        return;
    };
    let sighted = perception::observe(&state.registry, &agent, state.config.vision_radius);
    {
        let visibility = &mut state.visibility;
        let sightings: &[SightedEntity] = &sighted;
        let _ = state.registry.update_agent(agent_id, |a| {
            needs::apply_need_drift(a);
            memory::update_memory(a, sightings, tick, visibility);
        });
    }

    // --- Stage 2: service an in-flight action ---
    let Some(agent) = state.registry.agent(agent_id).cloned() else {
        return;
    };
    if agent.current_action.is_some() && agent.progress.in_progress {
        let elapsed = tick.saturating_sub(agent.progress.started_at);
        if elapsed >= agent.progress.duration {
            finish_action(state, agent_id, tick);
        }
        return;
    }

    // --- Stage 3: advance the plan ---
    if let Some(mut plan) = state.plans.remove(&agent_id) {
        if plan.is_exhausted() {
            settle_goal(state, agent_id);
            // Fall through to goal generation this tick.
        } else {
            let mut outcome = StartOutcome::PlanExhausted;
            let _ = state.registry.update_agent(agent_id, |a| {
                outcome = plan::start_next_action(a, &mut plan, tick);
            });
            match outcome {
                StartOutcome::Started(action) => {
                    debug!(agent = %agent_id, ?action, "action started");
                    state.plans.insert(agent_id, plan);
                    return;
                }
                StartOutcome::PlanExhausted => {
                    settle_goal(state, agent_id);
                }
                StartOutcome::BadStep(step) => {
                    warn!(agent = %agent_id, step, "unknown plan step, resetting to idle");
                    abandon_with_idle(state, agent_id, "unknown plan step", tick);
                    return;
                }
            }
        }
    }

    // --- Stage 4: goals and planning ---
    request_plan(state, agent_id, &sighted, tick);
}

/// Stage 2 tail: run the engine, then the plan executor's completion
/// step.
fn finish_action(state: &mut SimState, agent_id: AgentId, tick: u64) {
    match actions::execute(agent_id, &mut state.registry, &mut state.contracts, tick) {
        Ok(actions::ActionEffect::InProgress) => {
            // A move still underway; it re-armed its own timer.
        }
        Ok(actions::ActionEffect::Completed) => {
            if let Some(mut plan) = state.plans.remove(&agent_id) {
                let _ = state.registry.update_agent(agent_id, |a| {
                    plan::complete_action(a, &mut plan);
                });
                if plan.is_exhausted() {
                    settle_goal(state, agent_id);
                } else {
                    state.plans.insert(agent_id, plan);
                }
            }
        }
        Err(err) => {
            // Validation failure: non-fatal by design. Drop the plan so
            // the agent re-plans next cycle.
            warn!(agent = %agent_id, %err, "action failed, agent reset to idle");
            state.plans.remove(&agent_id);
            if let Some(store) = state.goal_stores.get_mut(&agent_id) {
                store.abandon(&err.to_string());
            }
        }
    }
}

/// Complete the active goal if its conditions now hold.
fn settle_goal(state: &mut SimState, agent_id: AgentId) {
    let Some(agent) = state.registry.agent(agent_id) else {
        return;
    };
    let Some(store) = state.goal_stores.get_mut(&agent_id) else {
        return;
    };
    let satisfied = store
        .active()
        .and_then(|goal| goal.is_complete(&agent.condition_state()).then_some(goal.id));
    if let Some(goal_id) = satisfied {
        debug!(agent = %agent_id, goal = %goal_id, "goal satisfied");
        store.complete();
    }
}

/// Stage 4: regenerate goals and queue a planning request under the
/// cooldown.
fn request_plan(state: &mut SimState, agent_id: AgentId, sighted: &[SightedEntity], tick: u64) {
    let Some(agent) = state.registry.agent(agent_id).cloned() else {
        return;
    };

    let store = state.goal_stores.entry(agent_id).or_default();
    for goal in goals::generate_from_needs(&agent, tick) {
        store.push(goal);
    }
    for goal in goals::generate_context_goals(&agent, tick) {
        store.push(goal);
    }
    if store.should_abandon(tick) {
        store.abandon("deadline passed or goal stuck");
    }

    let Some(goal) = store.next_goal(tick) else {
        return;
    };

    if !state
        .mailbox
        .can_request(agent_id, tick, state.config.planner_cooldown_ticks)
    {
        return;
    }

    let request = steading_types::PlanRequest {
        agent: perception::agent_view(&agent),
        goal,
        nearby: sighted.to_vec(),
        tick,
    };
    state.mailbox.enqueue(request);
}

/// Convenience used by handlers and tests: whether the agent currently
/// has no directive.
pub fn is_idle(agent: &Agent) -> bool {
    agent.current_action.is_none() && !agent.progress.in_progress
}

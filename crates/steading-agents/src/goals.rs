//! Goal generation and the per-agent goal store.
//!
//! Two generators feed the store every time an agent has no active
//! plan:
//!
//! - [`generate_from_needs`] emits one goal per need past its
//!   threshold (hunger > 0.7, energy < 0.3, health < 50, money < 10).
//! - [`generate_context_goals`] classifies the agent's overall
//!   wellbeing into a [`ContextState`] and emits state-specific
//!   survival/opportunity goals.
//!
//! The store holds one *active* goal plus two priority-sorted queues
//! (local and global). Duplicate goal ids across regenerations are
//! tolerated by design — the queues do not deduplicate.

use rust_decimal::prelude::ToPrimitive;
use tracing::debug;

use steading_types::{
    Agent, Condition, ConditionOp, ContextState, Goal, GoalId, GoalKind,
};

/// Hunger level past which a maintain-need goal is emitted.
pub const HUNGER_THRESHOLD: f64 = 0.7;

/// Energy level below which a maintain-need goal is emitted.
pub const ENERGY_THRESHOLD: f64 = 0.3;

/// Health level below which a maintain-need goal is emitted.
pub const HEALTH_THRESHOLD: f64 = 50.0;

/// Money level below which a wealth goal is emitted.
pub const MONEY_THRESHOLD: f64 = 10.0;

/// An active goal older than this is abandoned as stuck.
pub const STUCK_GOAL_TICKS: u64 = 1000;

/// Ticks granted to a build-structure goal before its deadline.
const BUILD_DEADLINE_TICKS: u64 = 2000;

/// Money level at and above which an agent counts as thriving.
const THRIVING_MONEY: f64 = 100.0;

/// Convenience: the agent's money as f64 for threshold checks.
fn money_of(agent: &Agent) -> f64 {
    agent.stats.money.to_f64().unwrap_or(0.0)
}

/// Build a single-condition goal.
fn goal(
    kind: GoalKind,
    priority: f64,
    condition: Condition,
    is_global: bool,
    deadline: Option<u64>,
    tick: u64,
) -> Goal {
    Goal {
        id: GoalId::new(),
        kind,
        priority: priority.clamp(0.0, 1.0),
        conditions: vec![condition],
        is_global,
        deadline,
        created_at: tick,
    }
}

/// Emit one goal per need past its threshold.
///
/// Priorities follow the needs themselves: the hunger goal scales as
/// `(hunger - 0.5) x 2` and the energy goal as `(1 - energy) x 1.5`,
/// both clamped into `[0, 1]`; health and money use fixed priorities.
pub fn generate_from_needs(agent: &Agent, tick: u64) -> Vec<Goal> {
    let mut goals = Vec::new();

    if agent.needs.hunger > HUNGER_THRESHOLD {
        goals.push(goal(
            GoalKind::MaintainNeed,
            (agent.needs.hunger - 0.5) * 2.0,
            Condition {
                key: String::from("hunger"),
                op: ConditionOp::Lt,
                value: 0.3,
            },
            false,
            None,
            tick,
        ));
    }

    if agent.needs.energy < ENERGY_THRESHOLD {
        goals.push(goal(
            GoalKind::MaintainNeed,
            (1.0 - agent.needs.energy) * 1.5,
            Condition {
                key: String::from("energy"),
                op: ConditionOp::Gt,
                value: 0.8,
            },
            false,
            None,
            tick,
        ));
    }

    if agent.stats.health < HEALTH_THRESHOLD {
        goals.push(goal(
            GoalKind::MaintainNeed,
            0.95,
            Condition {
                key: String::from("health"),
                op: ConditionOp::Ge,
                value: 80.0,
            },
            false,
            None,
            tick,
        ));
    }

    if money_of(agent) < MONEY_THRESHOLD {
        goals.push(goal(
            GoalKind::AccumulateWealth,
            0.6,
            Condition {
                key: String::from("money"),
                op: ConditionOp::Ge,
                value: 50.0,
            },
            false,
            None,
            tick,
        ));
    }

    goals
}

/// Classify the agent's overall wellbeing.
pub fn classify_context(agent: &Agent) -> ContextState {
    let money = money_of(agent);
    let critical_need = agent.needs.hunger > 0.85
        || agent.needs.energy < 0.15
        || agent.stats.health < 25.0;
    let elevated_need = agent.needs.hunger > HUNGER_THRESHOLD
        || agent.needs.energy < ENERGY_THRESHOLD
        || agent.stats.health < HEALTH_THRESHOLD;
    let comfortable = agent.needs.hunger < 0.5
        && agent.needs.energy > 0.5
        && agent.stats.health >= 75.0;

    if critical_need && money < MONEY_THRESHOLD {
        ContextState::Desperate
    } else if elevated_need || money < MONEY_THRESHOLD {
        ContextState::Struggling
    } else if comfortable && money >= THRIVING_MONEY {
        ContextState::Thriving
    } else {
        ContextState::Stable
    }
}

/// Emit the context-state goals for this agent.
pub fn generate_context_goals(agent: &Agent, tick: u64) -> Vec<Goal> {
    match classify_context(agent) {
        ContextState::Desperate => vec![goal(
            GoalKind::ObtainItem,
            1.0,
            Condition {
                key: String::from("hunger"),
                op: ConditionOp::Lt,
                value: 0.5,
            },
            false,
            None,
            tick,
        )],
        ContextState::Struggling => vec![goal(
            GoalKind::AccumulateWealth,
            0.7,
            Condition {
                key: String::from("money"),
                op: ConditionOp::Ge,
                value: 50.0,
            },
            false,
            None,
            tick,
        )],
        ContextState::Thriving => {
            if agent.owned_structures.is_empty() {
                vec![goal(
                    GoalKind::BuildStructure,
                    0.6,
                    Condition {
                        key: String::from("has_home"),
                        op: ConditionOp::Eq,
                        value: 1.0,
                    },
                    true,
                    Some(tick.saturating_add(BUILD_DEADLINE_TICKS)),
                    tick,
                )]
            } else {
                vec![goal(
                    GoalKind::Learn,
                    0.4,
                    Condition {
                        key: String::from("skill_crafting"),
                        op: ConditionOp::Ge,
                        value: 5.0,
                    },
                    true,
                    None,
                    tick,
                )]
            }
        }
        ContextState::Stable => {
            if agent.needs.social < 0.4 {
                vec![goal(
                    GoalKind::Socialize,
                    0.4,
                    Condition {
                        key: String::from("social"),
                        op: ConditionOp::Gt,
                        value: 0.7,
                    },
                    false,
                    None,
                    tick,
                )]
            } else {
                Vec::new()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// GoalStore
// ---------------------------------------------------------------------------

/// Per-agent goal state: one active goal plus the local and global
/// priority queues.
#[derive(Debug, Clone, Default)]
pub struct GoalStore {
    /// The goal currently being pursued.
    active: Option<Goal>,
    /// Tick at which the active goal was activated.
    active_since: Option<u64>,
    /// Immediate goals, sorted by priority descending.
    local: Vec<Goal>,
    /// Long-term goals, sorted by priority descending.
    global: Vec<Goal>,
    /// Reason the last goal was abandoned, if any.
    last_abandon_reason: Option<String>,
}

impl GoalStore {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            active: None,
            active_since: None,
            local: Vec::new(),
            global: Vec::new(),
            last_abandon_reason: None,
        }
    }

    /// The active goal, if any.
    pub const fn active(&self) -> Option<&Goal> {
        self.active.as_ref()
    }

    /// Reason recorded by the last [`abandon`](Self::abandon).
    pub fn last_abandon_reason(&self) -> Option<&str> {
        self.last_abandon_reason.as_deref()
    }

    /// Queue lengths `(local, global)`.
    pub fn queued(&self) -> (usize, usize) {
        (self.local.len(), self.global.len())
    }

    /// Push a goal into its queue. No deduplication: near-identical
    /// goals can accumulate across regenerations.
    pub fn push(&mut self, goal: Goal) {
        let queue = if goal.is_global {
            &mut self.global
        } else {
            &mut self.local
        };
        queue.push(goal);
        queue.sort_by(|a, b| b.priority.total_cmp(&a.priority));
    }

    /// The goal to pursue now: the active goal if set, else the
    /// highest-priority local goal, else the highest-priority global
    /// goal — whichever is taken becomes active.
    pub fn next_goal(&mut self, tick: u64) -> Option<Goal> {
        if let Some(active) = &self.active {
            return Some(active.clone());
        }
        let taken = if self.local.is_empty() {
            if self.global.is_empty() {
                None
            } else {
                Some(self.global.remove(0))
            }
        } else {
            Some(self.local.remove(0))
        };
        if let Some(goal) = taken {
            self.active = Some(goal.clone());
            self.active_since = Some(tick);
            return Some(goal);
        }
        None
    }

    /// Clear the active goal after satisfying it.
    pub fn complete(&mut self) {
        self.active = None;
        self.active_since = None;
    }

    /// Clear the active goal with a recorded reason.
    pub fn abandon(&mut self, reason: &str) {
        if let Some(goal) = &self.active {
            debug!(goal = %goal.id, kind = ?goal.kind, reason, "goal abandoned");
        }
        self.active = None;
        self.active_since = None;
        self.last_abandon_reason = Some(String::from(reason));
    }

    /// Whether the active goal has outlived its deadline or been stuck
    /// active for more than [`STUCK_GOAL_TICKS`].
    pub fn should_abandon(&self, tick: u64) -> bool {
        let Some(goal) = &self.active else {
            return false;
        };
        if goal.deadline.is_some_and(|d| d < tick) {
            return true;
        }
        self.active_since
            .is_some_and(|since| tick.saturating_sub(since) > STUCK_GOAL_TICKS)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use steading_types::{
        ActionProgress, AgentId, Needs, Personality, Position, Skills, Stats, StructureId,
    };

    use super::*;

    fn make_agent() -> Agent {
        Agent {
            id: AgentId::new(),
            name: String::from("Orrin"),
            position: Position::default(),
            needs: Needs::default(),
            stats: Stats::default(),
            skills: Skills::default(),
            personality: Personality::default(),
            current_action: None,
            progress: ActionProgress::default(),
            inventory: Vec::new(),
            hands: None,
            owned_structures: Vec::new(),
            memory: Vec::new(),
        }
    }

    fn with_money(agent: &mut Agent, amount: i64) {
        agent.stats.money = Decimal::new(amount, 0);
    }

    // -----------------------------------------------------------------------
    // Need-driven generation
    // -----------------------------------------------------------------------

    #[test]
    fn comfortable_agent_generates_nothing() {
        let mut agent = make_agent();
        with_money(&mut agent, 40);
        assert!(generate_from_needs(&agent, 0).is_empty());
    }

    #[test]
    fn hungry_agent_generates_maintain_need() {
        let mut agent = make_agent();
        with_money(&mut agent, 40);
        agent.needs.hunger = 0.9;

        let goals = generate_from_needs(&agent, 5);
        assert_eq!(goals.len(), 1);
        let first = goals.first();
        assert!(first.is_some_and(|g| g.kind == GoalKind::MaintainNeed));
        // Priority (0.9 - 0.5) * 2 = 0.8.
        assert!(first.is_some_and(|g| (g.priority - 0.8).abs() < 1e-9));
        assert!(first.is_some_and(|g| g.created_at == 5));
    }

    #[test]
    fn threshold_boundaries_are_strict() {
        let mut agent = make_agent();
        with_money(&mut agent, 40);
        // Exactly at the thresholds: no goals.
        agent.needs.hunger = HUNGER_THRESHOLD;
        agent.needs.energy = ENERGY_THRESHOLD;
        agent.stats.health = HEALTH_THRESHOLD;
        assert!(generate_from_needs(&agent, 0).is_empty());
    }

    #[test]
    fn every_need_can_fire_at_once() {
        let mut agent = make_agent();
        agent.needs.hunger = 0.95;
        agent.needs.energy = 0.1;
        agent.stats.health = 30.0;
        with_money(&mut agent, 5);

        let goals = generate_from_needs(&agent, 0);
        assert_eq!(goals.len(), 4);
    }

    // -----------------------------------------------------------------------
    // Context classification
    // -----------------------------------------------------------------------

    #[test]
    fn desperate_needs_critical_need_and_low_money() {
        let mut agent = make_agent();
        agent.needs.hunger = 0.9;
        with_money(&mut agent, 5);
        assert_eq!(classify_context(&agent), ContextState::Desperate);

        // Same need but money on hand: merely struggling.
        with_money(&mut agent, 50);
        assert_eq!(classify_context(&agent), ContextState::Struggling);
    }

    #[test]
    fn thriving_needs_comfort_and_money() {
        let mut agent = make_agent();
        with_money(&mut agent, 150);
        assert_eq!(classify_context(&agent), ContextState::Thriving);

        with_money(&mut agent, 60);
        assert_eq!(classify_context(&agent), ContextState::Stable);
    }

    #[test]
    fn desperate_emits_urgent_obtain_item() {
        let mut agent = make_agent();
        agent.needs.hunger = 0.9;
        with_money(&mut agent, 0);

        let goals = generate_context_goals(&agent, 0);
        let first = goals.first();
        assert!(first.is_some_and(|g| g.kind == GoalKind::ObtainItem));
        assert!(first.is_some_and(|g| (g.priority - 1.0).abs() < f64::EPSILON));
        assert!(first.is_some_and(|g| !g.is_global));
    }

    #[test]
    fn thriving_homeless_agent_wants_a_home() {
        let mut agent = make_agent();
        with_money(&mut agent, 150);

        let goals = generate_context_goals(&agent, 100);
        let first = goals.first();
        assert!(first.is_some_and(|g| g.kind == GoalKind::BuildStructure));
        assert!(first.is_some_and(|g| g.is_global));
        assert!(first.is_some_and(|g| g.deadline == Some(2100)));
    }

    #[test]
    fn thriving_homeowner_learns_instead() {
        let mut agent = make_agent();
        with_money(&mut agent, 150);
        agent.owned_structures.push(StructureId::new());

        let goals = generate_context_goals(&agent, 0);
        assert!(goals.first().is_some_and(|g| g.kind == GoalKind::Learn));
    }

    #[test]
    fn stable_lonely_agent_socializes() {
        let mut agent = make_agent();
        with_money(&mut agent, 40);
        agent.needs.social = 0.2;

        let goals = generate_context_goals(&agent, 0);
        assert!(goals.first().is_some_and(|g| g.kind == GoalKind::Socialize));
    }

    // -----------------------------------------------------------------------
    // GoalStore
    // -----------------------------------------------------------------------

    fn make_goal(priority: f64, is_global: bool) -> Goal {
        Goal {
            id: GoalId::new(),
            kind: GoalKind::AccumulateWealth,
            priority,
            conditions: Vec::new(),
            is_global,
            deadline: None,
            created_at: 0,
        }
    }

    #[test]
    fn next_goal_prefers_local_over_global() {
        let mut store = GoalStore::new();
        store.push(make_goal(0.9, true));
        store.push(make_goal(0.2, false));

        let next = store.next_goal(0);
        // The low-priority local goal still wins over the global one.
        assert!(next.is_some_and(|g| !g.is_global));
    }

    #[test]
    fn next_goal_is_priority_ordered_within_queue() {
        let mut store = GoalStore::new();
        store.push(make_goal(0.3, false));
        store.push(make_goal(0.8, false));
        store.push(make_goal(0.5, false));

        let next = store.next_goal(0);
        assert!(next.is_some_and(|g| (g.priority - 0.8).abs() < f64::EPSILON));
    }

    #[test]
    fn active_goal_is_sticky() {
        let mut store = GoalStore::new();
        store.push(make_goal(0.5, false));
        let first = store.next_goal(0).map(|g| g.id);

        store.push(make_goal(0.9, false));
        let second = store.next_goal(1).map(|g| g.id);
        // Still the same goal until completed or abandoned.
        assert_eq!(first, second);
    }

    #[test]
    fn complete_clears_active() {
        let mut store = GoalStore::new();
        store.push(make_goal(0.5, false));
        let _ = store.next_goal(0);
        store.complete();
        assert!(store.active().is_none());
    }

    #[test]
    fn abandon_records_reason() {
        let mut store = GoalStore::new();
        store.push(make_goal(0.5, false));
        let _ = store.next_goal(0);
        store.abandon("planner unreachable");
        assert!(store.active().is_none());
        assert_eq!(store.last_abandon_reason(), Some("planner unreachable"));
    }

    #[test]
    fn global_goal_taken_when_local_empty() {
        let mut store = GoalStore::new();
        store.push(make_goal(0.9, true));
        assert!(store.next_goal(0).is_some_and(|g| g.is_global));
    }

    #[test]
    fn should_abandon_past_deadline() {
        let mut store = GoalStore::new();
        let mut goal = make_goal(0.5, false);
        goal.deadline = Some(100);
        store.push(goal);
        let _ = store.next_goal(0);

        assert!(!store.should_abandon(100));
        assert!(store.should_abandon(101));
    }

    #[test]
    fn should_abandon_when_stuck() {
        let mut store = GoalStore::new();
        store.push(make_goal(0.5, false));
        let _ = store.next_goal(10);

        assert!(!store.should_abandon(1010));
        assert!(store.should_abandon(1011));
    }

    #[test]
    fn duplicate_goals_accumulate() {
        // No dedup by design: the queue grows with near-identical goals.
        let mut store = GoalStore::new();
        store.push(make_goal(0.5, false));
        store.push(make_goal(0.5, false));
        store.push(make_goal(0.5, false));
        assert_eq!(store.queued(), (3, 0));
    }
}

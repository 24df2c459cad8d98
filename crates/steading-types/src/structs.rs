//! Core entity structs: agents, resources, structures, and the records
//! that hang off them (memory items, goals, plans, work progress,
//! contracts).
//!
//! These are plain data shapes. Behavior lives in `steading-agents`
//! (inventory, memory, goals, actions) and `steading-world` (registry,
//! contracts); keeping the shapes here gives every crate one vocabulary.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::actions::CurrentAction;
use crate::enums::{
    ConditionOp, ContractStatus, GoalKind, ItemKind, ResourceKind, SkillKind, StructureKind,
};
use crate::geometry::Position;
use crate::ids::{AgentId, ContractId, EntityRef, GoalId, ResourceId, StructureId};

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// An agent's internal need levels, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Needs {
    /// How hungry the agent is (1.0 = starving).
    pub hunger: f64,
    /// How rested the agent is (0.0 = exhausted).
    pub energy: f64,
    /// How socially satisfied the agent is (0.0 = lonely).
    pub social: f64,
}

impl Default for Needs {
    fn default() -> Self {
        Self {
            hunger: 0.0,
            energy: 1.0,
            social: 1.0,
        }
    }
}

/// An agent's physical and economic stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Health in `[0, 100]`.
    pub health: f64,
    /// Money held, in currency units.
    pub money: Decimal,
    /// Walking speed in world units per tick (before the 0.5 step factor).
    pub speed: f64,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            health: 100.0,
            money: Decimal::ZERO,
            speed: 2.0,
        }
    }
}

/// An agent's skill scores. Unbounded non-negative; grown through use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Skills {
    /// Harvest-class proficiency (chop, mine, pickup).
    pub gathering: u32,
    /// Craft-class proficiency.
    pub crafting: u32,
    /// Buy/sell proficiency.
    pub trading: u32,
    /// Retention of remembered locations.
    pub memory: u32,
}

impl Skills {
    /// Read the score for a skill.
    pub const fn get(&self, kind: SkillKind) -> u32 {
        match kind {
            SkillKind::Gathering => self.gathering,
            SkillKind::Crafting => self.crafting,
            SkillKind::Trading => self.trading,
            SkillKind::Memory => self.memory,
        }
    }

    /// Add to the score for a skill, saturating at `u32::MAX`.
    pub const fn add(&mut self, kind: SkillKind, amount: u32) {
        match kind {
            SkillKind::Gathering => self.gathering = self.gathering.saturating_add(amount),
            SkillKind::Crafting => self.crafting = self.crafting.saturating_add(amount),
            SkillKind::Trading => self.trading = self.trading.saturating_add(amount),
            SkillKind::Memory => self.memory = self.memory.saturating_add(amount),
        }
    }
}

/// Six personality traits in `[0, 1]` plus an archetype tag.
///
/// The planner weighs these when costing candidate actions; the core
/// carries them through unmodified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    /// Willingness to work long tasks.
    pub industry: f64,
    /// Preference for profitable actions.
    pub greed: f64,
    /// Preference for social actions.
    pub sociability: f64,
    /// Tolerance for risky actions.
    pub courage: f64,
    /// Preference for exploring unknown territory.
    pub curiosity: f64,
    /// Tolerance for slow-payoff plans.
    pub patience: f64,
    /// Archetype label (e.g. "farmer", "trader", "wanderer").
    pub archetype: String,
}

impl Default for Personality {
    fn default() -> Self {
        Self {
            industry: 0.5,
            greed: 0.5,
            sociability: 0.5,
            courage: 0.5,
            curiosity: 0.5,
            patience: 0.5,
            archetype: String::from("villager"),
        }
    }
}

/// A stack of items in an inventory or a hand slot.
///
/// Stackable kinds merge quantities into one stack; durable kinds
/// (tools) carry a durability counter and never merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    /// The item kind.
    pub kind: ItemKind,
    /// Units in the stack (always 1 for durable kinds).
    pub quantity: u32,
    /// Remaining durability for tools; `None` for non-durable kinds.
    pub durability: Option<u32>,
}

impl ItemStack {
    /// A plain stack of `quantity` units with no durability.
    pub const fn of(kind: ItemKind, quantity: u32) -> Self {
        Self {
            kind,
            quantity,
            durability: None,
        }
    }

    /// A single durable item with the given durability.
    pub const fn durable(kind: ItemKind, durability: u32) -> Self {
        Self {
            kind,
            quantity: 1,
            durability: Some(durability),
        }
    }
}

/// Timing state of the agent's current action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ActionProgress {
    /// Whether an action is currently running.
    pub in_progress: bool,
    /// Tick at which the action started.
    pub started_at: u64,
    /// Computed duration in ticks.
    pub duration: u64,
}

impl ActionProgress {
    /// Clear the timing state (action finished or aborted).
    pub const fn reset(&mut self) {
        self.in_progress = false;
        self.started_at = 0;
        self.duration = 0;
    }
}

/// An autonomous NPC.
///
/// Owned exclusively by the entity registry; mutated every tick by the
/// orchestrator and by action handlers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Unique identifier.
    pub id: AgentId,
    /// Display name.
    pub name: String,
    /// Current position on the world plane.
    pub position: Position,
    /// Internal need levels.
    pub needs: Needs,
    /// Physical and economic stats.
    pub stats: Stats,
    /// Skill scores.
    pub skills: Skills,
    /// Personality traits.
    pub personality: Personality,
    /// The action currently assigned, if any.
    pub current_action: Option<CurrentAction>,
    /// Timing state of the current action.
    pub progress: ActionProgress,
    /// Ordered list of item stacks carried in the pack.
    pub inventory: Vec<ItemStack>,
    /// Single hand slot for one bulky or liquid-container item.
    pub hands: Option<ItemStack>,
    /// Structures this agent owns.
    pub owned_structures: Vec<StructureId>,
    /// Remembered entity locations.
    pub memory: Vec<MemoryItem>,
}

impl Agent {
    /// Flatten the agent's state into the key/value map used by goal
    /// satisfaction conditions.
    ///
    /// Keys: `hunger`, `energy`, `social`, `health`, `money`,
    /// `has_home`, plus `skill_<name>` per skill and `has_<item>` counts.
    pub fn condition_state(&self) -> BTreeMap<String, f64> {
        let mut state = BTreeMap::new();
        state.insert(String::from("hunger"), self.needs.hunger);
        state.insert(String::from("energy"), self.needs.energy);
        state.insert(String::from("social"), self.needs.social);
        state.insert(String::from("health"), self.stats.health);
        state.insert(
            String::from("money"),
            self.stats.money.to_f64().unwrap_or(0.0),
        );
        state.insert(
            String::from("has_home"),
            if self.owned_structures.is_empty() {
                0.0
            } else {
                1.0
            },
        );
        state.insert(String::from("skill_gathering"), f64::from(self.skills.gathering));
        state.insert(String::from("skill_crafting"), f64::from(self.skills.crafting));
        state.insert(String::from("skill_trading"), f64::from(self.skills.trading));
        for stack in &self.inventory {
            let key = format!("has_{:?}", stack.kind).to_lowercase();
            let entry = state.entry(key).or_insert(0.0);
            *entry += f64::from(stack.quantity);
        }
        state
    }
}

// ---------------------------------------------------------------------------
// Resource
// ---------------------------------------------------------------------------

/// A harvestable resource in the world.
///
/// Destroyed (removed from the registry) when `remaining` reaches zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Unique identifier.
    pub id: ResourceId,
    /// Position on the world plane.
    pub position: Position,
    /// Resource subtype.
    pub kind: ResourceKind,
    /// Units left to harvest.
    pub remaining: u32,
    /// Whether the resource has been harvested at least once.
    pub harvested: bool,
    /// Market value of one dropped unit.
    pub value: Decimal,
    /// Whether the dropped item is edible.
    pub edible: bool,
    /// Whether the resource blocks movement through its tiles.
    pub blocks_movement: bool,
    /// Occupied footprint in tiles (width, height).
    pub footprint: (u32, u32),
    /// Shared work record while multiple agents fell/extract this
    /// resource; `None` for resources harvested in a single action.
    pub work: Option<WorkProgress>,
}

// ---------------------------------------------------------------------------
// Structure
// ---------------------------------------------------------------------------

/// A constructed building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    /// Unique identifier.
    pub id: StructureId,
    /// Position on the world plane.
    pub position: Position,
    /// Structure subtype.
    pub kind: StructureKind,
    /// Items stored inside.
    pub inventory: Vec<ItemStack>,
    /// Money held by the structure (market floats, treasuries).
    pub treasury: Decimal,
    /// Owning agent, if any.
    pub owner: Option<AgentId>,
    /// Whether the structure blocks movement through its tiles.
    pub blocks_movement: bool,
    /// Occupied footprint in tiles (width, height).
    pub footprint: (u32, u32),
    /// Shared work record during construction, if in progress.
    pub work: Option<WorkProgress>,
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

/// One remembered entity location with reinforcement and decay state.
///
/// Invariant: `expiry_tick == last_updated + retention_ticks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryItem {
    /// The remembered entity.
    pub entity: EntityRef,
    /// Subtype label at the time of sighting (resource/structure kind,
    /// or the agent's name).
    pub subtype: String,
    /// Last known position.
    pub position: Position,
    /// Number of distinct observation sessions.
    pub interaction_count: u32,
    /// How long (ticks) the memory survives after its last refresh.
    pub retention_ticks: u64,
    /// Tick after which the memory decays (inclusive: still remembered
    /// at exactly this tick).
    pub expiry_tick: u64,
    /// Whether the memory has decayed. Cleared the instant the entity is
    /// seen again.
    pub forgotten: bool,
    /// Tick of the most recent refresh.
    pub last_updated: u64,
}

// ---------------------------------------------------------------------------
// Goals
// ---------------------------------------------------------------------------

/// A single satisfaction condition on a goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Key into the agent's flattened condition state.
    pub key: String,
    /// Comparison operator.
    pub op: ConditionOp,
    /// Target value.
    pub value: f64,
}

impl Condition {
    /// Whether the condition holds in the given flattened state.
    ///
    /// Missing keys never satisfy a condition. `Eq` compares within a
    /// small tolerance because the state map is float-valued.
    pub fn is_met(&self, state: &BTreeMap<String, f64>) -> bool {
        let Some(actual) = state.get(&self.key) else {
            return false;
        };
        match self.op {
            ConditionOp::Eq => (actual - self.value).abs() < 1e-9,
            ConditionOp::Gt => *actual > self.value,
            ConditionOp::Ge => *actual >= self.value,
            ConditionOp::Lt => *actual < self.value,
            ConditionOp::Le => *actual <= self.value,
        }
    }
}

/// A desired end condition with priority, scope, and optional deadline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// Unique identifier. Duplicates across regenerations are tolerated
    /// by the queues.
    pub id: GoalId,
    /// Goal taxonomy entry.
    pub kind: GoalKind,
    /// Base priority in `[0, 1]`.
    pub priority: f64,
    /// Conditions that must all hold for the goal to be complete.
    pub conditions: Vec<Condition>,
    /// Global (long-term) vs local (immediate) scope.
    pub is_global: bool,
    /// Optional tick deadline; past it the goal should be abandoned.
    pub deadline: Option<u64>,
    /// Tick at which the goal was created.
    pub created_at: u64,
}

impl Goal {
    /// Whether every condition is met in the given flattened state.
    pub fn is_complete(&self, state: &BTreeMap<String, f64>) -> bool {
        self.conditions.iter().all(|c| c.is_met(state))
    }
}

// ---------------------------------------------------------------------------
// Plans
// ---------------------------------------------------------------------------

/// An ordered list of planner-issued action identifiers plus a cursor.
///
/// One plan is active per agent at a time. The plan executor translates
/// the step under the cursor into a typed action; the identifiers stay
/// opaque strings until then.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Planner-issued step identifiers, in execution order.
    pub steps: Vec<String>,
    /// Index of the next step to start.
    pub cursor: usize,
}

impl Plan {
    /// Wrap a planner response into a fresh plan.
    pub const fn new(steps: Vec<String>) -> Self {
        Self { steps, cursor: 0 }
    }

    /// The step currently under the cursor, if any remain.
    pub fn current_step(&self) -> Option<&str> {
        self.steps.get(self.cursor).map(String::as_str)
    }

    /// Move the cursor past the current step.
    pub const fn advance(&mut self) {
        self.cursor = self.cursor.saturating_add(1);
    }

    /// Whether the cursor is at or past the end.
    pub const fn is_exhausted(&self) -> bool {
        self.cursor >= self.steps.len()
    }
}

// ---------------------------------------------------------------------------
// Shared work
// ---------------------------------------------------------------------------

/// Cumulative multi-agent progress toward one gather/build task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WorkProgress {
    /// Progress in `[0, 100]`.
    pub progress: f64,
    /// Total contribution per agent.
    pub contributions: BTreeMap<AgentId, f64>,
    /// The agent whose contribution most recently advanced the work; the
    /// one credited on completion.
    pub last_contributor: Option<AgentId>,
}

impl WorkProgress {
    /// Add `amount` progress on behalf of `agent`.
    ///
    /// Returns `true` when this contribution completes the work
    /// (progress reaches 100).
    pub fn contribute(&mut self, agent: AgentId, amount: f64) -> bool {
        self.progress = (self.progress + amount).min(100.0);
        let entry = self.contributions.entry(agent).or_insert(0.0);
        *entry += amount;
        self.last_contributor = Some(agent);
        self.progress >= 100.0
    }
}

// ---------------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------------

/// A construction contract between a customer and a provider.
///
/// Lives in the world's contract book, not in the entity registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    /// Unique identifier.
    pub id: ContractId,
    /// The agent commissioning the build.
    pub customer: AgentId,
    /// The agent who signed to perform the build, once signed.
    pub provider: Option<AgentId>,
    /// The structure kind to be built.
    pub structure_kind: StructureKind,
    /// Where the structure will stand.
    pub site: Position,
    /// Total contract price.
    pub cost: Decimal,
    /// Portion paid up front after signing.
    pub prepayment: Decimal,
    /// Materials the provider must hold to perform the build step.
    pub materials: BTreeMap<ItemKind, u32>,
    /// Current lifecycle status.
    pub status: ContractStatus,
    /// Tick at which the contract was drafted.
    pub created_at: u64,
}

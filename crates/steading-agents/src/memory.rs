//! The agent memory model: session-based reinforcement and time-based
//! forgetting of remembered entity locations.
//!
//! Each sighting of an entity either opens a **new session** (the entity
//! was not visible on the immediately preceding update) or continues the
//! current one. New sessions reinforce: the interaction count goes up and
//! the retention window multiplies by `1 + 0.2 x memory_skill`
//! (ceiling-rounded). Continuing sessions only refresh position and
//! expiry. An item decays (`forgotten = true`) the first update whose
//! tick is *strictly past* its expiry — at `expiry_tick` exactly it is
//! still remembered — and un-decays the instant the entity is seen
//! again.
//!
//! Session detection needs the previous tick's visible-id set, which is
//! process bookkeeping rather than agent state: it lives in a
//! [`VisibilityTracker`] side-table keyed by agent id, so the model
//! stays independently testable and resettable.

use std::collections::{BTreeMap, BTreeSet};

use uuid::Uuid;

use steading_types::{Agent, AgentId, EntityKind, MemoryItem, SightedEntity};

/// Side-table of each agent's previously visible entity ids.
#[derive(Debug, Clone, Default)]
pub struct VisibilityTracker {
    /// Agent id -> the visible-id set from that agent's last update.
    prev: BTreeMap<AgentId, BTreeSet<Uuid>>,
}

impl VisibilityTracker {
    /// Create an empty tracker.
    pub const fn new() -> Self {
        Self {
            prev: BTreeMap::new(),
        }
    }

    /// Drop all session state (e.g. on world reset).
    pub fn clear(&mut self) {
        self.prev.clear();
    }

    /// Forget session state for one agent (e.g. on deletion).
    pub fn forget_agent(&mut self, agent: AgentId) {
        self.prev.remove(&agent);
    }
}

/// Reinforced retention: `ceil(retention x (1 + 0.2 x skill))`.
///
/// Computed in integers: `ceil(r x (5 + s) / 5) = (r x (5 + s) + 4) / 5`,
/// which is exact (no float rounding) and saturates instead of
/// overflowing.
fn reinforced_retention(retention: u64, memory_skill: u32) -> u64 {
    let factor = u64::from(memory_skill).saturating_add(5);
    retention
        .saturating_mul(factor)
        .saturating_add(4)
        .checked_div(5)
        .unwrap_or(retention)
        .max(1)
}

/// Refresh an agent's memory from this tick's sightings, then decay.
///
/// `sighted` is the exact-filtered perception result; the agent itself
/// is ignored if present. Decay only applies to items not currently
/// visible.
pub fn update_memory(
    agent: &mut Agent,
    sighted: &[SightedEntity],
    tick: u64,
    tracker: &mut VisibilityTracker,
) {
    let previous = tracker.prev.get(&agent.id).cloned().unwrap_or_default();
    let mut current: BTreeSet<Uuid> = BTreeSet::new();

    for sighting in sighted {
        if sighting.entity.id == agent.id.into_inner() {
            continue;
        }
        current.insert(sighting.entity.id);

        if let Some(item) = agent
            .memory
            .iter_mut()
            .find(|m| m.entity.id == sighting.entity.id)
        {
            // A continuing session (visible on the immediately
            // preceding update) only refreshes; a new session
            // reinforces.
            if !previous.contains(&sighting.entity.id) {
                item.interaction_count = item.interaction_count.saturating_add(1);
                item.retention_ticks =
                    reinforced_retention(item.retention_ticks, agent.skills.memory);
            }
            item.position = sighting.position;
            item.subtype = sighting.subtype.clone();
            item.last_updated = tick;
            item.expiry_tick = tick.saturating_add(item.retention_ticks);
            item.forgotten = false;
        } else {
            // First-ever encounter.
            agent.memory.push(MemoryItem {
                entity: sighting.entity,
                subtype: sighting.subtype.clone(),
                position: sighting.position,
                interaction_count: 1,
                retention_ticks: 1,
                expiry_tick: tick.saturating_add(1),
                forgotten: false,
                last_updated: tick,
            });
        }
    }

    // Decay pass: strictly past expiry, and only while out of sight.
    for item in &mut agent.memory {
        if !current.contains(&item.entity.id) && item.expiry_tick < tick {
            item.forgotten = true;
        }
    }

    tracker.prev.insert(agent.id, current);
}

/// The agent's non-forgotten memories.
pub fn valid_memories(agent: &Agent) -> Vec<&MemoryItem> {
    agent.memory.iter().filter(|m| !m.forgotten).collect()
}

/// The nearest valid memory of the given kind (and subtype, when
/// given), by Euclidean distance from the agent.
pub fn find_location<'a>(
    agent: &'a Agent,
    kind: EntityKind,
    subtype: Option<&str>,
) -> Option<&'a MemoryItem> {
    agent
        .memory
        .iter()
        .filter(|m| !m.forgotten && m.entity.kind == kind)
        .filter(|m| subtype.is_none_or(|s| m.subtype == s))
        .min_by(|a, b| {
            let da = agent.position.distance_squared(&a.position);
            let db = agent.position.distance_squared(&b.position);
            da.total_cmp(&db)
        })
}

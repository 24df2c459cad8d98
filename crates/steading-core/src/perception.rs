//! Perception assembly: what an agent sees, and the public view of an
//! agent shipped to the planner.
//!
//! Sightings come from the registry's exact-filtered range query over
//! the configured vision radius, with the observer itself excluded.

use std::collections::BTreeMap;

use steading_types::{Agent, AgentView, SightedEntity};
use steading_world::EntityRegistry;

/// Entities visible to `agent` within `vision_radius`, excluding the
/// agent itself.
pub fn observe(
    registry: &EntityRegistry,
    agent: &Agent,
    vision_radius: f64,
) -> Vec<SightedEntity> {
    registry
        .entities_in_range(&agent.position, vision_radius)
        .into_iter()
        .filter(|s| s.entity.id != agent.id.into_inner())
        .collect()
}

/// Flatten an agent into the public view the planner receives.
pub fn agent_view(agent: &Agent) -> AgentView {
    let mut inventory = BTreeMap::new();
    for stack in &agent.inventory {
        let entry = inventory.entry(stack.kind).or_insert(0_u32);
        *entry = entry.saturating_add(stack.quantity);
    }
    AgentView {
        id: agent.id,
        name: agent.name.clone(),
        position: agent.position,
        needs: agent.needs,
        health: agent.stats.health,
        money: agent.stats.money,
        skills: agent.skills,
        inventory,
        home: agent.owned_structures.first().copied(),
    }
}

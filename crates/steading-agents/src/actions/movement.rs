//! The move handler: one step toward a resolved target per tick.
//!
//! Target resolution prefers live registry positions and falls back to
//! the agent's remembered locations; a landmark target resolves purely
//! through memory. The agent advances up to `speed x 0.5` units per
//! tick; arrival snaps exactly onto the target and completes the
//! action, otherwise the move re-arms its timer and continues next
//! tick with no state reset.

use steading_types::{ActionTarget, Agent, AgentId, Position};
use steading_world::EntityRegistry;

use crate::error::ActionError;

use super::engine::{ActionEffect, acting_agent};

/// Fraction of the speed stat walked per tick.
const STEP_FACTOR: f64 = 0.5;

/// Resolve a move target to a position.
///
/// Entity targets read the registry first (structure/resource/agent
/// positions are authoritative) and fall back to a non-forgotten
/// memory of that entity. Landmark targets match valid memories by
/// subtype, nearest first, case-insensitively.
pub fn resolve_target(
    agent: &Agent,
    target: &ActionTarget,
    registry: &EntityRegistry,
) -> Option<Position> {
    match target {
        ActionTarget::Entity(id) => registry.position_of(*id).or_else(|| {
            agent
                .memory
                .iter()
                .find(|m| !m.forgotten && m.entity.id == *id)
                .map(|m| m.position)
        }),
        ActionTarget::Landmark(name) => agent
            .memory
            .iter()
            .filter(|m| !m.forgotten && m.subtype.eq_ignore_ascii_case(name))
            .min_by(|a, b| {
                let da = agent.position.distance_squared(&a.position);
                let db = agent.position.distance_squared(&b.position);
                da.total_cmp(&db)
            })
            .map(|m| m.position),
        _ => None,
    }
}

/// Advance the agent one step toward its move target.
///
/// # Errors
///
/// Returns [`ActionError::EntityMissing`] when the target resolves to
/// nothing (neither live entity nor memory).
pub fn step(
    agent_id: AgentId,
    target: &ActionTarget,
    registry: &mut EntityRegistry,
    tick: u64,
) -> Result<ActionEffect, ActionError> {
    let agent = acting_agent(agent_id, registry)?;
    let destination =
        resolve_target(&agent, target, registry).ok_or(ActionError::EntityMissing)?;

    let step_len = (agent.stats.speed * STEP_FACTOR).max(0.0);
    let arrived = agent.position.distance(&destination) <= step_len;
    let next = agent.position.step_toward(&destination, step_len);

    let _ = registry.update_agent(agent_id, |a| {
        a.position = next;
        if !arrived {
            // Continue next tick: re-arm the timer, keep the slot.
            a.progress.started_at = tick;
        }
    });

    if arrived {
        Ok(ActionEffect::Completed)
    } else {
        Ok(ActionEffect::InProgress)
    }
}

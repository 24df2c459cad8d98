//! Survival and social handlers: eat, sleep, socialize.
//!
//! Eating consumes one edible item and reduces hunger by its nutrition
//! value. Sleep restores energy in full. Socializing needs another
//! agent within conversational range and lifts both sides' social
//! need, the initiator's more.

use steading_types::{ActionTarget, AgentId, EntityKind};
use steading_world::EntityRegistry;

use crate::error::ActionError;
use crate::inventory;
use crate::items;

use super::engine::{ActionEffect, SOCIAL_RANGE, acting_agent};

/// Social lift for the agent who initiated the chat.
const SOCIAL_GAIN_INITIATOR: f64 = 0.3;

/// Social lift for the partner.
const SOCIAL_GAIN_PARTNER: f64 = 0.1;

/// Eat one unit of the target item.
///
/// # Errors
///
/// [`ActionError::Inedible`] for non-food targets and
/// [`ActionError::MissingMaterials`] when none is held.
pub fn eat(
    agent_id: AgentId,
    target: &ActionTarget,
    registry: &mut EntityRegistry,
) -> Result<ActionEffect, ActionError> {
    let ActionTarget::Item(item) = target else {
        return Err(ActionError::MalformedTarget);
    };
    let agent = acting_agent(agent_id, registry)?;
    let value = items::nutrition(*item).ok_or(ActionError::Inedible { item: *item })?;

    if !inventory::has(&agent.inventory, *item, 1) {
        return Err(ActionError::MissingMaterials {
            item: *item,
            needed: 1,
            have: 0,
        });
    }

    let _ = registry.update_agent(agent_id, |a| {
        let _ = inventory::remove(&mut a.inventory, *item, 1);
        a.needs.hunger = (a.needs.hunger - value).max(0.0);
    });
    Ok(ActionEffect::Completed)
}

/// Sleep: restore energy to full.
///
/// # Errors
///
/// Only [`ActionError::EntityMissing`] when the agent itself is gone.
pub fn sleep(agent_id: AgentId, registry: &mut EntityRegistry) -> Result<ActionEffect, ActionError> {
    let _ = acting_agent(agent_id, registry)?;
    let _ = registry.update_agent(agent_id, |a| {
        a.needs.energy = 1.0;
    });
    Ok(ActionEffect::Completed)
}

/// Chat with the nearest agent in range, lifting both social needs.
///
/// # Errors
///
/// [`ActionError::OutOfRange`] when nobody is within conversational
/// range.
pub fn socialize(
    agent_id: AgentId,
    registry: &mut EntityRegistry,
) -> Result<ActionEffect, ActionError> {
    let agent = acting_agent(agent_id, registry)?;

    let partner = registry
        .entities_in_range(&agent.position, SOCIAL_RANGE)
        .into_iter()
        .filter(|s| s.entity.kind == EntityKind::Agent && s.entity.id != agent_id.into_inner())
        .min_by(|a, b| {
            let da = agent.position.distance_squared(&a.position);
            let db = agent.position.distance_squared(&b.position);
            da.total_cmp(&db)
        });

    let Some(partner) = partner else {
        return Err(ActionError::OutOfRange {
            distance: f64::INFINITY,
            limit: SOCIAL_RANGE,
        });
    };

    let _ = registry.update_agent(agent_id, |a| {
        a.needs.social = (a.needs.social + SOCIAL_GAIN_INITIATOR).min(1.0);
    });
    let _ = registry.update_agent(AgentId::from(partner.entity.id), |a| {
        a.needs.social = (a.needs.social + SOCIAL_GAIN_PARTNER).min(1.0);
    });
    Ok(ActionEffect::Completed)
}

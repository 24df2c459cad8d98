//! Pickup and harvest (chop/mine) handlers.
//!
//! Pickup dispatches on the drop item's carry class: liquids need a
//! matching empty container in the hands, bulky goods need empty
//! hands, large loose stacks need a sack, and small goods go straight
//! to the inventory. A wrong carry state fails without consuming the
//! resource.
//!
//! Chop and mine validate the resource subtype and the required tool.
//! Heavy extraction sites carry a shared work record: each swing
//! contributes progress, and the contribution that completes the work
//! pays the full drop out to the most recent contributor. Tools wear
//! by one point per swing and break at zero.

use tracing::debug;

use steading_types::{
    ActionTarget, AgentId, ItemKind, ItemStack, ResourceId, SkillKind, StorageClass,
};
use steading_world::EntityRegistry;

use crate::error::ActionError;
use crate::inventory;
use crate::items;
use crate::skills::SKILL_GAIN;

use super::engine::{ActionEffect, PICKUP_RANGE, acting_agent, entity_target, require_range};

/// Progress contributed by one swing against a shared-work resource.
const WORK_PER_SWING: f64 = 34.0;

/// Units of water a filled barrel carries.
pub const WATER_PER_BARREL: u32 = 5;

/// Which harvest action is being executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarvestMode {
    /// Felling trees with an axe.
    Chop,
    /// Extracting stone or ore with a pickaxe.
    Mine,
}

/// Collect a resource by its drop item's carry class.
///
/// # Errors
///
/// Range, missing-entity, and carry-state failures; none of them
/// consume the resource.
pub fn pickup(
    agent_id: AgentId,
    target: &ActionTarget,
    registry: &mut EntityRegistry,
) -> Result<ActionEffect, ActionError> {
    let agent = acting_agent(agent_id, registry)?;
    let raw = entity_target(target)?;
    let resource = registry
        .resource(ResourceId::from(raw))
        .cloned()
        .ok_or(ActionError::EntityMissing)?;

    require_range(&agent.position, &resource.position, PICKUP_RANGE)?;

    let drop = items::drop_item(resource.kind);
    let taken: u32;

    match items::storage_class(drop) {
        StorageClass::Liquid => {
            // One fill per action, into a matching empty container.
            let holding_empty_barrel = agent
                .hands
                .as_ref()
                .is_some_and(|h| h.kind == ItemKind::Barrel);
            if !holding_empty_barrel {
                return Err(ActionError::InvalidCarryState {
                    reason: String::from("liquids need an empty barrel in hand"),
                });
            }
            taken = 1;
            let _ = registry.update_agent(agent_id, |a| {
                a.hands = Some(ItemStack::of(ItemKind::WaterBarrel, 1));
                a.skills.add(SkillKind::Gathering, SKILL_GAIN);
            });
        }
        StorageClass::Bulky => {
            if agent.hands.is_some() {
                return Err(ActionError::InvalidCarryState {
                    reason: String::from("bulky items need empty hands"),
                });
            }
            taken = 1;
            let _ = registry.update_agent(agent_id, |a| {
                a.hands = Some(ItemStack::of(drop, 1));
                a.skills.add(SkillKind::Gathering, SKILL_GAIN);
            });
        }
        StorageClass::Loose => {
            // The whole remaining stack comes up at once; big stacks
            // need a sack.
            taken = resource.remaining;
            if taken > items::LOOSE_STACK_THRESHOLD
                && !inventory::has(&agent.inventory, ItemKind::Sack, 1)
            {
                return Err(ActionError::InvalidCarryState {
                    reason: format!("{taken} loose units need a sack"),
                });
            }
            let _ = registry.update_agent(agent_id, |a| {
                inventory::add(&mut a.inventory, ItemStack::of(drop, taken));
                a.skills.add(SkillKind::Gathering, SKILL_GAIN);
            });
        }
        StorageClass::Small => {
            taken = resource.remaining;
            let _ = registry.update_agent(agent_id, |a| {
                inventory::add(&mut a.inventory, ItemStack::of(drop, taken));
                a.skills.add(SkillKind::Gathering, SKILL_GAIN);
            });
        }
    }

    settle_resource(registry, resource.id, taken);
    Ok(ActionEffect::Completed)
}

/// Swing against a chop/mine resource.
///
/// # Errors
///
/// Range, subtype, missing-entity, and missing-tool failures.
pub fn harvest(
    agent_id: AgentId,
    target: &ActionTarget,
    registry: &mut EntityRegistry,
    mode: HarvestMode,
) -> Result<ActionEffect, ActionError> {
    let agent = acting_agent(agent_id, registry)?;
    let raw = entity_target(target)?;
    let resource = registry
        .resource(ResourceId::from(raw))
        .cloned()
        .ok_or(ActionError::EntityMissing)?;

    require_range(&agent.position, &resource.position, PICKUP_RANGE)?;

    let subtype_ok = match mode {
        HarvestMode::Chop => items::is_chop_target(resource.kind),
        HarvestMode::Mine => items::is_mine_target(resource.kind),
    };
    if !subtype_ok {
        return Err(ActionError::WrongSubtype {
            found: format!("{:?}", resource.kind),
        });
    }

    let tool = items::required_tool(resource.kind).unwrap_or(match mode {
        HarvestMode::Chop => ItemKind::Axe,
        HarvestMode::Mine => ItemKind::Pickaxe,
    });
    if !inventory::has_tool(&agent.inventory, tool) {
        return Err(ActionError::MissingTool { tool });
    }

    let drop = items::drop_item(resource.kind);
    let skill = agent.skills.gathering;

    if let Some(mut work) = resource.work.clone() {
        // Shared work: contribute a swing; the completing swing pays
        // the full drop out to the most recent contributor.
        let contribution = WORK_PER_SWING + f64::from(skill);
        let completed = work.contribute(agent_id, contribution);

        if completed {
            let payout = resource.remaining;
            let _ = registry.update_agent(agent_id, |a| {
                inventory::add(&mut a.inventory, ItemStack::of(drop, payout));
                let _ = inventory::degrade_tool(&mut a.inventory, tool);
                a.skills.add(SkillKind::Gathering, SKILL_GAIN);
            });
            let _ = registry.remove(resource.id.into_inner());
            debug!(agent = %agent_id, resource = %resource.id, payout, "shared work completed");
        } else {
            let _ = registry.update_resource(resource.id, |r| {
                r.work = Some(work.clone());
                r.harvested = true;
            });
            let _ = registry.update_agent(agent_id, |a| {
                let _ = inventory::degrade_tool(&mut a.inventory, tool);
                a.skills.add(SkillKind::Gathering, SKILL_GAIN);
            });
        }
        return Ok(ActionEffect::Completed);
    }

    // Plain extraction: yield scales gently with skill.
    let yield_units = 1_u32
        .saturating_add(skill.saturating_div(4))
        .min(resource.remaining);

    let _ = registry.update_agent(agent_id, |a| {
        inventory::add(&mut a.inventory, ItemStack::of(drop, yield_units));
        let _ = inventory::degrade_tool(&mut a.inventory, tool);
        a.skills.add(SkillKind::Gathering, SKILL_GAIN);
    });
    settle_resource(registry, resource.id, yield_units);
    Ok(ActionEffect::Completed)
}

/// Deduct harvested units and delete the resource once exhausted.
fn settle_resource(registry: &mut EntityRegistry, id: ResourceId, taken: u32) {
    let mut exhausted = false;
    let _ = registry.update_resource(id, |r| {
        r.remaining = r.remaining.saturating_sub(taken);
        r.harvested = true;
        exhausted = r.remaining == 0;
    });
    if exhausted {
        let _ = registry.remove(id.into_inner());
    }
}

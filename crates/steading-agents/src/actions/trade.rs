//! Buy and sell handlers against trading structures.
//!
//! Both require proximity to a market-class structure and use the item
//! catalog's fixed per-unit prices. Selling moves one unit from the
//! agent into the structure and credits the agent; buying debits the
//! agent and, when the structure lacks stock, synthesizes it — the
//! structure side has no inventory ceiling (recorded open question).

use tracing::debug;

use steading_types::{ActionTarget, AgentId, ItemKind, ItemStack, SkillKind, StructureId};
use steading_world::EntityRegistry;

use crate::error::ActionError;
use crate::inventory;
use crate::items;
use crate::skills::SKILL_GAIN;

use super::engine::{ActionEffect, INTERACT_RANGE, acting_agent, require_range};

/// Resolve and validate the trading structure from a composite target.
fn trading_post(
    agent_position: &steading_types::Position,
    target: &ActionTarget,
    registry: &EntityRegistry,
) -> Result<(StructureId, ItemKind), ActionError> {
    let ActionTarget::Stored { container, item } = target else {
        return Err(ActionError::MalformedTarget);
    };
    let sid = StructureId::from(*container);
    let structure = registry.structure(sid).ok_or(ActionError::EntityMissing)?;
    if !structure.kind.is_trading() {
        return Err(ActionError::WrongSubtype {
            found: format!("{:?}", structure.kind),
        });
    }
    require_range(agent_position, &structure.position, INTERACT_RANGE)?;
    Ok((sid, *item))
}

/// Sell one unit to a trading structure.
///
/// # Errors
///
/// Range/subtype failures and [`ActionError::MissingMaterials`] when
/// the agent holds none of the item.
pub fn sell(
    agent_id: AgentId,
    target: &ActionTarget,
    registry: &mut EntityRegistry,
) -> Result<ActionEffect, ActionError> {
    let agent = acting_agent(agent_id, registry)?;
    let (sid, item) = trading_post(&agent.position, target, registry)?;

    if !inventory::has(&agent.inventory, item, 1) {
        return Err(ActionError::MissingMaterials {
            item,
            needed: 1,
            have: 0,
        });
    }

    let price = items::unit_price(item);
    let _ = registry.update_agent(agent_id, |a| {
        let _ = inventory::remove(&mut a.inventory, item, 1);
        a.stats.money = a.stats.money.saturating_add(price);
        a.skills.add(SkillKind::Trading, SKILL_GAIN);
    });
    let _ = registry.update_structure(sid, |s| {
        inventory::add(&mut s.inventory, ItemStack::of(item, 1));
        s.treasury = s.treasury.saturating_sub(price);
    });
    Ok(ActionEffect::Completed)
}

/// Buy one unit from a trading structure.
///
/// # Errors
///
/// Range/subtype failures and [`ActionError::InsufficientFunds`].
pub fn buy(
    agent_id: AgentId,
    target: &ActionTarget,
    registry: &mut EntityRegistry,
) -> Result<ActionEffect, ActionError> {
    let agent = acting_agent(agent_id, registry)?;
    let (sid, item) = trading_post(&agent.position, target, registry)?;

    let price = items::unit_price(item);
    if agent.stats.money < price {
        return Err(ActionError::InsufficientFunds {
            needed: price,
            have: agent.stats.money,
        });
    }

    let _ = registry.update_structure(sid, |s| {
        if inventory::has(&s.inventory, item, 1) {
            let _ = inventory::remove(&mut s.inventory, item, 1);
        } else {
            // No stock: synthesize the unit (unbounded structure-side
            // inventory; recorded open question).
            debug!(structure = %sid, ?item, "stock synthesized for purchase");
        }
        s.treasury = s.treasury.saturating_add(price);
    });
    let _ = registry.update_agent(agent_id, |a| {
        a.stats.money = a.stats.money.saturating_sub(price);
        let stack = items::tool_durability(item).map_or_else(
            || ItemStack::of(item, 1),
            |durability| ItemStack::durable(item, durability),
        );
        inventory::add(&mut a.inventory, stack);
        a.skills.add(SkillKind::Trading, SKILL_GAIN);
    });
    Ok(ActionEffect::Completed)
}

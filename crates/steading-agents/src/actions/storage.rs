//! Store, retrieve, and hand-place handlers.
//!
//! Store and retrieve are the symmetric one-unit transfer between an
//! agent's pack and a storage-class structure, gated on proximity and
//! quantity. Place converts a held bulky item into a new structure on
//! the spot, transferring any held contents (a filled water barrel
//! becomes a storage barrel holding water).

use steading_types::{
    ActionTarget, AgentId, ItemKind, ItemStack, Position, StorageClass, Structure, StructureId,
    StructureKind,
};
use steading_world::EntityRegistry;
use steading_world::contract::template;

use crate::error::ActionError;
use crate::inventory;
use crate::items;

use super::engine::{ActionEffect, INTERACT_RANGE, acting_agent, require_range};

use rust_decimal::Decimal;

/// Units of water transferred out of a placed filled barrel.
const WATER_PER_PLACED_BARREL: u32 = 5;

/// Resolve and validate the storage structure from a composite target.
fn storage_container(
    agent_position: &Position,
    target: &ActionTarget,
    registry: &EntityRegistry,
) -> Result<(StructureId, ItemKind), ActionError> {
    let ActionTarget::Stored { container, item } = target else {
        return Err(ActionError::MalformedTarget);
    };
    let sid = StructureId::from(*container);
    let structure = registry.structure(sid).ok_or(ActionError::EntityMissing)?;
    if !structure.kind.is_storage() {
        return Err(ActionError::WrongSubtype {
            found: format!("{:?}", structure.kind),
        });
    }
    require_range(agent_position, &structure.position, INTERACT_RANGE)?;
    Ok((sid, *item))
}

/// Deposit one unit into a storage structure.
///
/// # Errors
///
/// Range/subtype failures and [`ActionError::MissingMaterials`] when
/// the agent holds none of the item.
pub fn store(
    agent_id: AgentId,
    target: &ActionTarget,
    registry: &mut EntityRegistry,
) -> Result<ActionEffect, ActionError> {
    let agent = acting_agent(agent_id, registry)?;
    let (sid, item) = storage_container(&agent.position, target, registry)?;

    if !inventory::has(&agent.inventory, item, 1) {
        return Err(ActionError::MissingMaterials {
            item,
            needed: 1,
            have: 0,
        });
    }

    let _ = registry.update_agent(agent_id, |a| {
        let _ = inventory::remove(&mut a.inventory, item, 1);
    });
    let _ = registry.update_structure(sid, |s| {
        inventory::add(&mut s.inventory, ItemStack::of(item, 1));
    });
    Ok(ActionEffect::Completed)
}

/// Withdraw one unit from a storage structure.
///
/// # Errors
///
/// Range/subtype failures and [`ActionError::MissingMaterials`] when
/// the structure holds none of the item.
pub fn retrieve(
    agent_id: AgentId,
    target: &ActionTarget,
    registry: &mut EntityRegistry,
) -> Result<ActionEffect, ActionError> {
    let agent = acting_agent(agent_id, registry)?;
    let (sid, item) = storage_container(&agent.position, target, registry)?;

    let stocked = registry
        .structure(sid)
        .is_some_and(|s| inventory::has(&s.inventory, item, 1));
    if !stocked {
        return Err(ActionError::MissingMaterials {
            item,
            needed: 1,
            have: 0,
        });
    }

    let _ = registry.update_structure(sid, |s| {
        let _ = inventory::remove(&mut s.inventory, item, 1);
    });
    let _ = registry.update_agent(agent_id, |a| {
        inventory::add(&mut a.inventory, ItemStack::of(item, 1));
    });
    Ok(ActionEffect::Completed)
}

/// Convert the held bulky item into a structure beside the agent.
///
/// # Errors
///
/// [`ActionError::InvalidCarryState`] when the hands are empty or the
/// held item is not bulky.
pub fn place(agent_id: AgentId, registry: &mut EntityRegistry) -> Result<ActionEffect, ActionError> {
    let agent = acting_agent(agent_id, registry)?;

    let Some(held) = agent.hands else {
        return Err(ActionError::InvalidCarryState {
            reason: String::from("nothing in hand to place"),
        });
    };
    if items::storage_class(held.kind) != StorageClass::Bulky {
        return Err(ActionError::InvalidCarryState {
            reason: format!("{:?} cannot be placed", held.kind),
        });
    }

    // A filled barrel transfers its contents into the new structure.
    let contents = if held.kind == ItemKind::WaterBarrel {
        vec![ItemStack::of(ItemKind::Water, WATER_PER_PLACED_BARREL)]
    } else {
        Vec::new()
    };

    let spec = template(StructureKind::StorageBarrel);
    let structure = Structure {
        id: StructureId::new(),
        position: Position::new(agent.position.x + 1.0, agent.position.y),
        kind: StructureKind::StorageBarrel,
        inventory: contents,
        treasury: Decimal::ZERO,
        owner: Some(agent_id),
        blocks_movement: spec.blocks_movement,
        footprint: spec.footprint,
        work: None,
    };
    let sid = structure.id;
    let _ = registry.create_structure(structure);
    let _ = registry.update_agent(agent_id, |a| {
        a.hands = None;
        a.owned_structures.push(sid);
    });
    Ok(ActionEffect::Completed)
}

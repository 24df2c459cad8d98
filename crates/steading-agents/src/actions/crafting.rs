//! The crafting handler and recipe table.
//!
//! Recipes are looked up by output item. A recipe can demand a
//! workstation (a structure kind within reach), a minimum crafting
//! skill, and a set of inputs. Outputs follow the item catalog: durable
//! kinds get a fresh durability-bearing stack, bulky kinds go to the
//! hands, stackable kinds merge. Workstation and skill-gated recipes
//! grant the larger skill gain.

use std::collections::BTreeMap;

use steading_types::{
    ActionTarget, AgentId, EntityKind, ItemKind, ItemStack, SkillKind, StorageClass,
    StructureId, StructureKind,
};
use steading_world::EntityRegistry;

use crate::error::ActionError;
use crate::inventory;
use crate::items;
use crate::skills::{SKILL_GAIN, SKILL_GAIN_GATED};

use super::engine::{ActionEffect, INTERACT_RANGE, acting_agent, require_range};

/// One crafting recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    /// The item produced.
    pub output: ItemKind,
    /// Units produced per craft.
    pub output_quantity: u32,
    /// Inputs consumed per craft.
    pub inputs: BTreeMap<ItemKind, u32>,
    /// Workstation required within reach, if any.
    pub station: Option<StructureKind>,
    /// Minimum crafting skill.
    pub min_skill: u32,
}

/// Look up the recipe producing an output item.
pub fn recipe_for(output: ItemKind) -> Option<Recipe> {
    let recipe = match output {
        ItemKind::Bread => Recipe {
            output,
            output_quantity: 1,
            inputs: BTreeMap::from([(ItemKind::Wheat, 3)]),
            station: None,
            min_skill: 0,
        },
        ItemKind::Sack => Recipe {
            output,
            output_quantity: 1,
            inputs: BTreeMap::from([(ItemKind::Wheat, 2)]),
            station: None,
            min_skill: 0,
        },
        ItemKind::Plank => Recipe {
            output,
            output_quantity: 2,
            inputs: BTreeMap::from([(ItemKind::Wood, 2)]),
            station: Some(StructureKind::Workshop),
            min_skill: 1,
        },
        ItemKind::Axe => Recipe {
            output,
            output_quantity: 1,
            inputs: BTreeMap::from([(ItemKind::Wood, 2), (ItemKind::Stone, 1)]),
            station: Some(StructureKind::Workshop),
            min_skill: 2,
        },
        ItemKind::Pickaxe => Recipe {
            output,
            output_quantity: 1,
            inputs: BTreeMap::from([(ItemKind::Wood, 2), (ItemKind::Stone, 2)]),
            station: Some(StructureKind::Workshop),
            min_skill: 2,
        },
        ItemKind::Barrel => Recipe {
            output,
            output_quantity: 1,
            inputs: BTreeMap::from([(ItemKind::Plank, 4)]),
            station: Some(StructureKind::Workshop),
            min_skill: 3,
        },
        ItemKind::IronBar => Recipe {
            output,
            output_quantity: 1,
            inputs: BTreeMap::from([(ItemKind::IronOre, 2)]),
            station: Some(StructureKind::Workshop),
            min_skill: 4,
        },
        _ => return None,
    };
    Some(recipe)
}

/// Whether a workstation of the given kind stands within reach.
fn station_in_reach(
    registry: &EntityRegistry,
    agent_position: &steading_types::Position,
    station: StructureKind,
) -> bool {
    registry
        .entities_in_range(agent_position, INTERACT_RANGE)
        .iter()
        .any(|sighted| {
            sighted.entity.kind == EntityKind::Structure
                && registry
                    .structure(StructureId::from(sighted.entity.id))
                    .is_some_and(|s| s.kind == station)
        })
}

/// Craft the target output item.
///
/// # Errors
///
/// Unknown recipes, missing workstations, low skill, missing inputs,
/// and full hands for bulky outputs — all without consuming anything.
pub fn craft(
    agent_id: AgentId,
    target: &ActionTarget,
    registry: &mut EntityRegistry,
) -> Result<ActionEffect, ActionError> {
    let ActionTarget::Item(output) = target else {
        return Err(ActionError::MalformedTarget);
    };
    let agent = acting_agent(agent_id, registry)?;
    let recipe = recipe_for(*output).ok_or(ActionError::UnknownRecipe { output: *output })?;

    if let Some(station) = recipe.station {
        if !station_in_reach(registry, &agent.position, station) {
            return Err(ActionError::NoWorkstation { station });
        }
    }

    if agent.skills.crafting < recipe.min_skill {
        return Err(ActionError::SkillTooLow {
            skill: SkillKind::Crafting,
            needed: recipe.min_skill,
            have: agent.skills.crafting,
        });
    }

    for (input, needed) in &recipe.inputs {
        let have = inventory::count(&agent.inventory, *input);
        if have < *needed {
            return Err(ActionError::MissingMaterials {
                item: *input,
                needed: *needed,
                have,
            });
        }
    }

    // Bulky outputs go to the hands; check before consuming inputs.
    let bulky = items::storage_class(recipe.output) == StorageClass::Bulky;
    if bulky && agent.hands.is_some() {
        return Err(ActionError::InvalidCarryState {
            reason: String::from("bulky output needs empty hands"),
        });
    }

    let gated = recipe.station.is_some() || recipe.min_skill > 0;
    let gain = if gated { SKILL_GAIN_GATED } else { SKILL_GAIN };

    let _ = registry.update_agent(agent_id, |a| {
        for (input, needed) in &recipe.inputs {
            // Presence verified above.
            let _ = inventory::remove(&mut a.inventory, *input, *needed);
        }
        if let Some(durability) = items::tool_durability(recipe.output) {
            inventory::add(&mut a.inventory, ItemStack::durable(recipe.output, durability));
        } else if bulky {
            a.hands = Some(ItemStack::of(recipe.output, recipe.output_quantity));
        } else {
            inventory::add(
                &mut a.inventory,
                ItemStack::of(recipe.output, recipe.output_quantity),
            );
        }
        a.skills.add(SkillKind::Crafting, gain);
    });

    Ok(ActionEffect::Completed)
}

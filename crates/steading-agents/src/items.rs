//! The item catalog: carry classes, prices, nutrition, tool wear, and
//! the resource-to-drop mapping.
//!
//! All static item data lives in these tables. Prices are fixed per
//! unit (markets do not float prices); nutrition is the hunger
//! reduction from eating one unit.

use rust_decimal::Decimal;

use steading_types::{ItemKind, ResourceKind, StorageClass};

/// Loose stacks larger than this need a sack to pick up; smaller ones
/// go straight to the inventory.
pub const LOOSE_STACK_THRESHOLD: u32 = 3;

/// Fresh durability on a newly crafted tool.
pub const TOOL_DURABILITY: u32 = 20;

/// Carry class of an item kind, driving pickup dispatch.
pub const fn storage_class(kind: ItemKind) -> StorageClass {
    match kind {
        ItemKind::Bread | ItemKind::Axe | ItemKind::Pickaxe | ItemKind::Sack => {
            StorageClass::Small
        }
        ItemKind::Berry
        | ItemKind::Apple
        | ItemKind::Wheat
        | ItemKind::Mushroom
        | ItemKind::Wood
        | ItemKind::Stone
        | ItemKind::IronOre
        | ItemKind::IronBar
        | ItemKind::Plank => StorageClass::Loose,
        ItemKind::Barrel | ItemKind::WaterBarrel => StorageClass::Bulky,
        ItemKind::Water => StorageClass::Liquid,
    }
}

/// Whether stacks of this kind merge in an inventory.
///
/// Tools carry durability and bulky goods are carried singly, so
/// neither merges.
pub const fn is_stackable(kind: ItemKind) -> bool {
    !matches!(
        kind,
        ItemKind::Axe | ItemKind::Pickaxe | ItemKind::Barrel | ItemKind::WaterBarrel
    )
}

/// Initial durability for durable (tool) kinds; `None` otherwise.
pub const fn tool_durability(kind: ItemKind) -> Option<u32> {
    match kind {
        ItemKind::Axe | ItemKind::Pickaxe => Some(TOOL_DURABILITY),
        _ => None,
    }
}

/// Fixed per-unit trade price.
pub const fn unit_price(kind: ItemKind) -> Decimal {
    // from_parts(lo, mid, hi, negative, scale): scale 1 => tenths.
    match kind {
        ItemKind::Berry => Decimal::from_parts(5, 0, 0, false, 1), // 0.5
        ItemKind::Apple => Decimal::from_parts(6, 0, 0, false, 1), // 0.6
        ItemKind::Wheat => Decimal::from_parts(4, 0, 0, false, 1), // 0.4
        ItemKind::Mushroom => Decimal::from_parts(8, 0, 0, false, 1), // 0.8
        ItemKind::Bread => Decimal::from_parts(2, 0, 0, false, 0), // 2.0
        ItemKind::Wood => Decimal::from_parts(1, 0, 0, false, 0),  // 1.0
        ItemKind::Stone => Decimal::from_parts(8, 0, 0, false, 1), // 0.8
        ItemKind::IronOre => Decimal::from_parts(2, 0, 0, false, 0), // 2.0
        ItemKind::IronBar => Decimal::from_parts(5, 0, 0, false, 0), // 5.0
        ItemKind::Plank => Decimal::from_parts(15, 0, 0, false, 1), // 1.5
        ItemKind::Axe | ItemKind::Pickaxe => Decimal::from_parts(6, 0, 0, false, 0), // 6.0
        ItemKind::Sack => Decimal::from_parts(3, 0, 0, false, 0),  // 3.0
        ItemKind::Barrel => Decimal::from_parts(4, 0, 0, false, 0), // 4.0
        ItemKind::WaterBarrel => Decimal::from_parts(45, 0, 0, false, 1), // 4.5
        ItemKind::Water => Decimal::from_parts(2, 0, 0, false, 1), // 0.2
    }
}

/// Hunger reduction from eating one unit; `None` for inedible kinds.
pub const fn nutrition(kind: ItemKind) -> Option<f64> {
    match kind {
        ItemKind::Berry => Some(0.15),
        ItemKind::Apple => Some(0.2),
        ItemKind::Wheat => Some(0.1),
        ItemKind::Mushroom => Some(0.25),
        ItemKind::Bread => Some(0.5),
        _ => None,
    }
}

/// The item a resource drops when harvested.
pub const fn drop_item(kind: ResourceKind) -> ItemKind {
    match kind {
        ResourceKind::BerryBush => ItemKind::Berry,
        ResourceKind::AppleTree => ItemKind::Apple,
        ResourceKind::WheatPatch => ItemKind::Wheat,
        ResourceKind::MushroomPatch => ItemKind::Mushroom,
        ResourceKind::OakTree | ResourceKind::PineTree => ItemKind::Wood,
        ResourceKind::StoneRock => ItemKind::Stone,
        ResourceKind::IronVein => ItemKind::IronOre,
        ResourceKind::WaterSpring => ItemKind::Water,
        ResourceKind::AbandonedBarrel => ItemKind::Barrel,
    }
}

/// The tool a harvest action needs against this resource, if any.
pub const fn required_tool(kind: ResourceKind) -> Option<ItemKind> {
    match kind {
        ResourceKind::OakTree | ResourceKind::PineTree => Some(ItemKind::Axe),
        ResourceKind::StoneRock | ResourceKind::IronVein => Some(ItemKind::Pickaxe),
        _ => None,
    }
}

/// Whether a chop action matches this resource subtype.
pub const fn is_chop_target(kind: ResourceKind) -> bool {
    matches!(kind, ResourceKind::OakTree | ResourceKind::PineTree)
}

/// Whether a mine action matches this resource subtype.
pub const fn is_mine_target(kind: ResourceKind) -> bool {
    matches!(kind, ResourceKind::StoneRock | ResourceKind::IronVein)
}

/// Snake-case wire name for an item kind (plan step identifiers).
pub const fn item_name(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Berry => "berry",
        ItemKind::Apple => "apple",
        ItemKind::Wheat => "wheat",
        ItemKind::Mushroom => "mushroom",
        ItemKind::Bread => "bread",
        ItemKind::Wood => "wood",
        ItemKind::Stone => "stone",
        ItemKind::IronOre => "iron_ore",
        ItemKind::IronBar => "iron_bar",
        ItemKind::Plank => "plank",
        ItemKind::Axe => "axe",
        ItemKind::Pickaxe => "pickaxe",
        ItemKind::Sack => "sack",
        ItemKind::Barrel => "barrel",
        ItemKind::WaterBarrel => "water_barrel",
        ItemKind::Water => "water",
    }
}

/// Parse a snake-case wire name back into an item kind.
pub fn parse_item(name: &str) -> Option<ItemKind> {
    match name {
        "berry" => Some(ItemKind::Berry),
        "apple" => Some(ItemKind::Apple),
        "wheat" => Some(ItemKind::Wheat),
        "mushroom" => Some(ItemKind::Mushroom),
        "bread" => Some(ItemKind::Bread),
        "wood" => Some(ItemKind::Wood),
        "stone" => Some(ItemKind::Stone),
        "iron_ore" => Some(ItemKind::IronOre),
        "iron_bar" => Some(ItemKind::IronBar),
        "plank" => Some(ItemKind::Plank),
        "axe" => Some(ItemKind::Axe),
        "pickaxe" => Some(ItemKind::Pickaxe),
        "sack" => Some(ItemKind::Sack),
        "barrel" => Some(ItemKind::Barrel),
        "water_barrel" => Some(ItemKind::WaterBarrel),
        "water" => Some(ItemKind::Water),
        _ => None,
    }
}

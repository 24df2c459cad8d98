//! Enumeration types for the Steading simulation.
//!
//! Closed vocabularies shared across the workspace: entity kinds, resource
//! and structure subtypes, the item catalog keys with their carry classes,
//! the action catalog, goal taxonomy, and the contract state machine.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// Which typed collection of the entity registry a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// An autonomous NPC.
    Agent,
    /// A harvestable world resource.
    Resource,
    /// A constructed building.
    Structure,
}

/// Subtype of a harvestable resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Bush carrying edible berries (pickup).
    BerryBush,
    /// Tree carrying edible apples (pickup).
    AppleTree,
    /// Patch of wild wheat (pickup).
    WheatPatch,
    /// Patch of edible mushrooms (pickup).
    MushroomPatch,
    /// Oak tree felled for wood (chop).
    OakTree,
    /// Pine tree felled for wood (chop).
    PineTree,
    /// Surface stone deposit (mine).
    StoneRock,
    /// Iron ore vein; heavy, shared work (mine).
    IronVein,
    /// Natural spring yielding water (pickup into a container).
    WaterSpring,
    /// An abandoned barrel lying in the world (bulky pickup).
    AbandonedBarrel,
}

/// Subtype of a structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StructureKind {
    /// A dwelling. Home-class: construction contracts grant the customer
    /// first ownership.
    Home,
    /// Trading venue for buy/sell actions.
    Market,
    /// Crafting workstation required by gated recipes.
    Workshop,
    /// Communal item storage.
    Storehouse,
    /// A placed barrel acting as a small container.
    StorageBarrel,
}

impl StructureKind {
    /// Whether construction contracts for this kind grant the customer
    /// first ownership on completion.
    pub const fn is_home_class(self) -> bool {
        matches!(self, Self::Home)
    }

    /// Whether buy/sell actions are valid against this structure.
    pub const fn is_trading(self) -> bool {
        matches!(self, Self::Market)
    }

    /// Whether store/retrieve actions are valid against this structure.
    pub const fn is_storage(self) -> bool {
        matches!(self, Self::Storehouse | Self::StorageBarrel | Self::Home)
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// A kind of item that can sit in an inventory, a hand slot, or a
/// structure's stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Edible berries.
    Berry,
    /// Edible apples.
    Apple,
    /// Raw wheat; also an input for bread and sacks.
    Wheat,
    /// Edible mushrooms.
    Mushroom,
    /// Baked bread, the best food per unit.
    Bread,
    /// Lumber from felled trees.
    Wood,
    /// Quarried stone.
    Stone,
    /// Raw iron ore.
    IronOre,
    /// Smelted iron.
    IronBar,
    /// Sawn plank, an intermediate crafting good.
    Plank,
    /// Tool required for chopping; wears out with use.
    Axe,
    /// Tool required for mining; wears out with use.
    Pickaxe,
    /// Carry bag required to pick up large loose stacks.
    Sack,
    /// Empty barrel; bulky, carried in the hands.
    Barrel,
    /// Barrel filled with water; bulky, carried in the hands.
    WaterBarrel,
    /// Water; only exists inside containers and structure stores.
    Water,
}

/// Carry class of an item, driving the pickup dispatch rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StorageClass {
    /// Small goods that always fit in the inventory (tools, bread).
    Small,
    /// Loose bulk goods; stacks beyond the loose threshold need a sack.
    Loose,
    /// Bulky goods carried one at a time in the hands.
    Bulky,
    /// Liquids that need a matching empty container in the hands.
    Liquid,
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// The closed catalog of actions an agent can execute.
///
/// The plan-to-action translator parses planner step identifiers into one
/// of these plus an action target; the execution engine dispatches on the
/// variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActionType {
    /// Walk toward a target position, one step per tick.
    Move,
    /// Collect a resource by carry class.
    Pickup,
    /// Fell a tree for wood (requires an axe).
    Chop,
    /// Extract stone or ore (requires a pickaxe).
    Mine,
    /// Produce an item from a recipe.
    Craft,
    /// Consume an edible item to reduce hunger.
    Eat,
    /// Rest to restore energy fully.
    Sleep,
    /// Chat with a nearby agent to restore the social need.
    Socialize,
    /// Purchase an item from a trading structure.
    Buy,
    /// Sell an item to a trading structure.
    Sell,
    /// Deposit items into a storage structure.
    Store,
    /// Withdraw items from a storage structure.
    Retrieve,
    /// Wait in place for a fixed duration.
    Idle,
    /// Customer drafts a construction contract.
    DraftContract,
    /// Provider signs a drafted contract.
    SignContract,
    /// Customer pays the prepayment on a signed contract.
    PayPrepayment,
    /// Provider performs the build, consuming materials and raising the
    /// structure.
    BuildStep,
    /// Customer pays the remainder on a completed contract.
    PayFinal,
    /// Convert a held bulky item into a structure on the spot.
    Place,
}

// ---------------------------------------------------------------------------
// Goals
// ---------------------------------------------------------------------------

/// Taxonomy of goals an agent can pursue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GoalKind {
    /// Bring a need (hunger, energy, health) back into range.
    MaintainNeed,
    /// Obtain a specific item.
    ObtainItem,
    /// Raise a skill to a target level.
    ReachSkill,
    /// Accumulate money.
    AccumulateWealth,
    /// Get a structure built.
    BuildStructure,
    /// Fulfill a posted order.
    CompleteOrder,
    /// Satisfy the social need.
    Socialize,
    /// Acquire knowledge or skills from others.
    Learn,
}

/// Comparison operator in a goal satisfaction condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConditionOp {
    /// Equal (within a small tolerance for float-valued keys).
    Eq,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
}

/// Coarse classification of an agent's overall wellbeing, biasing goal
/// generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ContextState {
    /// A critical need combined with low money.
    Desperate,
    /// One elevated need, or low money.
    Struggling,
    /// Nothing urgent either way.
    Stable,
    /// All needs comfortable and money to spare.
    Thriving,
}

// ---------------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------------

/// State machine of a construction contract.
///
/// Transitions run strictly draft -> signed -> prepaid -> completed ->
/// paid; each is driven by exactly one action type and validated against
/// the actor's role. Invalid transitions leave the contract untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ContractStatus {
    /// Drafted by the customer; awaiting a provider's signature.
    Draft,
    /// Signed by a provider; awaiting the prepayment.
    Signed,
    /// Prepayment received; the provider may build.
    Prepaid,
    /// The structure is built; awaiting the final payment.
    Completed,
    /// Fully paid out. Terminal.
    Paid,
}

/// The skills an agent develops through use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SkillKind {
    /// Harvest-class actions: chop, mine, pickup.
    Gathering,
    /// Craft-class actions.
    Crafting,
    /// Buy and sell actions.
    Trading,
    /// Retention of remembered locations.
    Memory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_class_is_only_home() {
        assert!(StructureKind::Home.is_home_class());
        assert!(!StructureKind::Market.is_home_class());
        assert!(!StructureKind::Storehouse.is_home_class());
        assert!(!StructureKind::StorageBarrel.is_home_class());
    }

    #[test]
    fn trading_structures() {
        assert!(StructureKind::Market.is_trading());
        assert!(!StructureKind::Home.is_trading());
    }

    #[test]
    fn storage_structures() {
        assert!(StructureKind::Storehouse.is_storage());
        assert!(StructureKind::StorageBarrel.is_storage());
        assert!(StructureKind::Home.is_storage());
        assert!(!StructureKind::Market.is_storage());
    }

    #[test]
    fn contract_status_ordering_follows_lifecycle() {
        assert!(ContractStatus::Draft < ContractStatus::Signed);
        assert!(ContractStatus::Signed < ContractStatus::Prepaid);
        assert!(ContractStatus::Prepaid < ContractStatus::Completed);
        assert!(ContractStatus::Completed < ContractStatus::Paid);
    }

    #[test]
    fn enums_roundtrip_serde() {
        let json = serde_json::to_string(&ActionType::BuildStep).ok();
        assert!(json.is_some());
        let back: Result<ActionType, _> =
            serde_json::from_str(json.as_deref().unwrap_or(""));
        assert_eq!(back.ok(), Some(ActionType::BuildStep));
    }
}

//! World generation: seed a registry with agents, resources, and the
//! starter structures.
//!
//! Generation is driven by [`GenerateParams`] (map size, agent count,
//! resource density, optional seed). A seeded run is reproducible; an
//! unseeded run pulls entropy from the thread RNG.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rust_decimal::Decimal;
use tracing::info;

use steading_types::{
    ActionProgress, Agent, AgentId, Needs, Personality, Position, Resource, ResourceId,
    ResourceKind, Skills, Stats, Structure, StructureId, StructureKind, WorkProgress,
};

use crate::error::WorldError;
use crate::registry::EntityRegistry;
use crate::spatial::DEFAULT_CELL_SIZE;

/// Hard ceiling on generated resources, protecting against runaway
/// density parameters.
const MAX_RESOURCES: usize = 10_000;

/// Starting money for generated agents.
const STARTING_MONEY: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

/// Name pool for generated agents; reused with numeric suffixes once
/// exhausted.
const AGENT_NAMES: &[&str] = &[
    "Alder", "Bryn", "Cole", "Dara", "Edda", "Fenn", "Greta", "Hale", "Isolde", "Jory",
    "Kerr", "Lena", "Moss", "Nyra", "Orrin", "Petra", "Quill", "Rowan", "Senna", "Tamsin",
];

/// Archetype labels assigned round-robin to generated agents.
const ARCHETYPES: &[&str] = &["farmer", "woodcutter", "miner", "trader", "wanderer"];

/// Parameters for world generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateParams {
    /// Side length of the square map, in world units.
    pub size: f64,
    /// Number of agents to create.
    pub agent_count: u32,
    /// Resources per square world unit (e.g. 0.01 = one per 10x10 patch).
    pub resource_density: f64,
    /// RNG seed for reproducible worlds; `None` draws from the thread RNG.
    pub seed: Option<u64>,
}

impl Default for GenerateParams {
    fn default() -> Self {
        Self {
            size: 200.0,
            agent_count: 10,
            resource_density: 0.005,
            seed: None,
        }
    }
}

/// Seed a resource with the canonical per-kind profile.
///
/// Heavy extraction sites (oak trees, iron veins) carry a shared
/// [`WorkProgress`] record so multiple agents can fell/extract together.
pub fn seed_resource(kind: ResourceKind, position: Position) -> Resource {
    let (remaining, value_cents, edible, blocks, footprint, shared_work) = match kind {
        ResourceKind::BerryBush => (6, 40, true, false, (1, 1), false),
        ResourceKind::AppleTree => (8, 50, true, true, (1, 1), false),
        ResourceKind::WheatPatch => (5, 30, true, false, (2, 2), false),
        ResourceKind::MushroomPatch => (4, 60, true, false, (1, 1), false),
        ResourceKind::OakTree => (10, 100, false, true, (1, 1), true),
        ResourceKind::PineTree => (8, 80, false, true, (1, 1), false),
        ResourceKind::StoneRock => (12, 70, false, true, (2, 2), false),
        ResourceKind::IronVein => (16, 200, false, true, (2, 2), true),
        ResourceKind::WaterSpring => (50, 10, false, false, (1, 1), false),
        ResourceKind::AbandonedBarrel => (1, 150, false, false, (1, 1), false),
    };
    Resource {
        id: ResourceId::new(),
        position,
        kind,
        remaining,
        harvested: false,
        value: Decimal::new(value_cents, 2),
        edible,
        blocks_movement: blocks,
        footprint,
        work: if shared_work {
            Some(WorkProgress::default())
        } else {
            None
        },
    }
}

/// The weighted pool of resource kinds scattered across the map.
const RESOURCE_POOL: &[(ResourceKind, u32)] = &[
    (ResourceKind::BerryBush, 5),
    (ResourceKind::AppleTree, 3),
    (ResourceKind::WheatPatch, 3),
    (ResourceKind::MushroomPatch, 2),
    (ResourceKind::OakTree, 4),
    (ResourceKind::PineTree, 4),
    (ResourceKind::StoneRock, 3),
    (ResourceKind::IronVein, 1),
    (ResourceKind::WaterSpring, 1),
    (ResourceKind::AbandonedBarrel, 1),
];

/// Pick a resource kind from the weighted pool.
fn pick_resource_kind(rng: &mut SmallRng) -> ResourceKind {
    let total: u32 = RESOURCE_POOL.iter().map(|(_, w)| *w).sum();
    let mut roll = rng.random_range(0..total.max(1));
    for (kind, weight) in RESOURCE_POOL {
        if roll < *weight {
            return *kind;
        }
        roll = roll.saturating_sub(*weight);
    }
    ResourceKind::BerryBush
}

/// Roll a personality with traits uniform in `[0, 1]`.
fn roll_personality(rng: &mut SmallRng, archetype: &str) -> Personality {
    Personality {
        industry: rng.random_range(0.0..=1.0),
        greed: rng.random_range(0.0..=1.0),
        sociability: rng.random_range(0.0..=1.0),
        courage: rng.random_range(0.0..=1.0),
        curiosity: rng.random_range(0.0..=1.0),
        patience: rng.random_range(0.0..=1.0),
        archetype: String::from(archetype),
    }
}

/// Generate a fresh world into a new registry.
///
/// Places the communal structures (market, workshop, storehouse) around
/// the map center, scatters resources by density, and spawns agents
/// with rolled personalities at random positions.
///
/// # Errors
///
/// Returns [`WorldError::InvalidParameter`] for a non-positive or
/// non-finite map size.
pub fn generate(params: &GenerateParams) -> Result<EntityRegistry, WorldError> {
    if !params.size.is_finite() || params.size <= 0.0 {
        return Err(WorldError::InvalidParameter {
            reason: format!("map size must be positive, got {}", params.size),
        });
    }

    let mut rng = params.seed.map_or_else(
        || SmallRng::from_rng(&mut rand::rng()),
        SmallRng::seed_from_u64,
    );

    let mut registry = EntityRegistry::new(DEFAULT_CELL_SIZE);
    let center = params.size / 2.0;

    // Communal structures ring the map center.
    for (kind, dx, dy) in [
        (StructureKind::Market, 0.0, 0.0),
        (StructureKind::Workshop, 8.0, 0.0),
        (StructureKind::Storehouse, 0.0, 8.0),
    ] {
        let structure = Structure {
            id: StructureId::new(),
            position: Position::new(center + dx, center + dy),
            kind,
            inventory: Vec::new(),
            treasury: Decimal::new(500, 0),
            owner: None,
            blocks_movement: true,
            footprint: (3, 3),
            work: None,
        };
        registry.create_structure(structure)?;
    }

    // Scatter resources by density, hard-capped.
    let target = (params.size * params.size * params.resource_density.max(0.0)).min(
        // Cap before the cast so the f64 is always in range.
        u32::try_from(MAX_RESOURCES).map_or(f64::MAX, f64::from),
    );
    // Bounded above by MAX_RESOURCES, so the cast is lossless.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let resource_count = target as usize;

    for _ in 0..resource_count {
        let kind = pick_resource_kind(&mut rng);
        let position = Position::new(
            rng.random_range(0.0..params.size),
            rng.random_range(0.0..params.size),
        );
        registry.create_resource(seed_resource(kind, position))?;
    }

    // Spawn agents.
    for index in 0..params.agent_count {
        let idx = usize::try_from(index).unwrap_or_default();
        let base = AGENT_NAMES
            .get(idx % AGENT_NAMES.len())
            .copied()
            .unwrap_or("Settler");
        let name = if idx < AGENT_NAMES.len() {
            String::from(base)
        } else {
            format!("{base} {}", idx / AGENT_NAMES.len())
        };
        let archetype = ARCHETYPES
            .get(idx % ARCHETYPES.len())
            .copied()
            .unwrap_or("villager");

        let agent = Agent {
            id: AgentId::new(),
            name,
            position: Position::new(
                rng.random_range(0.0..params.size),
                rng.random_range(0.0..params.size),
            ),
            needs: Needs {
                hunger: rng.random_range(0.0..0.3),
                energy: rng.random_range(0.7..=1.0),
                social: rng.random_range(0.5..=1.0),
            },
            stats: Stats {
                health: 100.0,
                money: STARTING_MONEY,
                speed: 2.0,
            },
            skills: Skills::default(),
            personality: roll_personality(&mut rng, archetype),
            current_action: None,
            progress: ActionProgress::default(),
            inventory: Vec::new(),
            hands: None,
            owned_structures: Vec::new(),
            memory: Vec::new(),
        };
        registry.create_agent(agent)?;
    }

    info!(
        size = params.size,
        agents = params.agent_count,
        resources = resource_count,
        seeded = params.seed.is_some(),
        "world generated"
    );

    Ok(registry)
}

//! World state for the Steading simulation: the entity registry with its
//! spatial index, the per-tick changeset builder, construction contracts,
//! and world generation.
//!
//! # Modules
//!
//! - [`registry`] — Exclusive owner of agents/resources/structures
//! - [`spatial`] — Cell-grid broad-phase index over positions
//! - [`changeset`] — Full/limited casts and snapshots for observers
//! - [`contract`] — Structure templates and the contract book
//! - [`generate`] — Seeding a fresh world
//! - [`error`] — Typed errors for all of the above

pub mod changeset;
pub mod contract;
pub mod error;
pub mod generate;
pub mod registry;
pub mod spatial;

pub use changeset::{ChangeSet, FullChange, LimitedChange, WorldSnapshot, build_changeset, snapshot};
pub use contract::{ContractBook, StructureTemplate, template};
pub use error::WorldError;
pub use generate::{GenerateParams, generate, seed_resource};
pub use registry::{EntityEvent, EntityRegistry};
pub use spatial::{DEFAULT_CELL_SIZE, SpatialGrid};

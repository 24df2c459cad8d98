//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Every record in the simulation has a strongly-typed ID to prevent
//! accidental mixing of identifiers at compile time. All IDs use UUID v7
//! (time-ordered) so creation order is recoverable from the ID alone.
//!
//! The entity registry additionally keys a combined index by the raw
//! [`Uuid`]; [`EntityRef`] pairs that raw value with an [`EntityKind`] tag
//! for callers that need to know which typed collection a hit lives in.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::EntityKind;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for an agent (NPC).
    AgentId
}

define_id! {
    /// Unique identifier for a harvestable resource in the world.
    ResourceId
}

define_id! {
    /// Unique identifier for a structure (building).
    StructureId
}

define_id! {
    /// Unique identifier for a construction contract.
    ContractId
}

define_id! {
    /// Unique identifier for a goal in an agent's goal store.
    GoalId
}

/// A kind-tagged reference to any entity in the registry.
///
/// The registry stores agents, resources and structures in three typed
/// collections; this pairs the raw [`Uuid`] with the collection tag so a
/// single value can name any of them (spatial query results, memory
/// items, changeset entries).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    /// Which typed collection the entity lives in.
    pub kind: EntityKind,
    /// The entity's raw identifier.
    pub id: Uuid,
}

impl EntityRef {
    /// Reference an agent.
    pub const fn agent(id: AgentId) -> Self {
        Self {
            kind: EntityKind::Agent,
            id: id.0,
        }
    }

    /// Reference a resource.
    pub const fn resource(id: ResourceId) -> Self {
        Self {
            kind: EntityKind::Resource,
            id: id.0,
        }
    }

    /// Reference a structure.
    pub const fn structure(id: StructureId) -> Self {
        Self {
            kind: EntityKind::Structure,
            id: id.0,
        }
    }
}

impl core::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}:{}", self.kind, self.id)
    }
}

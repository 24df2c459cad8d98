//! Construction templates and the contract book.
//!
//! A [`StructureTemplate`] is the static bill of materials and footprint
//! for each buildable [`StructureKind`]. The [`ContractBook`] owns every
//! construction contract; the action engine drives the lifecycle
//! transitions (draft -> signed -> prepaid -> completed -> paid) and
//! validates actor roles, while the book only stores and looks up.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use steading_types::{
    AgentId, Contract, ContractId, ContractStatus, ItemKind, Position, StructureKind,
};

use crate::error::WorldError;

/// Static build description for a structure kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureTemplate {
    /// The kind this template builds.
    pub kind: StructureKind,
    /// Materials the provider must hold and consume.
    pub materials: BTreeMap<ItemKind, u32>,
    /// Occupied footprint in tiles (width, height).
    pub footprint: (u32, u32),
    /// Whether the finished structure blocks movement.
    pub blocks_movement: bool,
}

/// Return the canonical template for a structure kind.
pub fn template(kind: StructureKind) -> StructureTemplate {
    match kind {
        StructureKind::Home => StructureTemplate {
            kind,
            materials: BTreeMap::from([(ItemKind::Wood, 20), (ItemKind::Stone, 10)]),
            footprint: (3, 3),
            blocks_movement: true,
        },
        StructureKind::Market => StructureTemplate {
            kind,
            materials: BTreeMap::from([(ItemKind::Wood, 25), (ItemKind::Stone, 15)]),
            footprint: (4, 3),
            blocks_movement: true,
        },
        StructureKind::Workshop => StructureTemplate {
            kind,
            materials: BTreeMap::from([(ItemKind::Wood, 12), (ItemKind::Stone, 8)]),
            footprint: (3, 2),
            blocks_movement: true,
        },
        StructureKind::Storehouse => StructureTemplate {
            kind,
            materials: BTreeMap::from([(ItemKind::Wood, 15), (ItemKind::Stone, 5)]),
            footprint: (3, 3),
            blocks_movement: true,
        },
        StructureKind::StorageBarrel => StructureTemplate {
            kind,
            materials: BTreeMap::from([(ItemKind::Plank, 4)]),
            footprint: (1, 1),
            blocks_movement: false,
        },
    }
}

/// Owner of all construction contracts.
#[derive(Debug, Clone, Default)]
pub struct ContractBook {
    /// All contracts by id.
    contracts: BTreeMap<ContractId, Contract>,
}

impl ContractBook {
    /// Create an empty book.
    pub const fn new() -> Self {
        Self {
            contracts: BTreeMap::new(),
        }
    }

    /// Draft a new contract. Materials come from the structure template;
    /// the prepayment must not exceed the cost.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidParameter`] if `prepayment > cost`
    /// or either amount is negative.
    pub fn draft(
        &mut self,
        customer: AgentId,
        structure_kind: StructureKind,
        site: Position,
        cost: Decimal,
        prepayment: Decimal,
        tick: u64,
    ) -> Result<ContractId, WorldError> {
        if cost < Decimal::ZERO || prepayment < Decimal::ZERO {
            return Err(WorldError::InvalidParameter {
                reason: String::from("contract amounts must be non-negative"),
            });
        }
        if prepayment > cost {
            return Err(WorldError::InvalidParameter {
                reason: format!("prepayment {prepayment} exceeds cost {cost}"),
            });
        }
        let id = ContractId::new();
        let contract = Contract {
            id,
            customer,
            provider: None,
            structure_kind,
            site,
            cost,
            prepayment,
            materials: template(structure_kind).materials,
            status: ContractStatus::Draft,
            created_at: tick,
        };
        self.contracts.insert(id, contract);
        Ok(id)
    }

    /// Get a contract by id.
    pub fn get(&self, id: ContractId) -> Option<&Contract> {
        self.contracts.get(&id)
    }

    /// Get a mutable contract by id.
    pub fn get_mut(&mut self, id: ContractId) -> Option<&mut Contract> {
        self.contracts.get_mut(&id)
    }

    /// Iterate all contracts.
    pub fn contracts(&self) -> impl Iterator<Item = &Contract> {
        self.contracts.values()
    }

    /// Drafts with no provider yet, oldest first.
    pub fn open_drafts(&self) -> Vec<&Contract> {
        self.contracts
            .values()
            .filter(|c| c.status == ContractStatus::Draft)
            .collect()
    }

    /// Number of contracts in the book.
    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    /// Whether the book is empty.
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

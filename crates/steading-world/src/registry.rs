//! The entity registry: single owner of all agents, resources, and
//! structures, with a spatial index kept consistent across mutations.
//!
//! Three typed collections plus a combined `uuid -> kind` index. All
//! mutation goes through `create_*`, `update_*`, and [`remove`]; the
//! update paths re-index the spatial grid when a position changes and
//! record an [`EntityEvent`] carrying the top-level field diff. The
//! changeset builder drains those events once per tick — "subscribers"
//! in this design are consumers of the drained log, never callbacks
//! into the tick loop.
//!
//! [`remove`]: EntityRegistry::remove

use std::collections::BTreeMap;

use serde_json::Value;
use uuid::Uuid;

use steading_types::{
    Agent, AgentId, EntityKind, EntityRef, Position, Resource, ResourceId, SightedEntity,
    Structure, StructureId,
};

use crate::error::WorldError;
use crate::spatial::SpatialGrid;

/// A recorded registry mutation, drained per tick by the changeset
/// builder.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityEvent {
    /// An entity was created.
    Created {
        /// The created entity.
        entity: EntityRef,
        /// Its position at creation.
        position: Position,
        /// Full serialized record at creation.
        snapshot: Value,
    },
    /// An entity was mutated.
    Updated {
        /// The mutated entity.
        entity: EntityRef,
        /// Top-level fields that changed, with their new values.
        fields: BTreeMap<String, Value>,
        /// The new position, if the mutation moved the entity.
        moved: Option<Position>,
    },
    /// An entity was removed.
    Removed {
        /// The removed entity.
        entity: EntityRef,
    },
}

/// Exclusive owner of all entity records plus the spatial index.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    /// All agents by id.
    agents: BTreeMap<AgentId, Agent>,
    /// All resources by id.
    resources: BTreeMap<ResourceId, Resource>,
    /// All structures by id.
    structures: BTreeMap<StructureId, Structure>,
    /// Combined raw-id -> collection tag index.
    kinds: BTreeMap<Uuid, EntityKind>,
    /// Spatial back-reference index (id + cell only).
    grid: SpatialGrid,
    /// Mutation log awaiting the per-tick drain.
    events: Vec<EntityEvent>,
}

impl EntityRegistry {
    /// Create an empty registry with the given spatial cell size.
    pub fn new(cell_size: f64) -> Self {
        Self {
            agents: BTreeMap::new(),
            resources: BTreeMap::new(),
            structures: BTreeMap::new(),
            kinds: BTreeMap::new(),
            grid: SpatialGrid::new(cell_size),
            events: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Creation
    // -----------------------------------------------------------------------

    /// Add an agent to the registry and the spatial index.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateEntity`] if the id is already
    /// registered.
    pub fn create_agent(&mut self, agent: Agent) -> Result<AgentId, WorldError> {
        let id = agent.id;
        let raw = id.into_inner();
        if self.kinds.contains_key(&raw) {
            return Err(WorldError::DuplicateEntity(raw));
        }
        let snapshot = serde_json::to_value(&agent).unwrap_or(Value::Null);
        self.grid.insert(raw, agent.position);
        self.events.push(EntityEvent::Created {
            entity: EntityRef::agent(id),
            position: agent.position,
            snapshot,
        });
        self.kinds.insert(raw, EntityKind::Agent);
        self.agents.insert(id, agent);
        Ok(id)
    }

    /// Add a resource to the registry and the spatial index.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateEntity`] if the id is already
    /// registered.
    pub fn create_resource(&mut self, resource: Resource) -> Result<ResourceId, WorldError> {
        let id = resource.id;
        let raw = id.into_inner();
        if self.kinds.contains_key(&raw) {
            return Err(WorldError::DuplicateEntity(raw));
        }
        let snapshot = serde_json::to_value(&resource).unwrap_or(Value::Null);
        self.grid.insert(raw, resource.position);
        self.events.push(EntityEvent::Created {
            entity: EntityRef::resource(id),
            position: resource.position,
            snapshot,
        });
        self.kinds.insert(raw, EntityKind::Resource);
        self.resources.insert(id, resource);
        Ok(id)
    }

    /// Add a structure to the registry and the spatial index.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateEntity`] if the id is already
    /// registered.
    pub fn create_structure(&mut self, structure: Structure) -> Result<StructureId, WorldError> {
        let id = structure.id;
        let raw = id.into_inner();
        if self.kinds.contains_key(&raw) {
            return Err(WorldError::DuplicateEntity(raw));
        }
        let snapshot = serde_json::to_value(&structure).unwrap_or(Value::Null);
        self.grid.insert(raw, structure.position);
        self.events.push(EntityEvent::Created {
            entity: EntityRef::structure(id),
            position: structure.position,
            snapshot,
        });
        self.kinds.insert(raw, EntityKind::Structure);
        self.structures.insert(id, structure);
        Ok(id)
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Get an agent by id.
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    /// Get a resource by id.
    pub fn resource(&self, id: ResourceId) -> Option<&Resource> {
        self.resources.get(&id)
    }

    /// Get a structure by id.
    pub fn structure(&self, id: StructureId) -> Option<&Structure> {
        self.structures.get(&id)
    }

    /// The collection tag for a raw id.
    pub fn kind_of(&self, id: Uuid) -> Option<EntityKind> {
        self.kinds.get(&id).copied()
    }

    /// The authoritative position of any entity by raw id.
    pub fn position_of(&self, id: Uuid) -> Option<Position> {
        match self.kinds.get(&id)? {
            EntityKind::Agent => self.agents.get(&AgentId::from(id)).map(|a| a.position),
            EntityKind::Resource => self.resources.get(&ResourceId::from(id)).map(|r| r.position),
            EntityKind::Structure => {
                self.structures.get(&StructureId::from(id)).map(|s| s.position)
            }
        }
    }

    /// All agent ids in ascending order (the orchestrator's iteration
    /// order).
    pub fn agent_ids(&self) -> Vec<AgentId> {
        self.agents.keys().copied().collect()
    }

    /// Iterate all agents.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    /// Iterate all resources.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    /// Iterate all structures.
    pub fn structures(&self) -> impl Iterator<Item = &Structure> {
        self.structures.values()
    }

    /// Number of live agents.
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Number of live entities of all kinds.
    pub fn entity_count(&self) -> usize {
        self.kinds.len()
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Mutate an agent in place.
    ///
    /// After the closure runs, the spatial index is re-pointed if the
    /// position changed and an [`EntityEvent::Updated`] carrying the
    /// top-level field diff is recorded.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::EntityNotFound`] if no such agent exists.
    pub fn update_agent<F>(&mut self, id: AgentId, f: F) -> Result<(), WorldError>
    where
        F: FnOnce(&mut Agent),
    {
        let (before, old_pos, after, new_pos) = {
            let agent = self
                .agents
                .get_mut(&id)
                .ok_or_else(|| WorldError::EntityNotFound(id.into_inner()))?;
            let before = serde_json::to_value(&*agent).unwrap_or(Value::Null);
            let old_pos = agent.position;
            f(agent);
            let after = serde_json::to_value(&*agent).unwrap_or(Value::Null);
            (before, old_pos, after, agent.position)
        };
        self.finish_update(EntityRef::agent(id), &before, &after, old_pos, new_pos);
        Ok(())
    }

    /// Mutate a resource in place. See [`update_agent`](Self::update_agent).
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::EntityNotFound`] if no such resource exists.
    pub fn update_resource<F>(&mut self, id: ResourceId, f: F) -> Result<(), WorldError>
    where
        F: FnOnce(&mut Resource),
    {
        let (before, old_pos, after, new_pos) = {
            let resource = self
                .resources
                .get_mut(&id)
                .ok_or_else(|| WorldError::EntityNotFound(id.into_inner()))?;
            let before = serde_json::to_value(&*resource).unwrap_or(Value::Null);
            let old_pos = resource.position;
            f(resource);
            let after = serde_json::to_value(&*resource).unwrap_or(Value::Null);
            (before, old_pos, after, resource.position)
        };
        self.finish_update(EntityRef::resource(id), &before, &after, old_pos, new_pos);
        Ok(())
    }

    /// Mutate a structure in place. See [`update_agent`](Self::update_agent).
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::EntityNotFound`] if no such structure exists.
    pub fn update_structure<F>(&mut self, id: StructureId, f: F) -> Result<(), WorldError>
    where
        F: FnOnce(&mut Structure),
    {
        let (before, old_pos, after, new_pos) = {
            let structure = self
                .structures
                .get_mut(&id)
                .ok_or_else(|| WorldError::EntityNotFound(id.into_inner()))?;
            let before = serde_json::to_value(&*structure).unwrap_or(Value::Null);
            let old_pos = structure.position;
            f(structure);
            let after = serde_json::to_value(&*structure).unwrap_or(Value::Null);
            (before, old_pos, after, structure.position)
        };
        self.finish_update(EntityRef::structure(id), &before, &after, old_pos, new_pos);
        Ok(())
    }

    /// Shared tail of every update: re-index on movement, record the
    /// diff event.
    fn finish_update(
        &mut self,
        entity: EntityRef,
        before: &Value,
        after: &Value,
        old_pos: Position,
        new_pos: Position,
    ) {
        let moved = if old_pos.distance_squared(&new_pos) > f64::EPSILON {
            self.grid.relocate(entity.id, new_pos);
            Some(new_pos)
        } else {
            None
        };
        let fields = diff_fields(before, after);
        if !fields.is_empty() || moved.is_some() {
            self.events.push(EntityEvent::Updated {
                entity,
                fields,
                moved,
            });
        }
    }

    /// Remove an entity of any kind from the registry and index.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::EntityNotFound`] if no such entity exists.
    pub fn remove(&mut self, id: Uuid) -> Result<EntityKind, WorldError> {
        let kind = self
            .kinds
            .remove(&id)
            .ok_or(WorldError::EntityNotFound(id))?;
        let entity = EntityRef { kind, id };
        match kind {
            EntityKind::Agent => {
                self.agents.remove(&AgentId::from(id));
            }
            EntityKind::Resource => {
                self.resources.remove(&ResourceId::from(id));
            }
            EntityKind::Structure => {
                self.structures.remove(&StructureId::from(id));
            }
        }
        self.grid.remove(id);
        self.events.push(EntityEvent::Removed { entity });
        Ok(kind)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Broad-phase candidates near a position (cell-bucket over-report
    /// included). Exact callers should use
    /// [`entities_in_range`](Self::entities_in_range).
    pub fn query(&self, center: &Position, radius: f64) -> Vec<Uuid> {
        self.grid.query(center, radius)
    }

    /// Entities within `radius` of `center`, exact (squared-distance
    /// filtered on top of the broad phase), in ascending id order.
    pub fn entities_in_range(&self, center: &Position, radius: f64) -> Vec<SightedEntity> {
        let mut candidates = self.grid.query(center, radius);
        candidates.sort_unstable();
        candidates
            .into_iter()
            .filter_map(|raw| {
                let kind = self.kind_of(raw)?;
                let (position, subtype) = match kind {
                    EntityKind::Agent => {
                        let agent = self.agents.get(&AgentId::from(raw))?;
                        (agent.position, agent.name.clone())
                    }
                    EntityKind::Resource => {
                        let resource = self.resources.get(&ResourceId::from(raw))?;
                        (resource.position, format!("{:?}", resource.kind))
                    }
                    EntityKind::Structure => {
                        let structure = self.structures.get(&StructureId::from(raw))?;
                        (structure.position, format!("{:?}", structure.kind))
                    }
                };
                if center.within(&position, radius) {
                    Some(SightedEntity {
                        entity: EntityRef { kind, id: raw },
                        subtype,
                        position,
                    })
                } else {
                    None
                }
            })
            .collect()
    }

    /// Drain the mutation log accumulated since the last drain.
    pub fn drain_events(&mut self) -> Vec<EntityEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Top-level field diff between two serialized records.
///
/// Keys present in `after` with a different value than in `before` map
/// to their new value; keys that disappeared map to `Null`. Non-object
/// inputs produce an empty diff.
fn diff_fields(before: &Value, after: &Value) -> BTreeMap<String, Value> {
    let mut out = BTreeMap::new();
    let (Value::Object(b), Value::Object(a)) = (before, after) else {
        return out;
    };
    for (key, new_value) in a {
        if b.get(key) != Some(new_value) {
            out.insert(key.clone(), new_value.clone());
        }
    }
    for key in b.keys() {
        if !a.contains_key(key) {
            out.insert(key.clone(), Value::Null);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use steading_types::{
        ActionProgress, ItemStack, Needs, Personality, ResourceKind, Skills, Stats, StructureKind,
    };

    use super::*;

    fn make_agent(x: f64, y: f64) -> Agent {
        Agent {
            id: AgentId::new(),
            name: String::from("Edda"),
            position: Position::new(x, y),
            needs: Needs::default(),
            stats: Stats::default(),
            skills: Skills::default(),
            personality: Personality::default(),
            current_action: None,
            progress: ActionProgress::default(),
            inventory: Vec::new(),
            hands: None,
            owned_structures: Vec::new(),
            memory: Vec::new(),
        }
    }

    fn make_resource(x: f64, y: f64) -> Resource {
        Resource {
            id: ResourceId::new(),
            position: Position::new(x, y),
            kind: ResourceKind::BerryBush,
            remaining: 6,
            harvested: false,
            value: Decimal::ONE,
            edible: true,
            blocks_movement: false,
            footprint: (1, 1),
            work: None,
        }
    }

    fn make_structure(x: f64, y: f64) -> Structure {
        Structure {
            id: StructureId::new(),
            position: Position::new(x, y),
            kind: StructureKind::Market,
            inventory: Vec::new(),
            treasury: Decimal::ZERO,
            owner: None,
            blocks_movement: true,
            footprint: (2, 2),
            work: None,
        }
    }

    #[test]
    fn create_indexes_and_notifies() {
        let mut registry = EntityRegistry::new(20.0);
        let agent = make_agent(5.0, 5.0);
        let id = agent.id;
        assert!(registry.create_agent(agent).is_ok());

        assert_eq!(registry.kind_of(id.into_inner()), Some(EntityKind::Agent));
        let hits = registry.entities_in_range(&Position::new(5.0, 5.0), 1.0);
        assert_eq!(hits.len(), 1);

        let events = registry.drain_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events.first(),
            Some(EntityEvent::Created { entity, .. }) if entity.id == id.into_inner()
        ));
    }

    #[test]
    fn duplicate_create_rejected() {
        let mut registry = EntityRegistry::new(20.0);
        let agent = make_agent(0.0, 0.0);
        let dup = agent.clone();
        assert!(registry.create_agent(agent).is_ok());
        assert!(matches!(
            registry.create_agent(dup),
            Err(WorldError::DuplicateEntity(_))
        ));
    }

    #[test]
    fn update_relocates_spatial_index() {
        let mut registry = EntityRegistry::new(20.0);
        let id = registry.create_agent(make_agent(5.0, 5.0)).unwrap_or_default();

        let moved = registry.update_agent(id, |a| {
            a.position = Position::new(85.0, 5.0);
        });
        assert!(moved.is_ok());

        assert!(registry.entities_in_range(&Position::new(5.0, 5.0), 2.0).is_empty());
        assert_eq!(
            registry.entities_in_range(&Position::new(85.0, 5.0), 2.0).len(),
            1
        );
        // Consistency invariant: stored position and index agree.
        let stored = registry.position_of(id.into_inner());
        assert!(stored.is_some_and(|p| (p.x - 85.0).abs() < f64::EPSILON));
    }

    #[test]
    fn update_emits_field_diff() {
        let mut registry = EntityRegistry::new(20.0);
        let id = registry.create_agent(make_agent(0.0, 0.0)).unwrap_or_default();
        let _ = registry.drain_events();

        let updated = registry.update_agent(id, |a| {
            a.stats.money = Decimal::new(100, 0);
            a.inventory.push(ItemStack::of(steading_types::ItemKind::Wood, 2));
        });
        assert!(updated.is_ok());

        let events = registry.drain_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(events.first(), Some(EntityEvent::Updated { .. })));
        if let Some(EntityEvent::Updated { fields, moved, .. }) = events.first() {
            assert!(moved.is_none());
            assert!(fields.contains_key("stats"));
            assert!(fields.contains_key("inventory"));
            assert!(!fields.contains_key("needs"));
        }
    }

    #[test]
    fn noop_update_emits_nothing() {
        let mut registry = EntityRegistry::new(20.0);
        let id = registry.create_agent(make_agent(0.0, 0.0)).unwrap_or_default();
        let _ = registry.drain_events();

        let touched = registry.update_agent(id, |_| {});
        assert!(touched.is_ok());
        assert!(registry.drain_events().is_empty());
    }

    #[test]
    fn remove_clears_everything() {
        let mut registry = EntityRegistry::new(20.0);
        let resource = make_resource(10.0, 10.0);
        let id = registry.create_resource(resource).unwrap_or_default();
        let _ = registry.drain_events();

        let removed = registry.remove(id.into_inner());
        assert_eq!(removed.ok(), Some(EntityKind::Resource));
        assert!(registry.resource(id).is_none());
        assert!(registry.kind_of(id.into_inner()).is_none());
        assert!(registry.entities_in_range(&Position::new(10.0, 10.0), 1.0).is_empty());

        let events = registry.drain_events();
        assert!(matches!(events.first(), Some(EntityEvent::Removed { .. })));
    }

    #[test]
    fn remove_missing_entity_errors() {
        let mut registry = EntityRegistry::new(20.0);
        assert!(matches!(
            registry.remove(Uuid::now_v7()),
            Err(WorldError::EntityNotFound(_))
        ));
    }

    #[test]
    fn entities_in_range_is_exact() {
        let mut registry = EntityRegistry::new(20.0);
        // Same cell, but outside a 3-unit radius.
        let _ = registry.create_resource(make_resource(0.0, 0.0));
        let _ = registry.create_resource(make_resource(10.0, 0.0));

        let broad = registry.query(&Position::new(0.0, 0.0), 3.0);
        assert_eq!(broad.len(), 2, "broad phase over-reports");

        let exact = registry.entities_in_range(&Position::new(0.0, 0.0), 3.0);
        assert_eq!(exact.len(), 1, "exact phase filters");
    }

    #[test]
    fn sighted_entities_carry_subtypes() {
        let mut registry = EntityRegistry::new(20.0);
        let _ = registry.create_resource(make_resource(1.0, 0.0));
        let _ = registry.create_structure(make_structure(0.0, 1.0));
        let _ = registry.create_agent(make_agent(1.0, 1.0));

        let hits = registry.entities_in_range(&Position::new(0.0, 0.0), 5.0);
        assert_eq!(hits.len(), 3);
        let subtypes: Vec<&str> = hits.iter().map(|s| s.subtype.as_str()).collect();
        assert!(subtypes.contains(&"BerryBush"));
        assert!(subtypes.contains(&"Market"));
        assert!(subtypes.contains(&"Edda"));
    }
}

//! Cell-grid spatial index over entity positions.
//!
//! The plane is partitioned into square cells of `cell_size` world units
//! (default 20.0). Each cell holds the raw ids of the entities inside it.
//!
//! [`SpatialGrid::query`] is a **broad phase**: it returns every entity in
//! every cell overlapping the query circle's bounding box, so it
//! over-reports near cell boundaries. Callers needing exact results must
//! apply a squared-distance filter afterward — the registry's
//! `entities_in_range` does both phases.
//!
//! The grid holds only id + position back-references. It is never the
//! source of truth for entity fields; the registry keeps cell membership
//! consistent with stored positions across every mutation.

use std::collections::BTreeMap;

use uuid::Uuid;

use steading_types::Position;

/// Default cell edge length in world units.
pub const DEFAULT_CELL_SIZE: f64 = 20.0;

/// A fixed-cell spatial hash over the world plane.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    /// Cell edge length in world units.
    cell_size: f64,
    /// Cell coordinates -> ids of entities inside the cell.
    cells: BTreeMap<(i64, i64), Vec<Uuid>>,
    /// Id -> last indexed position (for relocation and removal).
    positions: BTreeMap<Uuid, Position>,
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE)
    }
}

impl SpatialGrid {
    /// Create a grid with the given cell size.
    ///
    /// Non-positive or non-finite sizes fall back to
    /// [`DEFAULT_CELL_SIZE`].
    pub fn new(cell_size: f64) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            DEFAULT_CELL_SIZE
        };
        Self {
            cell_size,
            cells: BTreeMap::new(),
            positions: BTreeMap::new(),
        }
    }

    /// The configured cell size.
    pub const fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Number of indexed entities.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the grid is empty.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// The last indexed position of an entity, if present.
    pub fn position_of(&self, id: Uuid) -> Option<Position> {
        self.positions.get(&id).copied()
    }

    /// Cell coordinate along one axis.
    //
    // World coordinates are bounded by the generated map size, far inside
    // i64 range after flooring, so the truncating cast is safe.
    #[allow(clippy::cast_possible_truncation)]
    fn coord(&self, v: f64) -> i64 {
        (v / self.cell_size).floor() as i64
    }

    /// Cell containing a position.
    fn cell_of(&self, position: &Position) -> (i64, i64) {
        (self.coord(position.x), self.coord(position.y))
    }

    /// Index an entity at a position. Re-indexing an already-present id
    /// relocates it.
    pub fn insert(&mut self, id: Uuid, position: Position) {
        if self.positions.contains_key(&id) {
            self.relocate(id, position);
            return;
        }
        let cell = self.cell_of(&position);
        self.cells.entry(cell).or_default().push(id);
        self.positions.insert(id, position);
    }

    /// Move an entity to a new position, updating cell membership only
    /// when the cell actually changes.
    pub fn relocate(&mut self, id: Uuid, position: Position) {
        let Some(old) = self.positions.get(&id).copied() else {
            self.insert(id, position);
            return;
        };
        let old_cell = self.cell_of(&old);
        let new_cell = self.cell_of(&position);
        if old_cell != new_cell {
            if let Some(bucket) = self.cells.get_mut(&old_cell) {
                bucket.retain(|entry| *entry != id);
                if bucket.is_empty() {
                    self.cells.remove(&old_cell);
                }
            }
            self.cells.entry(new_cell).or_default().push(id);
        }
        self.positions.insert(id, position);
    }

    /// Remove an entity from the index.
    pub fn remove(&mut self, id: Uuid) {
        let Some(position) = self.positions.remove(&id) else {
            return;
        };
        let cell = self.cell_of(&position);
        if let Some(bucket) = self.cells.get_mut(&cell) {
            bucket.retain(|entry| *entry != id);
            if bucket.is_empty() {
                self.cells.remove(&cell);
            }
        }
    }

    /// Broad-phase range query: ids of all entities in cells overlapping
    /// the circle's bounding box.
    ///
    /// Over-reports near cell boundaries by design; callers needing exact
    /// matches must filter by squared distance afterward.
    pub fn query(&self, position: &Position, radius: f64) -> Vec<Uuid> {
        if !radius.is_finite() || radius < 0.0 {
            return Vec::new();
        }
        let min_x = self.coord(position.x - radius);
        let max_x = self.coord(position.x + radius);
        let min_y = self.coord(position.y - radius);
        let max_y = self.coord(position.y + radius);

        let mut out = Vec::new();
        for cx in min_x..=max_x {
            for cy in min_y..=max_y {
                if let Some(bucket) = self.cells.get(&(cx, cy)) {
                    out.extend(bucket.iter().copied());
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn grid() -> SpatialGrid {
        SpatialGrid::new(20.0)
    }

    #[test]
    fn insert_and_query_same_cell() {
        let mut index = grid();
        let id = Uuid::now_v7();
        index.insert(id, Position::new(5.0, 5.0));

        let hits = index.query(&Position::new(6.0, 6.0), 3.0);
        assert_eq!(hits, vec![id]);
    }

    #[test]
    fn query_over_reports_near_boundary() {
        let mut index = grid();
        let id = Uuid::now_v7();
        // Just across a cell boundary from the query point, well outside
        // the radius -- the broad phase still returns it.
        index.insert(id, Position::new(39.0, 0.0));

        let hits = index.query(&Position::new(21.0, 0.0), 2.0);
        assert_eq!(hits, vec![id]);
        // Exact filtering is the caller's job.
        assert!(!Position::new(21.0, 0.0).within(&Position::new(39.0, 0.0), 2.0));
    }

    #[test]
    fn relocate_moves_cell_membership() {
        let mut index = grid();
        let id = Uuid::now_v7();
        index.insert(id, Position::new(5.0, 5.0));
        index.relocate(id, Position::new(105.0, 5.0));

        assert!(index.query(&Position::new(5.0, 5.0), 1.0).is_empty());
        assert_eq!(index.query(&Position::new(105.0, 5.0), 1.0), vec![id]);
        let stored = index.position_of(id);
        assert!(stored.is_some());
        assert!((stored.map_or(0.0, |p| p.x) - 105.0).abs() < f64::EPSILON);
    }

    #[test]
    fn relocate_within_cell_keeps_membership() {
        let mut index = grid();
        let id = Uuid::now_v7();
        index.insert(id, Position::new(5.0, 5.0));
        index.relocate(id, Position::new(6.0, 7.0));
        assert_eq!(index.query(&Position::new(5.0, 5.0), 5.0), vec![id]);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn remove_clears_entity() {
        let mut index = grid();
        let id = Uuid::now_v7();
        index.insert(id, Position::new(5.0, 5.0));
        index.remove(id);
        assert!(index.is_empty());
        assert!(index.query(&Position::new(5.0, 5.0), 5.0).is_empty());
        assert!(index.position_of(id).is_none());
    }

    #[test]
    fn negative_coordinates_index_correctly() {
        let mut index = grid();
        let id = Uuid::now_v7();
        index.insert(id, Position::new(-35.0, -3.0));
        assert_eq!(index.query(&Position::new(-34.0, -2.0), 5.0), vec![id]);
    }

    #[test]
    fn invalid_radius_returns_empty() {
        let mut index = grid();
        index.insert(Uuid::now_v7(), Position::new(0.0, 0.0));
        assert!(index.query(&Position::new(0.0, 0.0), -1.0).is_empty());
        assert!(index.query(&Position::new(0.0, 0.0), f64::NAN).is_empty());
    }

    #[test]
    fn zero_cell_size_falls_back_to_default() {
        let index = SpatialGrid::new(0.0);
        assert!((index.cell_size() - DEFAULT_CELL_SIZE).abs() < f64::EPSILON);
    }

    /// Broad phase + exact filter must agree with a brute-force scan
    /// after arbitrary churn (the spec's consistency property).
    #[test]
    fn random_churn_matches_brute_force() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut index = grid();
        let mut live: Vec<(Uuid, Position)> = Vec::new();

        for round in 0_u32..200 {
            let roll: f64 = rng.random();
            if roll < 0.5 || live.is_empty() {
                // Create
                let id = Uuid::now_v7();
                let pos = Position::new(
                    rng.random_range(-100.0..100.0),
                    rng.random_range(-100.0..100.0),
                );
                index.insert(id, pos);
                live.push((id, pos));
            } else if roll < 0.8 {
                // Move a random entity
                let pick = rng.random_range(0..live.len());
                if let Some(entry) = live.get_mut(pick) {
                    let pos = Position::new(
                        rng.random_range(-100.0..100.0),
                        rng.random_range(-100.0..100.0),
                    );
                    index.relocate(entry.0, pos);
                    entry.1 = pos;
                }
            } else {
                // Remove a random entity
                let pick = rng.random_range(0..live.len());
                let (id, _) = live.swap_remove(pick);
                index.remove(id);
            }

            // Every few rounds, compare a query against brute force.
            if round % 10 == 0 {
                let center = Position::new(
                    rng.random_range(-100.0..100.0),
                    rng.random_range(-100.0..100.0),
                );
                let radius = rng.random_range(1.0..50.0);

                let mut broad: Vec<Uuid> = index
                    .query(&center, radius)
                    .into_iter()
                    .filter(|id| {
                        index
                            .position_of(*id)
                            .is_some_and(|p| center.within(&p, radius))
                    })
                    .collect();
                broad.sort_unstable();

                let mut brute: Vec<Uuid> = live
                    .iter()
                    .filter(|(_, p)| center.within(p, radius))
                    .map(|(id, _)| *id)
                    .collect();
                brute.sort_unstable();

                assert_eq!(broad, brute, "round {round}");
            }
        }
    }
}

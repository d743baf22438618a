//! # Uniform Grid
//!
//! Fixed-size cells keyed by integer coordinates. An entity is recorded in
//! every cell its box touches, so two entities can only overlap if they share
//! at least one cell. The collision pass clears and re-fills the grid every
//! frame.
//!
//! ```rust,ignore
//! let mut grid = SpatialGrid::new(64.0);
//! for entity in entities.iter() {
//!     if let Some(aabb) = entity.aabb() {
//!         grid.insert(entity.id(), aabb);
//!     }
//! }
//! for (a, b) in grid.candidate_pairs() {
//!     // narrow phase
//! }
//! ```

use std::collections::{HashMap, HashSet};

use ashfall_core::EntityId;
use ashfall_shared::constants::DEFAULT_CELL_SIZE;
use ashfall_shared::math::Rect;

/// Integer cell coordinate.
pub type CellCoord = (i32, i32);

/// Spatial hash over fixed-size square cells.
#[derive(Clone, Debug)]
pub struct SpatialGrid {
    cell_size: f32,
    inv_cell_size: f32,
    cells: HashMap<CellCoord, Vec<EntityId>>,
    /// Insertion order; drives deterministic pair output.
    entries: Vec<(EntityId, Rect)>,
    insert_count: usize,
}

impl SpatialGrid {
    /// Creates an empty grid. A non-positive or non-finite `cell_size` falls
    /// back to the default.
    #[must_use]
    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            DEFAULT_CELL_SIZE
        };
        Self {
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            cells: HashMap::new(),
            entries: Vec::new(),
            insert_count: 0,
        }
    }

    /// Edge length of one cell.
    #[inline]
    #[must_use]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline]
    fn cell_of(&self, x: f32, y: f32) -> CellCoord {
        (
            (x * self.inv_cell_size).floor() as i32,
            (y * self.inv_cell_size).floor() as i32,
        )
    }

    /// Inclusive cell range covered by `rect`.
    fn cell_range(&self, rect: &Rect) -> (CellCoord, CellCoord) {
        (
            self.cell_of(rect.min_x(), rect.min_y()),
            self.cell_of(rect.max_x(), rect.max_y()),
        )
    }

    /// Records `id` in every cell its box covers.
    ///
    /// Returns `false` (and stores nothing) for an empty box: zero-area
    /// colliders never collide, so they never need a cell.
    pub fn insert(&mut self, id: EntityId, aabb: Rect) -> bool {
        if aabb.is_empty() {
            return false;
        }

        let ((x0, y0), (x1, y1)) = self.cell_range(&aabb);
        for cy in y0..=y1 {
            for cx in x0..=x1 {
                self.cells.entry((cx, cy)).or_default().push(id);
                self.insert_count += 1;
            }
        }
        self.entries.push((id, aabb));
        true
    }

    /// Ids recorded in any cell `bounds` covers, deduplicated, in first-seen order.
    ///
    /// This is a candidate list: callers still run their own overlap test.
    #[must_use]
    pub fn query(&self, bounds: &Rect) -> Vec<EntityId> {
        let ((x0, y0), (x1, y1)) = self.cell_range(bounds);
        let mut seen = HashSet::new();
        let mut result = Vec::new();

        for cy in y0..=y1 {
            for cx in x0..=x1 {
                let Some(bucket) = self.cells.get(&(cx, cy)) else {
                    continue;
                };
                for &id in bucket {
                    if seen.insert(id) {
                        result.push(id);
                    }
                }
            }
        }
        result
    }

    /// Every unordered pair of distinct ids sharing at least one cell.
    ///
    /// Each pair appears once, as `(smaller, larger)`, in an order fixed by
    /// insertion order. A superset of the truly overlapping pairs.
    #[must_use]
    pub fn candidate_pairs(&self) -> Vec<(EntityId, EntityId)> {
        let mut visited: HashSet<(EntityId, EntityId)> = HashSet::new();
        let mut pairs = Vec::new();

        for (id, aabb) in &self.entries {
            let ((x0, y0), (x1, y1)) = self.cell_range(aabb);
            for cy in y0..=y1 {
                for cx in x0..=x1 {
                    let Some(bucket) = self.cells.get(&(cx, cy)) else {
                        continue;
                    };
                    for &other in bucket {
                        if other == *id {
                            continue;
                        }
                        let pair = if *id < other { (*id, other) } else { (other, *id) };
                        if visited.insert(pair) {
                            pairs.push(pair);
                        }
                    }
                }
            }
        }
        pairs
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.entries.clear();
        self.insert_count = 0;
    }

    /// Number of entities inserted since the last clear.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been inserted since the last clear.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Total (entity, cell) records; greater than [`SpatialGrid::len`] when
    /// boxes straddle cell borders.
    #[must_use]
    pub fn insert_count(&self) -> usize {
        self.insert_count
    }
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE)
    }
}

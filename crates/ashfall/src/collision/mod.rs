//! # Collision System
//!
//! Per frame:
//!
//! 1. every live entity with a position and a non-empty collider goes into
//!    the [`SpatialGrid`];
//! 2. each candidate pair gets the exact AABB test ([`check_collision`]);
//! 3. the collision callback fires for every hit, trigger or not;
//! 4. blocking pairs are pushed apart along the axis of least overlap, and
//!    the motion generation is bumped if any were.
//!
//! Terrain checks are predicates used by movement before it commits a step.
//! Nothing here mutates terrain, and absent terrain never collides.

pub mod geometry;
pub mod resolve;

use std::rc::Rc;

use ashfall_core::{Collider, Entity, EntitySet, System};
use ashfall_shared::math::Rect;
use ashfall_spatial::{MotionGeneration, SpatialGrid};

use crate::config::CollisionConfig;
use crate::terrain::{Terrain, TileType};

pub use geometry::{diagonal_triangle, triangle_intersects_aabb};
pub use resolve::{check_collision, is_blocking_pair, resolve_collision, Axis};

/// Called with both entities of every colliding pair.
pub type CollisionCallback = Box<dyn FnMut(&Entity, &Entity)>;

/// Counters from the most recent collision pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollisionStats {
    /// Entities placed in the grid.
    pub indexed: usize,
    /// Candidate pairs from the broad phase.
    pub pairs_tested: usize,
    /// Pairs that overlap.
    pub collisions: usize,
    /// Blocking pairs that were pushed apart.
    pub resolved: usize,
}

/// Broad phase, narrow phase, resolution and terrain queries.
pub struct CollisionSystem {
    grid: SpatialGrid,
    terrain: Option<Rc<Terrain>>,
    tile_width: f32,
    tile_height: f32,
    callback: Option<CollisionCallback>,
    motion: MotionGeneration,
    last_stats: CollisionStats,
}

impl CollisionSystem {
    /// Creates a system with no terrain and no callback.
    #[must_use]
    pub fn new(config: &CollisionConfig) -> Self {
        Self {
            grid: SpatialGrid::new(config.cell_size),
            terrain: None,
            tile_width: config.tile_width,
            tile_height: config.tile_height,
            callback: None,
            motion: MotionGeneration::new(),
            last_stats: CollisionStats::default(),
        }
    }

    /// Bumps `motion` when separation moves anything, instead of a private
    /// counter.
    #[must_use]
    pub fn with_motion_generation(mut self, motion: MotionGeneration) -> Self {
        self.motion = motion;
        self
    }

    /// Sets or clears the terrain.
    pub fn set_terrain(&mut self, terrain: Option<Rc<Terrain>>) {
        self.terrain = terrain;
    }

    /// Current terrain.
    #[must_use]
    pub fn terrain(&self) -> Option<&Rc<Terrain>> {
        self.terrain.as_ref()
    }

    /// Installs the callback fired for every colliding pair, replacing any
    /// previous one.
    pub fn set_collision_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&Entity, &Entity) + 'static,
    {
        self.callback = Some(Box::new(callback));
    }

    /// Removes the collision callback.
    pub fn clear_collision_callback(&mut self) {
        self.callback = None;
    }

    /// Counters from the last [`System::update`].
    #[must_use]
    pub fn last_stats(&self) -> CollisionStats {
        self.last_stats
    }

    /// The broad-phase grid as left by the last pass.
    #[must_use]
    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    /// Tile index range `[min, max)` covered by `rect` on one axis.
    ///
    /// A box whose edge lies exactly on a tile border does not reach into
    /// the next tile.
    fn tile_span(min: f32, max: f32, tile: f32) -> (i32, i32) {
        ((min / tile).floor() as i32, (max / tile).ceil() as i32)
    }

    /// Does `rect` overlap solid terrain?
    ///
    /// Full walls and tiles off the map block outright; diagonal walls block
    /// where the box touches their solid triangle.
    #[must_use]
    pub fn check_collision_bounds(&self, rect: &Rect) -> bool {
        let Some(terrain) = &self.terrain else {
            return false;
        };
        if rect.is_empty() {
            return false;
        }

        let (tx0, tx1) = Self::tile_span(rect.min_x(), rect.max_x(), self.tile_width);
        let (ty0, ty1) = Self::tile_span(rect.min_y(), rect.max_y(), self.tile_height);

        for ty in ty0..ty1 {
            for tx in tx0..tx1 {
                let kind = terrain.tile(tx, ty);
                match kind {
                    TileType::Wall => return true,
                    TileType::Floor | TileType::Ramp { .. } => {}
                    _ => {
                        let tile = Rect::new(
                            tx as f32 * self.tile_width,
                            ty as f32 * self.tile_height,
                            self.tile_width,
                            self.tile_height,
                        );
                        let hit = diagonal_triangle(kind, &tile)
                            .is_some_and(|triangle| triangle_intersects_aabb(&triangle, rect));
                        if hit {
                            return true;
                        }
                    }
                }
            }
        }
        false
    }

    /// Would `entity` hit terrain if it stood at `(x, y)`?
    ///
    /// Entities without a collider never do.
    #[must_use]
    pub fn would_collide_with_terrain(&self, entity: &Entity, x: f32, y: f32) -> bool {
        entity
            .get::<Collider>()
            .is_some_and(|collider| self.check_collision_bounds(&collider.aabb_at(x, y)))
    }

    /// Would `entity` standing at `(x, y)` be blocked by `other` where it is now?
    ///
    /// Only blocking colliders on a shared layer count. An entity never blocks
    /// itself.
    #[must_use]
    pub fn would_collide_with_entity(&self, entity: &Entity, x: f32, y: f32, other: &Entity) -> bool {
        if entity.id() == other.id() {
            return false;
        }
        let (Some(mine), Some(theirs)) = (entity.get::<Collider>(), other.get::<Collider>()) else {
            return false;
        };
        if !mine.is_blocking() || !theirs.is_blocking() || !mine.shares_layer(theirs) {
            return false;
        }
        other
            .aabb()
            .is_some_and(|their_box| mine.aabb_at(x, y).intersects(&their_box))
    }
}

impl System for CollisionSystem {
    fn name(&self) -> &'static str {
        "collision"
    }

    fn update(&mut self, entities: &mut EntitySet<'_>, _delta_time: f32) {
        self.grid.clear();
        for entity in entities.iter() {
            if let Some(aabb) = entity.aabb() {
                self.grid.insert(entity.id(), aabb);
            }
        }

        let pairs = self.grid.candidate_pairs();
        let mut stats = CollisionStats {
            indexed: self.grid.len(),
            pairs_tested: pairs.len(),
            ..CollisionStats::default()
        };

        for (id_a, id_b) in pairs {
            let (Some(slot_a), Some(slot_b)) = (entities.slot_of(id_a), entities.slot_of(id_b)) else {
                continue;
            };
            let Some((a, b)) = entities.pair_mut(slot_a, slot_b) else {
                continue;
            };
            if !check_collision(a, b) {
                continue;
            }
            stats.collisions += 1;

            if let Some(callback) = self.callback.as_mut() {
                callback(&*a, &*b);
            }

            if is_blocking_pair(a, b) {
                if let Some(axis) = resolve_collision(a, b) {
                    stats.resolved += 1;
                    tracing::trace!(a = %id_a, b = %id_b, ?axis, "separated pair");
                }
            }
        }

        if stats.resolved > 0 {
            self.motion.bump();
        }

        tracing::debug!(
            indexed = stats.indexed,
            pairs = stats.pairs_tested,
            collisions = stats.collisions,
            resolved = stats.resolved,
            "collision pass"
        );
        self.last_stats = stats;
    }
}

//! # Spatial Index System
//!
//! Owns the [`Quadtree`] used for range queries and decides when to rebuild
//! it. A rebuild happens when
//!
//! - there is no tree yet, or
//! - something moved (the [`MotionGeneration`] advanced) or the entity set
//!   changed shape (the world's structure generation advanced), **and** at
//!   least `rebuild_interval` frames passed since the last rebuild.
//!
//! Between rebuilds queries answer from the last tree, so results may lag by
//! up to `rebuild_interval - 1` frames.

use ashfall_core::{EntityId, EntitySet, Position, System};
use ashfall_shared::math::Rect;
use ashfall_spatial::{MotionGeneration, Quadtree};

use crate::config::QuadtreeConfig;

/// Keeps a quadtree of entity rectangles up to date.
pub struct SpatialIndexSystem {
    bounds: Rect,
    config: QuadtreeConfig,
    tree: Option<Quadtree>,
    motion: MotionGeneration,
    built_generation: u64,
    built_structure: u64,
    frames_since_rebuild: u32,
    rebuild_count: u64,
}

impl SpatialIndexSystem {
    /// Index over `bounds`, watching `motion` for changes.
    #[must_use]
    pub fn new(bounds: Rect, config: QuadtreeConfig, motion: MotionGeneration) -> Self {
        Self {
            bounds,
            config,
            tree: None,
            motion,
            built_generation: 0,
            built_structure: 0,
            frames_since_rebuild: 0,
            rebuild_count: 0,
        }
    }

    /// Ids whose rectangle touches `bounds`, as of the last rebuild.
    ///
    /// Empty before the first update.
    #[must_use]
    pub fn query(&self, bounds: &Rect) -> Vec<EntityId> {
        self.tree.as_ref().map(|tree| tree.query(bounds)).unwrap_or_default()
    }

    /// The current tree, if one was built.
    #[must_use]
    pub fn tree(&self) -> Option<&Quadtree> {
        self.tree.as_ref()
    }

    /// Rebuilds so far.
    #[must_use]
    pub fn rebuild_count(&self) -> u64 {
        self.rebuild_count
    }

    /// Forces a rebuild on the next update.
    pub fn invalidate(&mut self) {
        self.tree = None;
    }

    fn needs_rebuild(&self, structure: u64) -> bool {
        if self.tree.is_none() {
            return true;
        }
        let stale = self.motion.is_newer_than(self.built_generation)
            || structure != self.built_structure;
        stale && self.frames_since_rebuild >= self.config.rebuild_interval
    }

    fn rebuild(&mut self, entities: &EntitySet<'_>) {
        let mut tree = Quadtree::new(self.bounds, self.config.capacity).with_max_depth(self.config.max_depth);
        for entity in entities.iter() {
            let rect = match (entity.aabb(), entity.get::<Position>()) {
                (Some(aabb), _) => aabb,
                (None, Some(pos)) => Rect::point(pos.x, pos.y),
                (None, None) => continue,
            };
            tree.insert(entity.id(), rect);
        }

        tracing::debug!(
            entities = tree.len(),
            nodes = tree.node_count(),
            generation = self.motion.current(),
            "quadtree rebuilt"
        );

        self.tree = Some(tree);
        self.built_generation = self.motion.current();
        self.built_structure = entities.structure_generation();
        self.frames_since_rebuild = 0;
        self.rebuild_count += 1;
    }
}

impl System for SpatialIndexSystem {
    fn name(&self) -> &'static str {
        "spatial_index"
    }

    fn update(&mut self, entities: &mut EntitySet<'_>, _delta_time: f32) {
        self.frames_since_rebuild = self.frames_since_rebuild.saturating_add(1);
        if self.needs_rebuild(entities.structure_generation()) {
            self.rebuild(entities);
        }
    }
}

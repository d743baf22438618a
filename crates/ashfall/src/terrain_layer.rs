//! Ramp tiles move colliders between collision layers.
//!
//! An entity whose collider centre sits on a [`TileType::Ramp`] takes the
//! ramp's layer. Leaving the ramp keeps the layer, so an entity that walked
//! up to layer 2 stays there until another ramp says otherwise.

use std::rc::Rc;

use ashfall_core::{Collider, EntitySet, System};

use crate::config::CollisionConfig;
use crate::terrain::{Terrain, TileType};

/// Applies ramp layers after movement and before collision.
pub struct TerrainLayerSystem {
    terrain: Option<Rc<Terrain>>,
    tile_width: f32,
    tile_height: f32,
    changes_last_frame: usize,
}

impl TerrainLayerSystem {
    /// Creates the system with no terrain; it does nothing until some is set.
    #[must_use]
    pub fn new(config: &CollisionConfig) -> Self {
        Self {
            terrain: None,
            tile_width: config.tile_width,
            tile_height: config.tile_height,
            changes_last_frame: 0,
        }
    }

    /// Sets or clears the terrain.
    pub fn set_terrain(&mut self, terrain: Option<Rc<Terrain>>) {
        self.terrain = terrain;
    }

    /// Colliders whose layer changed in the last pass.
    #[must_use]
    pub fn changes_last_frame(&self) -> usize {
        self.changes_last_frame
    }
}

impl System for TerrainLayerSystem {
    fn name(&self) -> &'static str {
        "terrain_layer"
    }

    fn update(&mut self, entities: &mut EntitySet<'_>, _delta_time: f32) {
        self.changes_last_frame = 0;
        let Some(terrain) = &self.terrain else {
            return;
        };

        for entity in entities.iter_mut() {
            let Some(centre) = entity.aabb().map(|aabb| aabb.center()) else {
                continue;
            };
            let tx = (centre.x / self.tile_width).floor() as i32;
            let ty = (centre.y / self.tile_height).floor() as i32;
            let Some(TileType::Ramp { layer }) = terrain.get(tx, ty) else {
                continue;
            };

            let id = entity.id();
            if let Some(collider) = entity.get_mut::<Collider>() {
                if collider.layer != layer {
                    tracing::trace!(entity = %id, from = collider.layer, to = layer, "ramp layer change");
                    collider.layer = layer;
                    self.changes_last_frame += 1;
                }
            }
        }
    }
}

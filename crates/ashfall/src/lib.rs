//! # ASHFALL
//!
//! Simulation core of a real-time 2D action game.
//!
//! ## Frame Pipeline
//!
//! ```text
//! World::update(dt)
//! ├─ flush pending additions / removals
//! ├─ MovementSystem       integrate, slide against terrain + solids,
//! │                       bound, damp, animate; bump motion generation
//! ├─ TerrainLayerSystem   ramp tiles move colliders between layers
//! ├─ CollisionSystem      grid broad-phase → AABB narrow-phase →
//! │                       callback → separate blocking pairs
//! └─ SpatialIndexSystem   rebuild the quadtree when something moved
//! ```
//!
//! [`Simulation`] wires these together in that order. Each system can also
//! be registered on a bare [`World`] by hand.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ashfall::{Simulation, SimulationConfig, FIXED_TIMESTEP};
//!
//! let mut sim = Simulation::new(SimulationConfig::default())?;
//! let player = sim.world_mut().spawn([
//!     Position::new(100.0, 100.0).into(),
//!     Velocity::new(40.0, 0.0).into(),
//!     Collider::solid(16.0, 16.0).into(),
//! ]);
//! sim.step(FIXED_TIMESTEP);
//! let visible = sim.query(&Rect::new(0.0, 0.0, 640.0, 360.0));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod collision;
pub mod config;
pub mod events;
pub mod movement;
pub mod simulation;
pub mod spatial_index;
pub mod terrain;
pub mod terrain_layer;

pub use ashfall_core::{
    Animation, AnimationState, Bounds, Collider, Component, ComponentKind, Cooldown, Dead, Entity,
    EntityId, EntitySet, Facing, Friction, Position, System, Velocity, World,
};
pub use ashfall_shared::math::{Rect, Vec2};
pub use ashfall_shared::FIXED_TIMESTEP;
pub use ashfall_spatial::{MotionGeneration, Quadtree, SpatialGrid};

pub use collision::{check_collision, CollisionStats, CollisionSystem};
pub use config::{
    CollisionConfig, ConfigError, ConfigResult, MovementConfig, QuadtreeConfig, SimulationConfig,
    TimingConfig, WorldConfig,
};
pub use events::{
    CollisionEvent, CollisionEventBus, CollisionEventReceiver, CollisionEventSender, CollisionKind,
};
pub use movement::MovementSystem;
pub use simulation::{FrameStats, FrameStatsAccumulator, Simulation};
pub use spatial_index::SpatialIndexSystem;
pub use terrain::{Terrain, TileType};
pub use terrain_layer::TerrainLayerSystem;

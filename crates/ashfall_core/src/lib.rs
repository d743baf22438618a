//! # ASHFALL Core Engine
//!
//! Entity Component registry for a frame-stepped 2D action game.
//!
//! ## Architecture Rules
//!
//! 1. **Structural mutation is deferred** - creating or removing an entity is
//!    queued and applied at the start of the next [`World::update`]
//! 2. **Systems run in registration order** - strictly sequential, one frame
//!    at a time, no locking
//! 3. **Lookups never panic** - missing entities and components are `None`
//!
//! ## Example
//!
//! ```rust,ignore
//! use ashfall_core::{World, Position, Velocity};
//!
//! let mut world = World::new();
//! let id = world.spawn([Position::new(0.0, 0.0).into(), Velocity::new(5.0, 0.0).into()]);
//! world.update(1.0 / 60.0); // `id` becomes visible to systems here
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod ecs;
pub mod error;

pub use ecs::{
    Animation, AnimationState, Bounds, Collider, Component, ComponentKind, ComponentType,
    Cooldown, Dead, Entity, EntityId, EntitySet, Facing, FnSystem, Friction, Position, System,
    Velocity, World,
};
pub use error::{EcsError, EcsResult};

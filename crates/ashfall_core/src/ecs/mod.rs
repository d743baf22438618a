//! # Entity Component System
//!
//! A small, mutation-safe ECS for a single-threaded game loop.
//!
//! ## Design Philosophy
//!
//! - Entities own their components in a map keyed by [`ComponentKind`]
//! - Components are a closed enum, accessed through the typed
//!   [`ComponentType`] trait instead of runtime reflection
//! - Entity IDs are stable 64-bit values, never reused
//! - Structural changes go through a pending queue flushed once per frame

mod component;
mod entity;
mod system;
mod world;

pub use component::{
    Animation, AnimationState, Bounds, Collider, Component, ComponentKind, ComponentType,
    Cooldown, Dead, Facing, Friction, Position, Velocity,
};
pub use entity::{Entity, EntityId};
pub use system::{FnSystem, System};
pub use world::{EntitySet, World};

//! # Systems
//!
//! A system is a unit of per-frame logic. The world calls every registered
//! system once per [`World::update`](super::World::update), in registration
//! order, after the pending-mutation flush.

use std::cell::RefCell;
use std::rc::Rc;

use super::world::EntitySet;

/// Per-frame logic run by the world.
pub trait System {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Runs one frame over the committed entity set.
    fn update(&mut self, entities: &mut EntitySet<'_>, delta_time: f32);
}

/// Shared systems.
///
/// Lets one system hold a handle to another (movement querying collision,
/// a renderer querying the spatial index) while the world still drives it.
/// Systems never run concurrently, so the borrow is always free.
impl<S: System> System for Rc<RefCell<S>> {
    fn name(&self) -> &'static str {
        self.borrow().name()
    }

    fn update(&mut self, entities: &mut EntitySet<'_>, delta_time: f32) {
        self.borrow_mut().update(entities, delta_time);
    }
}

/// A system backed by a closure.
pub struct FnSystem<F> {
    name: &'static str,
    run: F,
}

impl<F> FnSystem<F>
where
    F: FnMut(&mut EntitySet<'_>, f32),
{
    /// Wraps `run` as a system called `name`.
    pub fn new(name: &'static str, run: F) -> Self {
        Self { name, run }
    }
}

impl<F> System for FnSystem<F>
where
    F: FnMut(&mut EntitySet<'_>, f32),
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn update(&mut self, entities: &mut EntitySet<'_>, delta_time: f32) {
        (self.run)(entities, delta_time);
    }
}

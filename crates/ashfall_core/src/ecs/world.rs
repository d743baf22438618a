//! # ECS World
//!
//! The central container for all entities and the systems that run over them.
//!
//! ## Frame lifecycle
//!
//! ```text
//! World::update(dt)
//! ┌──────────────────────────────────────────────────────────────┐
//! │ 1. FLUSH                                                     │
//! │    ├─ purge entities flagged for removal                     │
//! │    └─ commit entities created since the last flush           │
//! │                                                              │
//! │ 2. SYSTEMS (registration order)                              │
//! │    └─ each gets an EntitySet over the committed entities     │
//! │       - spawn()   → queued, invisible until next flush       │
//! │       - despawn() → filtered immediately, purged next flush  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Flushing is the only structural barrier. In-place component edits made by
//! one system are visible to every system after it in the same frame.

use std::collections::HashMap;

use super::component::{Component, ComponentKind};
use super::entity::{Entity, EntityId};
use super::system::System;
use crate::error::{EcsError, EcsResult};

/// Structural changes waiting for the next flush.
#[derive(Debug)]
struct PendingQueue {
    /// Entities created since the last flush.
    additions: Vec<Entity>,
    /// Committed entities flagged for removal, in request order.
    removals: Vec<EntityId>,
    /// Next id to hand out.
    next_id: u64,
}

impl PendingQueue {
    fn new() -> Self {
        Self {
            additions: Vec::new(),
            removals: Vec::new(),
            next_id: 1,
        }
    }

    fn allocate(&mut self) -> &mut Entity {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        self.additions.push(Entity::new(id));
        let slot = self.additions.len() - 1;
        &mut self.additions[slot]
    }
}

/// Flags `id` for removal, or drops it from the additions queue if it was
/// never committed. Returns `false` for unknown or already-removed ids.
fn request_removal(
    entities: &mut [Entity],
    index: &HashMap<EntityId, usize>,
    pending: &mut PendingQueue,
    id: EntityId,
) -> bool {
    if let Some(&slot) = index.get(&id) {
        let entity = &mut entities[slot];
        if entity.pending_removal {
            return false;
        }
        entity.pending_removal = true;
        pending.removals.push(id);
        return true;
    }

    if let Some(pos) = pending.additions.iter().position(|e| e.id() == id) {
        pending.additions.remove(pos);
        return true;
    }

    false
}

/// The ECS World - container for all game state.
///
/// # Example
///
/// ```rust,ignore
/// let mut world = World::new();
///
/// let id = world.create_entity().id();
/// assert!(world.get_entity(id).is_none()); // not committed yet
/// world.update(0.016);
/// assert!(world.get_entity(id).is_some());
/// ```
pub struct World {
    /// Committed entities, including those flagged for removal.
    entities: Vec<Entity>,
    /// Entity id → slot in `entities`.
    index: HashMap<EntityId, usize>,
    /// Deferred structural changes.
    pending: PendingQueue,
    /// Systems in registration order.
    systems: Vec<Box<dyn System>>,
    /// Number of completed `update` calls.
    frame: u64,
    /// Number of flushes that added or removed something.
    structure_generation: u64,
}

impl World {
    /// Creates an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            index: HashMap::new(),
            pending: PendingQueue::new(),
            systems: Vec::new(),
            frame: 0,
            structure_generation: 0,
        }
    }

    /// Number of completed frames.
    #[inline]
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Advances whenever a flush commits additions or purges removals.
    ///
    /// Caches built from the entity set compare against this instead of the
    /// entity count, which a same-frame add and remove leaves unchanged.
    #[inline]
    #[must_use]
    pub fn structure_generation(&self) -> u64 {
        self.structure_generation
    }

    // ── Entities ─────────────────────────────────────────────────────

    /// Queues a new empty entity and returns it for component setup.
    ///
    /// The entity becomes visible at the next flush.
    pub fn create_entity(&mut self) -> &mut Entity {
        self.pending.allocate()
    }

    /// Queues a new entity with the given components, returning its id.
    pub fn spawn<I>(&mut self, components: I) -> EntityId
    where
        I: IntoIterator<Item = Component>,
    {
        let entity = self.pending.allocate();
        for component in components {
            entity.insert(component);
        }
        entity.id()
    }

    /// Requests removal of an entity.
    ///
    /// A committed entity stops appearing in iteration immediately but stays
    /// addressable through [`World::get_entity`] until the next flush. A
    /// still-pending entity is simply dropped from the queue.
    ///
    /// Returns `false` if the id is unknown or already being removed.
    pub fn remove_entity(&mut self, id: EntityId) -> bool {
        request_removal(&mut self.entities, &self.index, &mut self.pending, id)
    }

    /// Looks up a committed entity (including one pending removal).
    #[must_use]
    pub fn get_entity(&self, id: EntityId) -> Option<&Entity> {
        self.index.get(&id).map(|&slot| &self.entities[slot])
    }

    /// Mutable form of [`World::get_entity`].
    pub fn get_entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.index.get(&id).map(|&slot| &mut self.entities[slot])
    }

    /// Committed entities that are not pending removal.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.iter().filter(|e| !e.pending_removal)
    }

    /// Number of entities [`World::entities`] yields.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len() - self.pending.removals.len()
    }

    /// Entities created but not yet committed.
    #[must_use]
    pub fn pending_additions(&self) -> usize {
        self.pending.additions.len()
    }

    /// Entities flagged for removal but not yet purged.
    #[must_use]
    pub fn pending_removals(&self) -> usize {
        self.pending.removals.len()
    }

    /// Adds or replaces a component on a committed entity.
    ///
    /// # Errors
    ///
    /// [`EcsError::EntityNotFound`] if no committed entity has this id.
    pub fn insert_component(
        &mut self,
        id: EntityId,
        component: impl Into<Component>,
    ) -> EcsResult<Option<Component>> {
        let entity = self.get_entity_mut(id).ok_or(EcsError::EntityNotFound(id))?;
        Ok(entity.insert(component))
    }

    /// Removes a component from a committed entity.
    ///
    /// # Errors
    ///
    /// [`EcsError::EntityNotFound`] if no committed entity has this id.
    pub fn remove_component(
        &mut self,
        id: EntityId,
        kind: ComponentKind,
    ) -> EcsResult<Option<Component>> {
        let entity = self.get_entity_mut(id).ok_or(EcsError::EntityNotFound(id))?;
        Ok(entity.remove(kind))
    }

    // ── Systems ──────────────────────────────────────────────────────

    /// Registers a system. Systems run in registration order.
    pub fn add_system(&mut self, system: impl System + 'static) {
        tracing::debug!(system = system.name(), order = self.systems.len(), "system registered");
        self.systems.push(Box::new(system));
    }

    /// Number of registered systems.
    #[must_use]
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Registered system names, in run order.
    pub fn system_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.systems.iter().map(|s| s.name())
    }

    // ── Frame ────────────────────────────────────────────────────────

    /// Applies pending removals then pending additions.
    ///
    /// Returns `(added, removed)`. Called automatically at the start of
    /// [`World::update`].
    pub fn flush(&mut self) -> (usize, usize) {
        let removed = self.pending.removals.len();
        if removed > 0 {
            self.entities.retain(|e| !e.pending_removal);
            self.pending.removals.clear();
        }

        let added = self.pending.additions.len();
        self.entities.append(&mut self.pending.additions);

        if added > 0 || removed > 0 {
            self.structure_generation += 1;
            self.reindex();
            tracing::debug!(added, removed, total = self.entities.len(), "world flush");
        }

        (added, removed)
    }

    /// Flushes, then runs every system once in registration order.
    pub fn update(&mut self, delta_time: f32) {
        self.flush();

        let Self { entities, index, pending, systems, structure_generation, .. } = self;
        for system in systems.iter_mut() {
            let mut set = EntitySet {
                entities: entities.as_mut_slice(),
                index: &*index,
                pending: &mut *pending,
                structure_generation: *structure_generation,
            };
            system.update(&mut set, delta_time);
        }

        self.frame += 1;
    }

    fn reindex(&mut self) {
        self.index.clear();
        self.index
            .extend(self.entities.iter().enumerate().map(|(slot, e)| (e.id(), slot)));
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// A system's view of the world for one frame.
///
/// Iteration skips entities flagged for removal; id lookups still find them.
/// Structural changes requested here follow the same deferral rules as the
/// world's own methods.
pub struct EntitySet<'w> {
    entities: &'w mut [Entity],
    index: &'w HashMap<EntityId, usize>,
    pending: &'w mut PendingQueue,
    structure_generation: u64,
}

impl<'w> EntitySet<'w> {
    /// The world's [`World::structure_generation`] as of this frame's flush.
    #[must_use]
    pub fn structure_generation(&self) -> u64 {
        self.structure_generation
    }

    /// Number of live (not pending removal) entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.iter().filter(|e| !e.pending_removal).count()
    }

    /// True when no live entity exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live entities.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.iter().filter(|e| !e.pending_removal)
    }

    /// Live entities, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> + '_ {
        self.entities.iter_mut().filter(|e| !e.pending_removal)
    }

    /// Ids of live entities, in slot order.
    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        self.iter().map(Entity::id).collect()
    }

    /// Looks up a committed entity by id (including one pending removal).
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.index.get(&id).map(|&slot| &self.entities[slot])
    }

    /// Mutable form of [`EntitySet::get`].
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.index.get(&id).map(|&slot| &mut self.entities[slot])
    }

    /// Total slots, live or not. Slot indices are stable for the whole frame.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.entities.len()
    }

    /// The live entity in `slot`.
    #[must_use]
    pub fn slot(&self, slot: usize) -> Option<&Entity> {
        self.entities.get(slot).filter(|e| !e.pending_removal)
    }

    /// Mutable form of [`EntitySet::slot`].
    pub fn slot_mut(&mut self, slot: usize) -> Option<&mut Entity> {
        self.entities.get_mut(slot).filter(|e| !e.pending_removal)
    }

    /// Slot of a committed entity.
    #[must_use]
    pub fn slot_of(&self, id: EntityId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Two distinct live entities, mutably.
    pub fn pair_mut(&mut self, a: usize, b: usize) -> Option<(&mut Entity, &mut Entity)> {
        let len = self.entities.len();
        if a == b || a >= len || b >= len {
            return None;
        }

        let (first, second) = if a < b {
            let (left, right) = self.entities.split_at_mut(b);
            (&mut left[a], &mut right[0])
        } else {
            let (left, right) = self.entities.split_at_mut(a);
            (&mut right[0], &mut left[b])
        };

        if first.pending_removal || second.pending_removal {
            return None;
        }
        Some((first, second))
    }

    /// Queues a new entity. It is not visible to any system this frame.
    pub fn spawn(&mut self) -> &mut Entity {
        self.pending.allocate()
    }

    /// Requests removal. Later systems in this frame no longer see the entity.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        request_removal(self.entities, self.index, self.pending, id)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::ecs::component::{Position, Velocity};
    use crate::ecs::system::FnSystem;

    #[test]
    fn test_created_entities_wait_for_flush() {
        let mut world = World::new();
        let id = world.create_entity().id();

        assert!(world.get_entity(id).is_none());
        assert_eq!(world.entities().count(), 0);
        assert_eq!(world.pending_additions(), 1);

        world.update(0.016);

        assert!(world.get_entity(id).is_some());
        assert_eq!(world.entity_count(), 1);
        assert_eq!(world.pending_additions(), 0);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut world = World::new();
        let a = world.create_entity().id();
        let b = world.create_entity().id();
        world.update(0.0);
        world.remove_entity(a);
        world.update(0.0);
        let c = world.create_entity().id();
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
    }

    #[test]
    fn test_removed_entity_filtered_but_addressable() {
        let mut world = World::new();
        let id = world.spawn([Position::new(1.0, 1.0).into()]);
        world.flush();

        assert!(world.remove_entity(id));
        assert!(!world.remove_entity(id));

        assert_eq!(world.entities().count(), 0);
        assert_eq!(world.entity_count(), 0);
        assert!(world.get_entity(id).is_some_and(Entity::is_pending_removal));

        world.update(0.016);
        assert!(world.get_entity(id).is_none());
        assert_eq!(world.pending_removals(), 0);
    }

    #[test]
    fn test_removing_pending_entity_drops_it() {
        let mut world = World::new();
        let id = world.create_entity().id();
        assert!(world.remove_entity(id));
        world.update(0.0);
        assert!(world.get_entity(id).is_none());
        assert!(!world.remove_entity(EntityId::new(999)));
    }

    #[test]
    fn test_systems_run_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut world = World::new();

        for name in ["integrate", "collide", "animate"] {
            let log = Rc::clone(&log);
            world.add_system(FnSystem::new(name, move |_, _| log.borrow_mut().push(name)));
        }

        world.update(0.016);
        world.update(0.016);

        assert_eq!(
            *log.borrow(),
            vec!["integrate", "collide", "animate", "integrate", "collide", "animate"]
        );
        assert_eq!(world.system_names().collect::<Vec<_>>(), vec!["integrate", "collide", "animate"]);
        assert_eq!(world.frame(), 2);
    }

    #[test]
    fn test_entity_spawned_mid_frame_is_invisible_until_next_frame() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut world = World::new();
        world.spawn([Position::default().into()]);

        world.add_system(FnSystem::new("spawner", |set: &mut EntitySet<'_>, _| {
            set.spawn().insert(Velocity::new(1.0, 0.0));
        }));
        let counter = Rc::clone(&seen);
        world.add_system(FnSystem::new("counter", move |set: &mut EntitySet<'_>, _| {
            counter.borrow_mut().push(set.len());
        }));

        world.update(0.016);
        world.update(0.016);

        // frame 1: the spawned entity is queued; frame 2: it is committed
        // and another is queued behind it
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_despawn_mid_frame_hides_from_later_systems() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut world = World::new();
        let doomed = world.spawn([Position::default().into()]);
        world.spawn([Position::default().into()]);

        world.add_system(FnSystem::new("reaper", move |set: &mut EntitySet<'_>, _| {
            set.despawn(doomed);
        }));
        let probe = Rc::clone(&seen);
        world.add_system(FnSystem::new("probe", move |set: &mut EntitySet<'_>, _| {
            probe
                .borrow_mut()
                .push((set.len(), set.get(doomed).is_some()));
        }));

        world.update(0.016);
        assert_eq!(*seen.borrow(), vec![(1, true)]);
        assert!(world.get_entity(doomed).is_some());

        world.update(0.016);
        assert!(world.get_entity(doomed).is_none());
    }

    #[test]
    fn test_in_place_edits_visible_to_later_systems() {
        let mut world = World::new();
        let id = world.spawn([Position::new(0.0, 0.0).into()]);

        world.add_system(FnSystem::new("mover", move |set: &mut EntitySet<'_>, _| {
            if let Some(pos) = set.get_mut(id).and_then(|e| e.get_mut::<Position>()) {
                pos.x += 1.0;
            }
        }));
        let observed = Rc::new(RefCell::new(0.0));
        let sink = Rc::clone(&observed);
        world.add_system(FnSystem::new("reader", move |set: &mut EntitySet<'_>, _| {
            if let Some(pos) = set.get(id).and_then(|e| e.get::<Position>()) {
                *sink.borrow_mut() = pos.x;
            }
        }));

        world.update(0.016);
        assert_eq!(*observed.borrow(), 1.0);
    }

    #[test]
    fn test_world_component_access_by_id() {
        let mut world = World::new();
        let id = world.create_entity().id();
        assert_eq!(
            world.insert_component(id, Position::new(1.0, 1.0)),
            Err(EcsError::EntityNotFound(id))
        );

        world.flush();
        assert_eq!(world.insert_component(id, Position::new(1.0, 1.0)), Ok(None));
        assert!(world
            .remove_component(id, ComponentKind::Position)
            .is_ok_and(|c| c.is_some()));
    }

    #[test]
    fn test_structure_generation_tracks_flushes() {
        let mut world = World::new();
        let a = world.spawn([Position::default().into()]);
        world.update(0.0);
        assert_eq!(world.structure_generation(), 1);

        world.update(0.0);
        assert_eq!(world.structure_generation(), 1);

        // Same count before and after, still a structural change.
        world.remove_entity(a);
        world.spawn([Position::default().into()]);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        world.add_system(FnSystem::new("watch", move |set: &mut EntitySet<'_>, _| {
            sink.borrow_mut().push((set.len(), set.structure_generation()));
        }));
        world.update(0.0);

        assert_eq!(world.structure_generation(), 2);
        assert_eq!(*seen.borrow(), vec![(1, 2)]);
    }

    #[test]
    fn test_pair_mut_rejects_same_and_removed_slots() {
        let mut world = World::new();
        let a = world.spawn([Position::default().into()]);
        let b = world.spawn([Position::default().into()]);
        let c = world.spawn([Position::default().into()]);

        let results = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&results);
        world.add_system(FnSystem::new("pairs", move |set: &mut EntitySet<'_>, _| {
            let (Some(sa), Some(sb), Some(sc)) = (set.slot_of(a), set.slot_of(b), set.slot_of(c))
            else {
                return;
            };
            let mut out = sink.borrow_mut();
            out.push(set.pair_mut(sa, sa).is_none());
            out.push(
                set.pair_mut(sc, sa)
                    .is_some_and(|(first, second)| first.id() == c && second.id() == a),
            );
            set.despawn(b);
            out.push(set.pair_mut(sa, sb).is_none());
        }));

        world.update(0.0);
        assert_eq!(*results.borrow(), vec![true, true, true]);
    }
}

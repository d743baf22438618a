//! # Entity Management
//!
//! An entity is a stable identifier plus the components it owns.

use std::collections::HashMap;
use std::fmt;

use ashfall_shared::math::Rect;

use super::component::{Collider, Component, ComponentKind, ComponentType, Position};

/// Unique identifier for an entity.
///
/// Allocated monotonically by the world and never reused, so a stale id can
/// only ever miss, never alias a newer entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Wraps a raw id.
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw 64-bit value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Null/invalid entity ID.
    pub const NULL: Self = Self(u64::MAX);

    /// Checks if this entity ID is null/invalid.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An entity and the components it exclusively owns.
#[derive(Clone, Debug)]
pub struct Entity {
    id: EntityId,
    components: HashMap<ComponentKind, Component>,
    /// Set by a removal request; cleared only by purging the entity at flush.
    pub(crate) pending_removal: bool,
}

impl Entity {
    /// Creates an entity with no components.
    #[must_use]
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            components: HashMap::new(),
            pending_removal: false,
        }
    }

    /// This entity's id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// True once removal has been requested; the entity is gone at the next flush.
    #[inline]
    #[must_use]
    pub fn is_pending_removal(&self) -> bool {
        self.pending_removal
    }

    /// Checks if this entity has a component of type `T`.
    #[inline]
    #[must_use]
    pub fn has<T: ComponentType>(&self) -> bool {
        self.components.contains_key(&T::KIND)
    }

    /// Checks if this entity has a component of the given kind.
    #[inline]
    #[must_use]
    pub fn has_kind(&self, kind: ComponentKind) -> bool {
        self.components.contains_key(&kind)
    }

    /// Borrows the component of type `T`.
    #[must_use]
    pub fn get<T: ComponentType>(&self) -> Option<&T> {
        self.components.get(&T::KIND).and_then(T::from_ref)
    }

    /// Mutably borrows the component of type `T`.
    pub fn get_mut<T: ComponentType>(&mut self) -> Option<&mut T> {
        self.components.get_mut(&T::KIND).and_then(T::from_mut)
    }

    /// Borrows the raw component stored under `kind`.
    #[must_use]
    pub fn component(&self, kind: ComponentKind) -> Option<&Component> {
        self.components.get(&kind)
    }

    /// Adds or replaces a component, returning the one it replaced.
    pub fn insert(&mut self, component: impl Into<Component>) -> Option<Component> {
        let component = component.into();
        self.components.insert(component.kind(), component)
    }

    /// Builder form of [`Entity::insert`].
    #[must_use]
    pub fn with(mut self, component: impl Into<Component>) -> Self {
        self.insert(component);
        self
    }

    /// Removes the component stored under `kind`.
    pub fn remove(&mut self, kind: ComponentKind) -> Option<Component> {
        self.components.remove(&kind)
    }

    /// Removes and unwraps the component of type `T`.
    pub fn take<T: ComponentType>(&mut self) -> Option<T> {
        self.components.remove(&T::KIND).and_then(T::from_owned)
    }

    /// Kinds currently attached, in no particular order.
    pub fn kinds(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        self.components.keys().copied()
    }

    /// Number of attached components.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// World-space collision box at the entity's current position.
    ///
    /// `None` unless the entity has both a [`Position`] and a [`Collider`].
    #[must_use]
    pub fn aabb(&self) -> Option<Rect> {
        let pos = self.get::<Position>()?;
        let collider = self.get::<Collider>()?;
        Some(collider.aabb_at(pos.x, pos.y))
    }
}

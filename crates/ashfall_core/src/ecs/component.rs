//! # Component System
//!
//! Components are pure data containers with no behavior.
//!
//! Every concrete component is a variant of the closed [`Component`] enum and
//! is identified by a stable [`ComponentKind`]. Typed access goes through
//! [`ComponentType`], so callers never match on the enum by hand:
//!
//! ```rust,ignore
//! if let Some(vel) = entity.get_mut::<Velocity>() {
//!     vel.x = 0.0;
//! }
//! ```

use std::fmt;

use ashfall_shared::math::{Rect, Vec2};
use bytemuck::{Pod, Zeroable};

/// Stable identifier for a component type.
///
/// One entity holds at most one component per kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    /// [`Position`]
    Position,
    /// [`Velocity`]
    Velocity,
    /// [`Collider`]
    Collider,
    /// [`Bounds`]
    Bounds,
    /// [`Friction`]
    Friction,
    /// [`Dead`]
    Dead,
    /// [`Animation`]
    Animation,
    /// [`Cooldown`]
    Cooldown,
}

impl ComponentKind {
    /// Every kind, in declaration order.
    pub const ALL: [ComponentKind; 8] = [
        ComponentKind::Position,
        ComponentKind::Velocity,
        ComponentKind::Collider,
        ComponentKind::Bounds,
        ComponentKind::Friction,
        ComponentKind::Dead,
        ComponentKind::Animation,
        ComponentKind::Cooldown,
    ];

    /// The string identifier of this kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ComponentKind::Position => "position",
            ComponentKind::Velocity => "velocity",
            ComponentKind::Collider => "collider",
            ComponentKind::Bounds => "bounds",
            ComponentKind::Friction => "friction",
            ComponentKind::Dead => "dead",
            ComponentKind::Animation => "animation",
            ComponentKind::Cooldown => "cooldown",
        }
    }

    /// Looks a kind up by its string identifier.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Typed access to one variant of [`Component`].
///
/// Implemented for every concrete component struct.
pub trait ComponentType: Into<Component> + Sized + 'static {
    /// The kind this type is stored under.
    const KIND: ComponentKind;

    /// Borrows the concrete value if `component` is this type.
    fn from_ref(component: &Component) -> Option<&Self>;

    /// Mutably borrows the concrete value if `component` is this type.
    fn from_mut(component: &mut Component) -> Option<&mut Self>;

    /// Unwraps the concrete value if `component` is this type.
    fn from_owned(component: Component) -> Option<Self>;
}

/// Position component (top-left anchor of the entity) in world space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Position {
    /// X coordinate in world space.
    pub x: f32,
    /// Y coordinate in world space.
    pub y: f32,
}

impl Position {
    /// Creates a new position.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// As a vector.
    #[inline]
    #[must_use]
    pub const fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Velocity component, in world units per second.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Velocity {
    /// X velocity component.
    pub x: f32,
    /// Y velocity component.
    pub y: f32,
}

impl Velocity {
    /// Creates a new velocity.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// As a vector.
    #[inline]
    #[must_use]
    pub const fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Speed (magnitude).
    #[must_use]
    pub fn speed(self) -> f32 {
        self.to_vec2().length()
    }

    /// True when both components are exactly zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

impl From<Vec2> for Velocity {
    fn from(v: Vec2) -> Self {
        Self::new(v.x, v.y)
    }
}

/// Collision shape attached to an entity.
///
/// The box is `width x height`, offset from the entity's [`Position`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Collider {
    /// Box width.
    pub width: f32,
    /// Box height.
    pub height: f32,
    /// Solid colliders take part in blocking resolution.
    pub solid: bool,
    /// Triggers report overlaps but never block.
    pub is_trigger: bool,
    /// Collision layer. 0 collides with every layer.
    pub layer: u8,
    /// Horizontal offset from the position.
    pub offset_x: f32,
    /// Vertical offset from the position.
    pub offset_y: f32,
}

impl Collider {
    /// A solid, non-trigger box on layer 0 with no offset.
    #[must_use]
    pub const fn solid(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            solid: true,
            is_trigger: false,
            layer: 0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    /// A non-solid trigger box on layer 0 with no offset.
    #[must_use]
    pub const fn trigger(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            solid: false,
            is_trigger: true,
            layer: 0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    /// Returns the collider moved to `layer`.
    #[must_use]
    pub const fn with_layer(mut self, layer: u8) -> Self {
        self.layer = layer;
        self
    }

    /// Returns the collider with an offset from the position.
    #[must_use]
    pub const fn with_offset(mut self, offset_x: f32, offset_y: f32) -> Self {
        self.offset_x = offset_x;
        self.offset_y = offset_y;
        self
    }

    /// The world-space box when the owner stands at `(x, y)`.
    #[must_use]
    pub fn aabb_at(&self, x: f32, y: f32) -> Rect {
        Rect::new(x + self.offset_x, y + self.offset_y, self.width, self.height)
    }

    /// Solid and not a trigger.
    #[must_use]
    pub const fn is_blocking(&self) -> bool {
        self.solid && !self.is_trigger
    }

    /// Layer policy: different non-zero layers never interact.
    #[must_use]
    pub const fn shares_layer(&self, other: &Collider) -> bool {
        self.layer == 0 || other.layer == 0 || self.layer == other.layer
    }
}

/// Rectangle the entity's position is confined to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    /// Minimum X.
    pub min_x: f32,
    /// Minimum Y.
    pub min_y: f32,
    /// Maximum X.
    pub max_x: f32,
    /// Maximum Y.
    pub max_y: f32,
    /// Leaving one side re-enters from the opposite side instead of stopping.
    pub wrap: bool,
}

impl Bounds {
    /// Clamping bounds.
    #[must_use]
    pub const fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self { min_x, min_y, max_x, max_y, wrap: false }
    }

    /// Wrapping bounds.
    #[must_use]
    pub const fn wrapping(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self { min_x, min_y, max_x, max_y, wrap: true }
    }
}

/// Exponential velocity damping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Friction {
    /// Fraction of velocity lost per 1/60 s, in `[0, 1]`.
    pub coefficient: f32,
}

impl Friction {
    /// Creates a friction component.
    #[must_use]
    pub const fn new(coefficient: f32) -> Self {
        Self { coefficient }
    }
}

/// Marker: the entity is dead and fully immobilized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Dead;

/// Generic countdown (attack cooldowns, invulnerability windows).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Cooldown {
    /// Seconds left. Never negative.
    pub remaining: f32,
}

impl Cooldown {
    /// Starts a cooldown of `seconds`.
    #[must_use]
    pub const fn new(seconds: f32) -> Self {
        Self { remaining: seconds }
    }

    /// True once the countdown has elapsed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Counts down by `delta_time`, stopping at zero.
    pub fn tick(&mut self, delta_time: f32) {
        self.remaining = (self.remaining - delta_time).max(0.0);
    }
}

/// Animation state machine states.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AnimationState {
    /// Standing still.
    #[default]
    Idle,
    /// Moving slowly.
    Walk,
    /// Moving near max speed.
    Run,
    /// Attack swing.
    Attack,
    /// Taking damage.
    Hit,
    /// Dying. Never ends on its own.
    Death,
    /// Casting.
    Cast,
}

impl AnimationState {
    /// Action states play to completion and are never overridden by movement.
    #[must_use]
    pub const fn is_action(self) -> bool {
        matches!(
            self,
            AnimationState::Attack | AnimationState::Hit | AnimationState::Death | AnimationState::Cast
        )
    }
}

/// Direction a sprite faces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Facing {
    /// Towards negative Y.
    Up,
    /// Towards positive Y.
    #[default]
    Down,
    /// Towards negative X.
    Left,
    /// Towards positive X.
    Right,
}

/// Animation state holder read by the renderer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Animation {
    /// Current state.
    pub state: AnimationState,
    /// Current facing.
    pub facing: Facing,
    /// Seconds spent in the current state.
    pub elapsed: f32,
    /// Seconds left in the current action state (ignored for locomotion).
    pub action_remaining: f32,
}

impl Animation {
    /// Idle, facing down.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Switches state, restarting the state timer if it changed.
    pub fn set_state(&mut self, state: AnimationState) {
        if self.state != state {
            self.state = state;
            self.elapsed = 0.0;
        }
    }

    /// Starts an action state that runs for `duration` seconds.
    ///
    /// [`AnimationState::Death`] ignores the duration and never ends.
    pub fn play_action(&mut self, state: AnimationState, duration: f32) {
        self.state = state;
        self.elapsed = 0.0;
        self.action_remaining = duration.max(0.0);
    }

    /// True while an action state is still playing.
    #[must_use]
    pub fn is_playing_action(&self) -> bool {
        self.state.is_action()
            && (self.state == AnimationState::Death || self.action_remaining > 0.0)
    }
}

/// Every component an entity can carry.
#[derive(Clone, Debug, PartialEq)]
pub enum Component {
    /// See [`Position`].
    Position(Position),
    /// See [`Velocity`].
    Velocity(Velocity),
    /// See [`Collider`].
    Collider(Collider),
    /// See [`Bounds`].
    Bounds(Bounds),
    /// See [`Friction`].
    Friction(Friction),
    /// See [`Dead`].
    Dead(Dead),
    /// See [`Animation`].
    Animation(Animation),
    /// See [`Cooldown`].
    Cooldown(Cooldown),
}

impl Component {
    /// The kind identifier of this component.
    #[must_use]
    pub const fn kind(&self) -> ComponentKind {
        match self {
            Component::Position(_) => ComponentKind::Position,
            Component::Velocity(_) => ComponentKind::Velocity,
            Component::Collider(_) => ComponentKind::Collider,
            Component::Bounds(_) => ComponentKind::Bounds,
            Component::Friction(_) => ComponentKind::Friction,
            Component::Dead(_) => ComponentKind::Dead,
            Component::Animation(_) => ComponentKind::Animation,
            Component::Cooldown(_) => ComponentKind::Cooldown,
        }
    }
}

macro_rules! impl_component_type {
    ($($ty:ident),* $(,)?) => {
        $(
            impl From<$ty> for Component {
                fn from(value: $ty) -> Self {
                    Component::$ty(value)
                }
            }

            impl ComponentType for $ty {
                const KIND: ComponentKind = ComponentKind::$ty;

                fn from_ref(component: &Component) -> Option<&Self> {
                    match component {
                        Component::$ty(value) => Some(value),
                        _ => None,
                    }
                }

                fn from_mut(component: &mut Component) -> Option<&mut Self> {
                    match component {
                        Component::$ty(value) => Some(value),
                        _ => None,
                    }
                }

                fn from_owned(component: Component) -> Option<Self> {
                    match component {
                        Component::$ty(value) => Some(value),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_component_type!(Position, Velocity, Collider, Bounds, Friction, Dead, Animation, Cooldown);

//! # Movement System
//!
//! One pass per frame over every live entity, in slot order. Each entity
//! goes through the same stages:
//!
//! ```text
//! clamp_speed → integrate → resolve (terrain, then solids) → commit
//!             → clamp_to_bounds → apply_friction → cooldown → sync_animation
//! ```
//!
//! Dead entities are skipped outright: no movement, no friction, no timers.
//!
//! Each stage is a free function over plain component values. The system
//! computes a [`Step`] from an immutable view of the entity and the rest of
//! the set, then writes it back, so later entities in the same pass see the
//! moves of earlier ones.

use std::cell::RefCell;
use std::rc::Rc;

use ashfall_core::{
    Animation, AnimationState, Bounds, Collider, Cooldown, Dead, Entity, EntitySet, Facing,
    Friction, Position, System, Velocity,
};
use ashfall_shared::constants::TICK_RATE;
use ashfall_spatial::MotionGeneration;

use crate::collision::CollisionSystem;
use crate::config::MovementConfig;

/// Scales `velocity` down to at most `max_speed`. 0 means unlimited.
#[must_use]
pub fn clamp_speed(velocity: Velocity, max_speed: f32) -> Velocity {
    velocity.to_vec2().clamp_length(max_speed).into()
}

/// Explicit Euler step.
#[must_use]
pub fn integrate(position: Position, velocity: Velocity, delta_time: f32) -> Position {
    Position::new(
        position.x + velocity.x * delta_time,
        position.y + velocity.y * delta_time,
    )
}

/// Try, slide, or block.
///
/// Returns `to` if it is free. Otherwise tries keeping only the X motion
/// (dropping vertical velocity), then only the Y motion (dropping horizontal
/// velocity), and finally stays at `from` with zero velocity.
pub fn slide<F>(from: Position, to: Position, velocity: &mut Velocity, blocked: F) -> Position
where
    F: Fn(f32, f32) -> bool,
{
    if !blocked(to.x, to.y) {
        return to;
    }
    if !blocked(to.x, from.y) {
        velocity.y = 0.0;
        return Position::new(to.x, from.y);
    }
    if !blocked(from.x, to.y) {
        velocity.x = 0.0;
        return Position::new(from.x, to.y);
    }
    *velocity = Velocity::default();
    from
}

/// Predictive collision for one entity moving `from → to`.
///
/// Terrain first, then every other blocking entity it would overlap at the
/// target, including one it already overlaps at `from`. Such a pair stays
/// put and the collision pass separates it.
#[must_use]
pub fn resolve_step(
    collision: &CollisionSystem,
    entities: &EntitySet<'_>,
    entity: &Entity,
    from: Position,
    to: Position,
    velocity: &mut Velocity,
) -> Position {
    if !entity.get::<Collider>().is_some_and(Collider::is_blocking) {
        return to;
    }

    let mut target = slide(from, to, velocity, |x, y| {
        collision.would_collide_with_terrain(entity, x, y)
    });

    for other in entities.iter() {
        if !collision.would_collide_with_entity(entity, target.x, target.y, other) {
            continue;
        }
        target = slide(from, target, velocity, |x, y| {
            collision.would_collide_with_entity(entity, x, y, other)
                || collision.would_collide_with_terrain(entity, x, y)
        });
    }
    target
}

/// Keeps the position inside `bounds`.
///
/// Clamping zeroes the velocity component that hit the edge. Wrapping moves
/// the position by the range width and keeps the velocity.
pub fn clamp_to_bounds(position: &mut Position, velocity: &mut Velocity, bounds: &Bounds) {
    if bounds.wrap {
        position.x = wrap_axis(position.x, bounds.min_x, bounds.max_x);
        position.y = wrap_axis(position.y, bounds.min_y, bounds.max_y);
        return;
    }

    if position.x < bounds.min_x {
        position.x = bounds.min_x;
        velocity.x = 0.0;
    } else if position.x > bounds.max_x {
        position.x = bounds.max_x;
        velocity.x = 0.0;
    }
    if position.y < bounds.min_y {
        position.y = bounds.min_y;
        velocity.y = 0.0;
    } else if position.y > bounds.max_y {
        position.y = bounds.max_y;
        velocity.y = 0.0;
    }
}

fn wrap_axis(value: f32, min: f32, max: f32) -> f32 {
    let range = max - min;
    if range <= 0.0 || (min..=max).contains(&value) {
        return value;
    }
    min + (value - min).rem_euclid(range)
}

/// Frame-rate independent damping: `v *= (1 - c)^(dt * 60)`.
///
/// Snaps to rest once both components are below `epsilon`.
pub fn apply_friction(velocity: &mut Velocity, friction: &Friction, delta_time: f32, epsilon: f32) {
    let retain = (1.0 - friction.coefficient.clamp(0.0, 1.0)).powf(delta_time * TICK_RATE as f32);
    velocity.x *= retain;
    velocity.y *= retain;

    if velocity.x.abs() < epsilon && velocity.y.abs() < epsilon {
        *velocity = Velocity::default();
    }
}

/// Facing implied by `velocity`, or `None` if it is too small to tell.
///
/// Horizontal wins ties.
#[must_use]
pub fn facing_for(velocity: Velocity, threshold: f32) -> Option<Facing> {
    let (ax, ay) = (velocity.x.abs(), velocity.y.abs());
    if ax < threshold && ay < threshold {
        return None;
    }
    Some(if ax >= ay {
        if velocity.x < 0.0 {
            Facing::Left
        } else {
            Facing::Right
        }
    } else if velocity.y < 0.0 {
        Facing::Up
    } else {
        Facing::Down
    })
}

/// Idle, walk or run for a given speed.
#[must_use]
pub fn locomotion_state(speed: f32, config: &MovementConfig) -> AnimationState {
    let run_at = if config.max_speed > 0.0 {
        config.max_speed * config.run_fraction
    } else {
        config.run_speed
    };

    if speed < config.velocity_epsilon {
        AnimationState::Idle
    } else if speed >= run_at {
        AnimationState::Run
    } else {
        AnimationState::Walk
    }
}

/// Advances the animation timers and derives state and facing from velocity.
///
/// A playing action (attack, hit, cast, death) keeps its state and facing
/// until its timer runs out; death never does.
pub fn sync_animation(
    animation: &mut Animation,
    velocity: Velocity,
    delta_time: f32,
    config: &MovementConfig,
) {
    animation.elapsed += delta_time;

    if animation.is_playing_action() && animation.state != AnimationState::Death {
        animation.action_remaining = (animation.action_remaining - delta_time).max(0.0);
    }
    if !animation.is_playing_action() {
        animation.set_state(locomotion_state(velocity.speed(), config));
        if let Some(facing) = facing_for(velocity, config.facing_threshold) {
            animation.facing = facing;
        }
    }
}

/// New component values for one entity.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Step {
    /// Committed position, if the entity moves.
    pub position: Option<Position>,
    /// Velocity after clamping, collision, bounds and friction.
    pub velocity: Option<Velocity>,
    /// Updated cooldown.
    pub cooldown: Option<Cooldown>,
    /// Updated animation.
    pub animation: Option<Animation>,
}

/// Runs every stage for `entity`. `None` for dead entities.
#[must_use]
pub fn plan_step(
    entity: &Entity,
    entities: &EntitySet<'_>,
    collision: Option<&CollisionSystem>,
    config: &MovementConfig,
    delta_time: f32,
) -> Option<Step> {
    if entity.has::<Dead>() {
        return None;
    }

    let mut step = Step::default();

    if let (Some(&from), Some(&velocity)) = (entity.get::<Position>(), entity.get::<Velocity>()) {
        let mut velocity = clamp_speed(velocity, config.max_speed);
        let candidate = integrate(from, velocity, delta_time);

        let mut position = match collision {
            Some(collision) => resolve_step(collision, entities, entity, from, candidate, &mut velocity),
            None => candidate,
        };

        if let Some(bounds) = entity.get::<Bounds>() {
            clamp_to_bounds(&mut position, &mut velocity, bounds);
        }
        if let Some(friction) = entity.get::<Friction>() {
            apply_friction(&mut velocity, friction, delta_time, config.velocity_epsilon);
        }

        step.position = Some(position);
        step.velocity = Some(velocity);
    }

    if let Some(mut cooldown) = entity.get::<Cooldown>().copied() {
        cooldown.tick(delta_time);
        step.cooldown = Some(cooldown);
    }

    if let Some(mut animation) = entity.get::<Animation>().copied() {
        let velocity = step.velocity.unwrap_or_default();
        sync_animation(&mut animation, velocity, delta_time, config);
        step.animation = Some(animation);
    }

    Some(step)
}

/// Writes `step` back. Returns true if the position changed.
fn commit(entity: &mut Entity, step: Step) -> bool {
    let mut moved = false;
    if let (Some(new), Some(pos)) = (step.position, entity.get_mut::<Position>()) {
        moved = *pos != new;
        *pos = new;
    }
    if let (Some(new), Some(vel)) = (step.velocity, entity.get_mut::<Velocity>()) {
        *vel = new;
    }
    if let (Some(new), Some(cooldown)) = (step.cooldown, entity.get_mut::<Cooldown>()) {
        *cooldown = new;
    }
    if let (Some(new), Some(animation)) = (step.animation, entity.get_mut::<Animation>()) {
        *animation = new;
    }
    moved
}

/// Integrates velocities, slides along obstacles and keeps derived state in sync.
pub struct MovementSystem {
    config: MovementConfig,
    collision: Option<Rc<RefCell<CollisionSystem>>>,
    motion: MotionGeneration,
    moved_last_frame: usize,
}

impl MovementSystem {
    /// Movement without collision.
    #[must_use]
    pub fn new(config: MovementConfig) -> Self {
        Self {
            config,
            collision: None,
            motion: MotionGeneration::new(),
            moved_last_frame: 0,
        }
    }

    /// Consults `collision` before committing each step.
    #[must_use]
    pub fn with_collision(mut self, collision: Rc<RefCell<CollisionSystem>>) -> Self {
        self.collision = Some(collision);
        self
    }

    /// Bumps `motion` instead of a private counter.
    #[must_use]
    pub fn with_motion_generation(mut self, motion: MotionGeneration) -> Self {
        self.motion = motion;
        self
    }

    /// Handle to the counter bumped whenever anything moves.
    #[must_use]
    pub fn motion_generation(&self) -> MotionGeneration {
        self.motion.clone()
    }

    /// Entities whose position changed in the last pass.
    #[must_use]
    pub fn moved_last_frame(&self) -> usize {
        self.moved_last_frame
    }

    /// Current tuning.
    #[must_use]
    pub fn config(&self) -> &MovementConfig {
        &self.config
    }
}

impl System for MovementSystem {
    fn name(&self) -> &'static str {
        "movement"
    }

    fn update(&mut self, entities: &mut EntitySet<'_>, delta_time: f32) {
        let collision = self.collision.as_ref().map(|shared| shared.borrow());
        let collision = collision.as_deref();
        let mut moved = 0;

        for slot in 0..entities.slot_count() {
            let Some(entity) = entities.slot(slot) else {
                continue;
            };
            let Some(step) = plan_step(entity, entities, collision, &self.config, delta_time) else {
                continue;
            };
            if let Some(entity) = entities.slot_mut(slot) {
                if commit(entity, step) {
                    moved += 1;
                }
            }
        }

        self.moved_last_frame = moved;
        if moved > 0 {
            self.motion.bump();
        }
    }
}

//! Entity-versus-entity narrow phase and separation.

use ashfall_core::{Collider, Dead, Entity, Position, Velocity};

/// Axis of a separation push.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Horizontal.
    X,
    /// Vertical.
    Y,
}

/// Narrow-phase test between two entities at their current positions.
///
/// True when both carry a collider on a shared layer and their boxes overlap
/// strictly. Zero-area boxes never collide. Symmetric in `a` and `b`.
#[must_use]
pub fn check_collision(a: &Entity, b: &Entity) -> bool {
    let (Some(ca), Some(cb)) = (a.get::<Collider>(), b.get::<Collider>()) else {
        return false;
    };
    if !ca.shares_layer(cb) {
        return false;
    }
    match (a.aabb(), b.aabb()) {
        (Some(box_a), Some(box_b)) => box_a.intersects(&box_b),
        _ => false,
    }
}

/// Both colliders are solid and neither is a trigger.
#[must_use]
pub fn is_blocking_pair(a: &Entity, b: &Entity) -> bool {
    match (a.get::<Collider>(), b.get::<Collider>()) {
        (Some(ca), Some(cb)) => ca.is_blocking() && cb.is_blocking(),
        _ => false,
    }
}

fn push(entity: &mut Entity, axis: Axis, distance: f32) {
    if let Some(pos) = entity.get_mut::<Position>() {
        match axis {
            Axis::X => pos.x += distance,
            Axis::Y => pos.y += distance,
        }
    }
    if let Some(vel) = entity.get_mut::<Velocity>() {
        match axis {
            Axis::X => vel.x = 0.0,
            Axis::Y => vel.y = 0.0,
        }
    }
}

/// Pushes two overlapping entities apart along the axis of least overlap.
///
/// Each side moves half the overlap and loses its velocity on that axis. A
/// dead entity stays put and the other one takes the whole push. Returns the
/// axis used, or `None` if the boxes did not overlap.
///
/// `a` moves towards negative coordinates unless its centre is strictly
/// past `b`'s on the push axis.
pub fn resolve_collision(a: &mut Entity, b: &mut Entity) -> Option<Axis> {
    let (box_a, box_b) = (a.aabb()?, b.aabb()?);
    if !box_a.intersects(&box_b) {
        return None;
    }

    let (overlap_x, overlap_y) = box_a.overlap(&box_b);
    let (centre_a, centre_b) = (box_a.center(), box_b.center());
    let (axis, overlap, a_is_past) = if overlap_x < overlap_y {
        (Axis::X, overlap_x, centre_a.x > centre_b.x)
    } else {
        (Axis::Y, overlap_y, centre_a.y > centre_b.y)
    };
    let direction = if a_is_past { 1.0 } else { -1.0 };

    let (a_dead, b_dead) = (a.has::<Dead>(), b.has::<Dead>());
    let (share_a, share_b) = match (a_dead, b_dead) {
        (false, false) => (overlap * 0.5, overlap * 0.5),
        (true, false) => (0.0, overlap),
        (false, true) => (overlap, 0.0),
        (true, true) => return None,
    };

    if share_a > 0.0 {
        push(a, axis, direction * share_a);
    }
    if share_b > 0.0 {
        push(b, axis, -direction * share_b);
    }
    Some(axis)
}

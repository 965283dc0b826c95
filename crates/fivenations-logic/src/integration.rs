//! Physical integration of a [`MotionState`] over one tick.
//!
//! Effects only set rates (acceleration, angular velocity) and flags; this
//! module turns those rates into a new position, the derived distances that
//! the next tick's effects read, and sector-by-sector turning.
//!
//! Translation is a straight line along `target_angle` that stops short of
//! overshooting the order target. Turning is visual:
//! it walks `current_consolidated_angle` towards the target sector the
//! shorter way round, one whole sector per accumulated step.

use crate::geometry::Vec2;
use crate::motion::{MotionState, Rotation};
use crate::sectors::{sector_steps, shortest_turn, step_sector};

/// Advance `state` by `dt` seconds from `position`, returning the new position.
pub fn integrate(state: &mut MotionState, position: Vec2, dt: f64) -> Vec2 {
    let movement = &mut state.movement;

    let top_speed = movement.max_velocity.max(0.0);
    movement.velocity = (movement.velocity + movement.acceleration * dt).clamp(0.0, top_speed);

    // Never carry past the order target; a unit that lands on it reads distance 0
    let step = (movement.velocity * dt).min(position.distance(&movement.target()));
    let position = position + Vec2::from_angle(movement.target_angle) * step;

    movement.distance = position.distance(&movement.target());
    movement.distance_from_origin = position.distance(&movement.origin());
    movement.distance_inverse = movement.target_initial_distance - movement.distance;

    if advance_rotation(&mut state.rotation, dt) {
        movement.current_angle = movement.target_angle;
    }

    position
}

/// Step the facing towards the target sector. Returns true once facing it.
fn advance_rotation(rotation: &mut Rotation, dt: f64) -> bool {
    if rotation.is_facing_target() {
        rotation.sector_progress = 0.0;
        return true;
    }

    rotation.sector_progress += rotation.angular_velocity * dt;
    while rotation.sector_progress >= 1.0 {
        let Some(direction) = shortest_turn(
            rotation.current_consolidated_angle,
            rotation.target_consolidated_angle,
            rotation.max_angle_count,
        ) else {
            break;
        };
        rotation.current_consolidated_angle =
            step_sector(rotation.current_consolidated_angle, rotation.max_angle_count, direction);
        rotation.sector_progress -= 1.0;
    }

    let (right, left) = sector_steps(
        rotation.current_consolidated_angle,
        rotation.target_consolidated_angle,
        rotation.max_angle_count,
    );
    rotation.step_number_to_right = right;
    rotation.step_number_to_left = left;

    if rotation.is_facing_target() {
        rotation.sector_progress = 0.0;
        true
    } else {
        false
    }
}

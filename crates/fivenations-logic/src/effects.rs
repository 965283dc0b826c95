//! Motion effects - per-tick behaviours that drive a unit through a movement order.
//!
//! An effect is a plain function over a [`MotionState`]. It returns `true` to
//! stay active on the next tick and `false` once it is done, at which point
//! the owner of the effect queue moves on to the next effect. Effects only
//! touch the state they are given; the owner integrates position and facing
//! from the resulting acceleration, velocity and step counts.
//!
//! A conventional movement order queues all six built-ins in
//! [`Effect::MOVEMENT_SEQUENCE`] order.

use serde::{Deserialize, Serialize};

use crate::geometry::{normalize_degrees, rad_to_deg};
use crate::motion::{MotionContext, MotionState};
use crate::sectors::{consolidate_angle, sector_steps};

/// Signature shared by every effect.
pub type EffectFn = fn(&mut MotionState, &MotionContext) -> bool;

/// Built-in motion effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    InitMovement,
    RotateToTarget,
    AccelerateToTarget,
    MoveToTarget,
    Stopping,
    ResetMovement,
}

impl Effect {
    pub const ALL: [Effect; 6] = [
        Effect::InitMovement,
        Effect::RotateToTarget,
        Effect::AccelerateToTarget,
        Effect::MoveToTarget,
        Effect::Stopping,
        Effect::ResetMovement,
    ];

    /// Order in which a standard movement order runs the effects.
    pub const MOVEMENT_SEQUENCE: [Effect; 6] = Self::ALL;

    /// Registry name of the effect.
    pub fn name(self) -> &'static str {
        match self {
            Effect::InitMovement => "initMovement",
            Effect::RotateToTarget => "rotateToTarget",
            Effect::AccelerateToTarget => "accelerateToTarget",
            Effect::MoveToTarget => "moveToTarget",
            Effect::Stopping => "stopping",
            Effect::ResetMovement => "resetMovement",
        }
    }

    pub fn from_name(name: &str) -> Option<Effect> {
        Self::ALL.into_iter().find(|effect| effect.name() == name)
    }

    pub fn function(self) -> EffectFn {
        match self {
            Effect::InitMovement => init_movement,
            Effect::RotateToTarget => rotate_to_target,
            Effect::AccelerateToTarget => accelerate_to_target,
            Effect::MoveToTarget => move_to_target,
            Effect::Stopping => stopping,
            Effect::ResetMovement => reset_movement,
        }
    }
}

/// Names of the standard movement order, owned.
pub fn movement_sequence() -> Vec<String> {
    Effect::MOVEMENT_SEQUENCE
        .iter()
        .map(|effect| effect.name().to_string())
        .collect()
}

/// Set up a new movement order towards `ctx.target`. Always returns false.
pub fn init_movement(state: &mut MotionState, ctx: &MotionContext) -> bool {
    let position = ctx.position;
    let target = ctx.target;
    let distance = position.distance(&target);
    let movement = &mut state.movement;
    let rotation = &mut state.rotation;

    movement.origin_x = position.x;
    movement.origin_y = position.y;
    movement.target_x = target.x;
    movement.target_y = target.y;
    movement.target_initial_distance = distance;
    movement.target_drag_threshold = movement.max_target_drag_threshold.min(distance / 2.0);
    movement.target_angle = position.angle_to(&target);
    movement.distance = distance;
    movement.distance_inverse = 0.0;
    movement.distance_from_origin = 0.0;

    if rotation.max_angle_count <= 1 {
        movement.current_angle = movement.target_angle;
        rotation.current_consolidated_angle = 0;
        rotation.target_consolidated_angle = 0;
        rotation.step_number_to_right = 0;
        rotation.step_number_to_left = 0;
    } else {
        rotation.calculated_angle = normalize_degrees(rad_to_deg(movement.target_angle));
        rotation.target_consolidated_angle =
            consolidate_angle(rotation.calculated_angle, rotation.max_angle_count);
        let (right, left) = sector_steps(
            rotation.current_consolidated_angle,
            rotation.target_consolidated_angle,
            rotation.max_angle_count,
        );
        rotation.step_number_to_right = right;
        rotation.step_number_to_left = left;
    }

    state.is_entity_arrived_at_destination = false;
    state.is_entity_stopped_at_destination = false;

    false
}

/// Turn towards the target facing.
///
/// A unit that is already translating turns 1.5x faster and does not hold
/// the queue; a stationary unit holds it until it faces the target sector.
pub fn rotate_to_target(state: &mut MotionState, _ctx: &MotionContext) -> bool {
    if state.movement.velocity > 0.0 {
        state.rotation.angular_velocity = state.rotation.max_angular_velocity * 1.5;
        return false;
    }

    state.rotation.angular_velocity = state.rotation.max_angular_velocity;
    !state.rotation.is_facing_target()
}

/// Speed up until top speed or the drag threshold's worth of distance is covered.
pub fn accelerate_to_target(state: &mut MotionState, _ctx: &MotionContext) -> bool {
    let movement = &mut state.movement;
    movement.acceleration = movement.max_acceleration;
    movement.distance_inverse < movement.target_drag_threshold
        && movement.velocity < movement.max_velocity
}

/// Coast at constant speed until within the drag threshold, then flag arrival.
pub fn move_to_target(state: &mut MotionState, _ctx: &MotionContext) -> bool {
    state.movement.acceleration = 0.0;
    if state.movement.distance > state.movement.target_drag_threshold {
        true
    } else {
        state.is_entity_arrived_at_destination = true;
        false
    }
}

/// Brake until stopped, at the target, or past the original distance.
pub fn stopping(state: &mut MotionState, _ctx: &MotionContext) -> bool {
    let movement = &mut state.movement;
    movement.acceleration = -movement.max_acceleration;
    if movement.distance > 0.0
        && movement.distance_from_origin < movement.target_initial_distance
        && movement.velocity > 0.0
    {
        return true;
    }

    if state.is_entity_arrived_at_destination {
        state.is_entity_stopped_at_destination = true;
    }
    false
}

/// Zero every rate so the unit idles. Always returns false.
pub fn reset_movement(state: &mut MotionState, _ctx: &MotionContext) -> bool {
    state.movement.acceleration = 0.0;
    state.movement.velocity = 0.0;
    state.rotation.angular_velocity = 0.0;
    false
}

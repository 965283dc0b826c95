//! Per-entity motion state consumed and produced by the effect functions.

use serde::{Deserialize, Serialize};

use crate::geometry::Vec2;
use crate::profile::UnitProfile;

/// Translation variables of the current movement order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    /// Position when the current order began
    pub origin_x: f64,
    pub origin_y: f64,
    /// Destination of the current order
    pub target_x: f64,
    pub target_y: f64,
    /// Distance to the destination when the order was issued
    pub target_initial_distance: f64,
    /// Remaining distance at which braking starts; at most half the initial distance
    pub target_drag_threshold: f64,
    pub max_target_drag_threshold: f64,
    /// Heading to the destination in radians
    pub target_angle: f64,
    pub current_angle: f64,
    pub acceleration: f64,
    pub max_acceleration: f64,
    pub velocity: f64,
    pub max_velocity: f64,
    /// Remaining distance to the destination (integrated each tick)
    pub distance: f64,
    /// Distance already covered, `target_initial_distance - distance`
    pub distance_inverse: f64,
    pub distance_from_origin: f64,
}

impl Movement {
    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.origin_x, self.origin_y)
    }

    pub fn target(&self) -> Vec2 {
        Vec2::new(self.target_x, self.target_y)
    }
}

/// Facing variables, in discrete sectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    /// Number of sprite facings; 1 means no rotation modelling
    pub max_angle_count: u32,
    /// Heading to the target in degrees, `[0, 360)`
    pub calculated_angle: f64,
    pub current_consolidated_angle: u32,
    pub target_consolidated_angle: u32,
    pub step_number_to_right: u32,
    pub step_number_to_left: u32,
    /// Sectors per second
    pub angular_velocity: f64,
    pub max_angular_velocity: f64,
    /// Fractional sector steps accumulated by the integrator
    pub sector_progress: f64,
}

impl Rotation {
    pub fn is_facing_target(&self) -> bool {
        self.current_consolidated_angle == self.target_consolidated_angle
    }
}

/// Everything the motion effects read and write for one entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionState {
    pub movement: Movement,
    pub rotation: Rotation,
    pub is_entity_arrived_at_destination: bool,
    pub is_entity_stopped_at_destination: bool,
}

impl MotionState {
    /// Fresh, stationary state carrying the limits of `profile`.
    pub fn from_profile(profile: &UnitProfile) -> Self {
        Self {
            movement: Movement {
                max_acceleration: profile.max_acceleration,
                max_velocity: profile.max_velocity,
                max_target_drag_threshold: profile.max_target_drag_threshold,
                ..Default::default()
            },
            rotation: Rotation {
                max_angle_count: profile.max_angle_count.max(1),
                max_angular_velocity: profile.max_angular_velocity,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn is_moving(&self) -> bool {
        self.movement.velocity > 0.0
    }
}

/// Inputs an effect may read besides the motion state itself.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionContext {
    /// Where the entity currently is
    pub position: Vec2,
    /// Coordinates of the movement order in force
    pub target: Vec2,
}

//! Per unit-type motion limits, as authored in the unit data files.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Most facings a sprite sheet may declare (one per degree)
pub const MAX_ANGLE_COUNT: u32 = 360;

/// Motion limits shared by every unit of one type.
///
/// Fields missing from a data file take their [`Default`] values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitProfile {
    /// Top speed in world units per second
    pub max_velocity: f64,
    /// Acceleration (and braking) in world units per second squared
    pub max_acceleration: f64,
    /// Turn rate in sectors per second
    pub max_angular_velocity: f64,
    /// Number of facings in the sprite sheet; 1 disables rotation modelling
    pub max_angle_count: u32,
    /// Upper bound for the distance at which a unit starts braking
    pub max_target_drag_threshold: f64,
}

impl Default for UnitProfile {
    fn default() -> Self {
        Self {
            max_velocity: 100.0,
            max_acceleration: 50.0,
            max_angular_velocity: 8.0,
            max_angle_count: 16,
            max_target_drag_threshold: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProfileError {
    #[error("max_angle_count must be at least 1")]
    ZeroAngleCount,
    #[error("max_angle_count must be at most {MAX_ANGLE_COUNT} (got {0})")]
    TooManyAngles(u32),
    #[error("{field} must be a finite, non-negative number (got {value})")]
    InvalidLimit { field: &'static str, value: f64 },
}

impl UnitProfile {
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.max_angle_count == 0 {
            return Err(ProfileError::ZeroAngleCount);
        }
        if self.max_angle_count > MAX_ANGLE_COUNT {
            return Err(ProfileError::TooManyAngles(self.max_angle_count));
        }
        let limits = [
            ("max_velocity", self.max_velocity),
            ("max_acceleration", self.max_acceleration),
            ("max_angular_velocity", self.max_angular_velocity),
            ("max_target_drag_threshold", self.max_target_drag_threshold),
        ];
        for (field, value) in limits {
            if !value.is_finite() || value < 0.0 {
                return Err(ProfileError::InvalidLimit { field, value });
            }
        }
        Ok(())
    }

    /// Whether the unit turns through discrete facings at all.
    pub fn has_rotation(&self) -> bool {
        self.max_angle_count > 1
    }
}

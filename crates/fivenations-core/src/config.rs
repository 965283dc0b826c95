//! Simulation configuration and the unit catalog.
//!
//! Both are plain serde structs read from JSON. Missing `SimConfig` fields
//! fall back to their defaults, so a config file only has to name what it
//! changes.

use std::collections::BTreeMap;

use fivenations_logic::effects::movement_sequence;
use fivenations_logic::UnitProfile;
use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// How handlers and the dispatcher treat structurally incomplete commands.
///
/// Unknown command ids, effect names and entity ids are always fatal; this
/// only governs commands with a missing id or a handler payload that lacks
/// `targets`/`data`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedInputPolicy {
    /// Skip silently
    #[default]
    Ignore,
    /// Fail the dispatch with `SimError::MalformedCommand`
    Reject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Simulation ticks per second
    pub tick_rate: f64,
    pub malformed_input: MalformedInputPolicy,
    /// A follower closer than this to its target does not start a new order
    pub follow_distance: f64,
    /// Effect names installed by a movement order, in order
    pub default_movement_effects: Vec<String>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            malformed_input: MalformedInputPolicy::Ignore,
            follow_distance: 40.0,
            default_movement_effects: movement_sequence(),
        }
    }
}

impl SimConfig {
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Seconds per tick
    pub fn tick_delta(&self) -> f64 {
        if self.tick_rate > 0.0 {
            1.0 / self.tick_rate
        } else {
            0.0
        }
    }
}

/// Motion limits per unit type, keyed by type name (e.g. "intruder").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitCatalog {
    profiles: BTreeMap<String, UnitProfile>,
}

impl UnitCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `{ "type": { ...profile... } }` map, validating every profile.
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let catalog: UnitCatalog = serde_json::from_str(json)?;
        for (unit_type, profile) in &catalog.profiles {
            validate(unit_type, profile)?;
        }
        Ok(catalog)
    }

    pub fn insert(
        &mut self,
        unit_type: impl Into<String>,
        profile: UnitProfile,
    ) -> Result<(), SimError> {
        let unit_type = unit_type.into();
        validate(&unit_type, &profile)?;
        self.profiles.insert(unit_type, profile);
        Ok(())
    }

    pub fn get(&self, unit_type: &str) -> Option<&UnitProfile> {
        self.profiles.get(unit_type)
    }

    pub fn unit_types(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

fn validate(unit_type: &str, profile: &UnitProfile) -> Result<(), SimError> {
    profile.validate().map_err(|source| SimError::InvalidProfile {
        unit_type: unit_type.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config =
            SimConfig::from_json(r#"{ "tick_rate": 30.0, "malformed_input": "reject" }"#).unwrap();
        assert_eq!(config.tick_rate, 30.0);
        assert_eq!(config.malformed_input, MalformedInputPolicy::Reject);
        assert_eq!(config.follow_distance, 40.0);
        assert_eq!(config.default_movement_effects.len(), 6);
        assert_eq!(config.default_movement_effects[0], "initMovement");
        assert_eq!(config.default_movement_effects[5], "resetMovement");
    }

    #[test]
    fn tick_delta_inverts_rate() {
        let config = SimConfig {
            tick_rate: 50.0,
            ..Default::default()
        };
        assert!((config.tick_delta() - 0.02).abs() < 1e-12);
        let stopped = SimConfig {
            tick_rate: 0.0,
            ..Default::default()
        };
        assert_eq!(stopped.tick_delta(), 0.0);
    }

    #[test]
    fn bad_json_is_a_config_error() {
        assert!(matches!(SimConfig::from_json("{ nope"), Err(SimError::Config(_))));
    }

    #[test]
    fn catalog_parses_and_validates() {
        let json = r#"{
            "intruder": { "max_velocity": 120.0, "max_acceleration": 60.0, "max_angular_velocity": 10.0,
                          "max_angle_count": 16, "max_target_drag_threshold": 40.0 }
        }"#;
        let catalog = UnitCatalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("intruder").map(|p| p.max_angle_count), Some(16));
        assert!(catalog.get("mothership").is_none());
    }

    #[test]
    fn catalog_rejects_zero_facings() {
        let json = r#"{
            "rock": { "max_velocity": 0.0, "max_acceleration": 0.0, "max_angular_velocity": 0.0,
                      "max_angle_count": 0, "max_target_drag_threshold": 0.0 }
        }"#;
        match UnitCatalog::from_json(json) {
            Err(SimError::InvalidProfile { unit_type, .. }) => assert_eq!(unit_type, "rock"),
            other => panic!("Expected InvalidProfile, got {:?}", other),
        }
    }
}

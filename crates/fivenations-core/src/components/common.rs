//! Identity and placement components shared by every simulated unit.

use fivenations_logic::Vec2;
use serde::{Deserialize, Serialize};

/// Producer-facing entity id, as carried in command targets and payloads.
///
/// Distinct from `hecs::Entity`: ids are chosen by whoever spawns the unit
/// and stay stable for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        EntityId(id)
    }
}

/// World-space position of an entity
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position(pub Vec2);

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self(Vec2::new(x, y))
    }
}

/// Identifies a unit and the catalog entry its motion limits came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: EntityId,
    pub unit_type: String,
}

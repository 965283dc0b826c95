//! Errors raised by command dispatch, motion ticking and engine setup.

use fivenations_logic::{EffectNotFound, ProfileError};
use thiserror::Error;

use crate::components::EntityId;

#[derive(Debug, Error)]
pub enum SimError {
    /// A command id with no registered handler
    #[error("no command handler is registered for id {0:?}")]
    CommandNotFound(String),

    /// An effect name with no registered function
    #[error(transparent)]
    Effect(#[from] EffectNotFound),

    /// A command refers to an entity that does not exist
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),

    #[error("entity {0} already exists")]
    DuplicateEntity(EntityId),

    #[error("unknown unit type {0:?}")]
    UnknownUnitType(String),

    #[error("invalid profile for unit type {unit_type:?}: {source}")]
    InvalidProfile {
        unit_type: String,
        #[source]
        source: ProfileError,
    },

    /// Only raised under `MalformedInputPolicy::Reject`
    #[error("malformed command {id:?}: {reason}")]
    MalformedCommand { id: String, reason: &'static str },

    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl SimError {
    /// Identifier-resolution failures (unknown command, effect or entity).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SimError::CommandNotFound(_) | SimError::Effect(_) | SimError::UnknownEntity(_)
        )
    }
}

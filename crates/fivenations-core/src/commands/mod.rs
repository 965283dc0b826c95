//! Commands - discrete, queued instructions from input and AI producers.
//!
//! A producer adds a [`Command`] to the [`CommandQueue`]; once per tick the
//! [`Dispatcher`] drains the queue in FIFO order, resolves each command's
//! handler through the [`CommandRegistry`], executes it against the
//! [`EntityManager`](crate::entities::EntityManager) and announces the
//! command id on the [`LocalNotifier`].

mod dispatcher;
mod follow;
mod movement;
mod notifier;
mod queue;
mod registry;

pub use dispatcher::*;
pub use follow::*;
pub use movement::*;
pub use notifier::*;
pub use queue::*;
pub use registry::*;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::components::EntityId;
use crate::config::MalformedInputPolicy;
use crate::entities::EntityManager;
use crate::error::SimError;

/// Command ids registered by default
pub mod ids {
    pub const ENTITY_MOVE: &str = "entity/move";
    pub const ENTITY_STOP: &str = "entity/stop";
    pub const ENTITY_FOLLOW: &str = "entity/follow";
}

/// A single queued instruction. Consumed exactly once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    /// Handler id; an empty id marks the command as malformed
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<EntityId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    #[serde(default)]
    pub reset_activity_queue: bool,
}

impl Command {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_targets<I, T>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<EntityId>,
    {
        self.targets = Some(targets.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = Some(data);
        self
    }

    /// Set one payload field, creating the payload if needed.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn reset_activity_queue(mut self, reset: bool) -> Self {
        self.reset_activity_queue = reset;
        self
    }
}

/// What a handler receives for one command.
#[derive(Debug, Clone, Copy)]
pub struct CommandContext<'a> {
    pub id: &'a str,
    pub targets: Option<&'a [EntityId]>,
    pub data: Option<&'a Map<String, Value>>,
    pub reset_activity_queue: bool,
    pub policy: MalformedInputPolicy,
}

impl<'a> CommandContext<'a> {
    pub fn from_command(command: &'a Command, policy: MalformedInputPolicy) -> Self {
        Self {
            id: &command.id,
            targets: command.targets.as_deref(),
            data: command.data.as_ref(),
            reset_activity_queue: command.reset_activity_queue,
            policy,
        }
    }

    /// Both `targets` and `data`, or the policy's answer to their absence:
    /// `Ok(None)` to skip silently, an error to reject.
    pub fn targets_and_data(
        &self,
    ) -> Result<Option<(&'a [EntityId], &'a Map<String, Value>)>, SimError> {
        match (self.targets, self.data) {
            (Some(targets), Some(data)) => Ok(Some((targets, data))),
            _ => self.malformed("targets and data are required"),
        }
    }

    /// Apply the malformed-input policy.
    pub fn malformed<T>(&self, reason: &'static str) -> Result<Option<T>, SimError> {
        match self.policy {
            MalformedInputPolicy::Ignore => Ok(None),
            MalformedInputPolicy::Reject => Err(SimError::MalformedCommand {
                id: self.id.to_string(),
                reason,
            }),
        }
    }
}

/// One handler per command id, resolved once and reused for every invocation.
///
/// Handlers keep no per-invocation state; everything they change lives in
/// the entity manager.
pub trait CommandHandler {
    fn execute(
        &self,
        ctx: &CommandContext<'_>,
        entities: &mut EntityManager,
    ) -> Result<(), SimError>;
}

/// Read an entity id from a payload value: a number, or a string of digits.
pub fn entity_id_from_value(value: &Value) -> Option<EntityId> {
    match value {
        Value::Number(n) => n.as_u64().map(EntityId),
        Value::String(s) => s.parse::<u64>().ok().map(EntityId),
        _ => None,
    }
}

//! Command registry - command id to handler lookup.

use std::collections::HashMap;

use super::{ids, CommandHandler, EntityFollow, EntityMove, EntityStop};
use crate::error::SimError;

/// Maps command ids to their handlers.
///
/// [`CommandRegistry::default`] registers `entity/move`, `entity/stop` and
/// `entity/follow`.
pub struct CommandRegistry {
    handlers: HashMap<String, Box<dyn CommandHandler>>,
}

impl CommandRegistry {
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(ids::ENTITY_MOVE, EntityMove);
        registry.register(ids::ENTITY_STOP, EntityStop);
        registry.register(ids::ENTITY_FOLLOW, EntityFollow);
        registry
    }

    /// Register `handler` under `id`, replacing any previous handler.
    pub fn register(&mut self, id: impl Into<String>, handler: impl CommandHandler + 'static) {
        self.handlers.insert(id.into(), Box::new(handler));
    }

    pub fn get(&self, id: &str) -> Result<&dyn CommandHandler, SimError> {
        self.handlers
            .get(id)
            .map(|handler| handler.as_ref())
            .ok_or_else(|| SimError::CommandNotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.handlers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

//! Effect registry - name to effect function lookup.

use std::collections::HashMap;

use thiserror::Error;

use crate::effects::{Effect, EffectFn};

/// Lookup failure for an empty or unregistered effect name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no effect is registered with the name {name:?}")]
pub struct EffectNotFound {
    pub name: String,
}

/// Maps effect names to effect functions.
///
/// [`EffectRegistry::default`] contains the six built-ins; more can be added
/// with [`EffectRegistry::register`].
#[derive(Debug, Clone)]
pub struct EffectRegistry {
    effects: HashMap<String, EffectFn>,
}

impl EffectRegistry {
    /// Registry with no effects at all.
    pub fn empty() -> Self {
        Self {
            effects: HashMap::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for effect in Effect::ALL {
            registry.register(effect.name(), effect.function());
        }
        registry
    }

    /// Register `effect` under `name`, returning whatever it replaced.
    pub fn register(&mut self, name: impl Into<String>, effect: EffectFn) -> Option<EffectFn> {
        self.effects.insert(name.into(), effect)
    }

    pub fn get(&self, name: &str) -> Result<EffectFn, EffectNotFound> {
        if name.is_empty() {
            return Err(EffectNotFound {
                name: String::new(),
            });
        }
        self.effects.get(name).copied().ok_or_else(|| EffectNotFound {
            name: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        !name.is_empty() && self.effects.contains_key(name)
    }

    /// Check every name in `names`, failing on the first unknown one.
    pub fn validate<'a>(
        &self,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), EffectNotFound> {
        for name in names {
            self.get(name)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

impl Default for EffectRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

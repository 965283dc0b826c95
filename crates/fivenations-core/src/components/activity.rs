//! Per-entity activity components: the effect queue and standing behaviours.

use std::collections::VecDeque;

use fivenations_logic::Vec2;
use serde::{Deserialize, Serialize};

use super::EntityId;

/// Ordered effect names in force for one entity; the front one is active.
///
/// An empty queue means the entity is idle. It keeps whatever velocity and
/// facing the last effect left behind until a new order or a reset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectQueue {
    effects: VecDeque<String>,
    /// Coordinates of the movement order in force
    target: Option<Vec2>,
}

impl EffectQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every queued effect and the order target. Idempotent.
    pub fn reset(&mut self) {
        self.effects.clear();
        self.target = None;
    }

    pub fn push(&mut self, name: impl Into<String>) {
        self.effects.push_back(name.into());
    }

    pub fn extend<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.effects.extend(names.into_iter().map(Into::into));
    }

    /// Replace the queue with a fresh movement order towards `target`.
    pub fn issue_movement<I, S>(&mut self, target: Vec2, effects: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reset();
        self.target = Some(target);
        self.extend(effects);
    }

    /// Active effect, if any
    pub fn front(&self) -> Option<&str> {
        self.effects.front().map(String::as_str)
    }

    /// Drop the active effect, returning its name.
    pub fn advance(&mut self) -> Option<String> {
        self.effects.pop_front()
    }

    pub fn is_idle(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn target(&self) -> Option<Vec2> {
        self.target
    }

    pub fn set_target(&mut self, target: Vec2) {
        self.target = Some(target);
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.effects.iter().map(String::as_str)
    }
}

/// Standing order to keep moving towards another entity's live position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follow {
    pub target: EntityId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn front_is_first_pushed() {
        let mut queue = EffectQueue::new();
        queue.push("initMovement");
        queue.push("stopping");
        assert_eq!(queue.front(), Some("initMovement"));
        assert_eq!(queue.advance().as_deref(), Some("initMovement"));
        assert_eq!(queue.front(), Some("stopping"));
        assert_eq!(queue.advance().as_deref(), Some("stopping"));
        assert!(queue.is_idle());
        assert_eq!(queue.advance(), None);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut queue = EffectQueue::new();
        queue.issue_movement(Vec2::new(1.0, 2.0), ["initMovement", "moveToTarget"]);
        queue.reset();
        assert!(queue.is_idle());
        assert_eq!(queue.target(), None);
        queue.reset();
        assert!(queue.is_idle());
    }

    #[test]
    fn issue_movement_replaces_previous_order() {
        let mut queue = EffectQueue::new();
        queue.issue_movement(Vec2::new(1.0, 2.0), ["initMovement", "moveToTarget"]);
        queue.issue_movement(Vec2::new(5.0, 5.0), ["resetMovement"]);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.front(), Some("resetMovement"));
        assert_eq!(queue.target(), Some(Vec2::new(5.0, 5.0)));
    }
}

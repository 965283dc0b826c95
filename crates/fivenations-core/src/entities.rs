//! Entity manager - owns the ECS world and the id index command handlers resolve through.

use std::collections::BTreeMap;

use fivenations_logic::{MotionState, UnitProfile, Vec2};
use hecs::{Entity, World};

use crate::components::{EffectQueue, EntityId, Follow, Position, Unit};
use crate::error::SimError;

/// All simulated units plus what a movement order installs.
pub struct EntityManager {
    /// ECS world containing all entities
    pub world: World,
    /// Producer id -> ECS entity; ordered so per-tick iteration is deterministic
    index: BTreeMap<EntityId, Entity>,
    /// Effect names a movement order installs
    movement_effects: Vec<String>,
}

impl EntityManager {
    pub fn new(movement_effects: Vec<String>) -> Self {
        Self {
            world: World::new(),
            index: BTreeMap::new(),
            movement_effects,
        }
    }

    /// Spawn a unit at `position` with a fresh motion state from `profile`.
    pub fn spawn(
        &mut self,
        id: EntityId,
        unit_type: &str,
        profile: &UnitProfile,
        position: Vec2,
    ) -> Result<Entity, SimError> {
        if self.index.contains_key(&id) {
            return Err(SimError::DuplicateEntity(id));
        }
        let entity = self.world.spawn((
            Unit {
                id,
                unit_type: unit_type.to_string(),
            },
            Position(position),
            MotionState::from_profile(profile),
            EffectQueue::new(),
        ));
        self.index.insert(id, entity);
        Ok(entity)
    }

    /// Remove a unit. Anyone following it drops the order on the next follow pass.
    pub fn despawn(&mut self, id: EntityId) -> Result<(), SimError> {
        let entity = self.index.remove(&id).ok_or(SimError::UnknownEntity(id))?;
        let _ = self.world.despawn(entity);
        Ok(())
    }

    pub fn resolve(&self, id: EntityId) -> Result<Entity, SimError> {
        self.index.get(&id).copied().ok_or(SimError::UnknownEntity(id))
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.index.contains_key(&id)
    }

    /// Ids and ECS handles in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, Entity)> + '_ {
        self.index.iter().map(|(id, entity)| (*id, *entity))
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn movement_effects(&self) -> &[String] {
        &self.movement_effects
    }

    pub fn set_movement_effects(&mut self, effects: Vec<String>) {
        self.movement_effects = effects;
    }

    pub fn position(&self, id: EntityId) -> Option<Vec2> {
        let entity = self.index.get(&id)?;
        self.world.get::<&Position>(*entity).ok().map(|p| p.0)
    }

    pub fn motion(&self, id: EntityId) -> Option<MotionState> {
        let entity = self.index.get(&id)?;
        self.world.get::<&MotionState>(*entity).ok().map(|m| *m)
    }

    pub fn effects(&self, id: EntityId) -> Option<Vec<String>> {
        let entity = self.index.get(&id)?;
        self.world
            .get::<&EffectQueue>(*entity)
            .ok()
            .map(|q| q.iter().map(str::to_string).collect())
    }

    pub fn following(&self, id: EntityId) -> Option<EntityId> {
        let entity = self.index.get(&id)?;
        self.world.get::<&Follow>(*entity).ok().map(|f| f.target)
    }

    /// Clear the entity's queued effects, cancelling whatever order is in progress.
    pub fn reset_activity(&mut self, id: EntityId) -> Result<(), SimError> {
        let entity = self.resolve(id)?;
        if let Ok(mut queue) = self.world.get::<&mut EffectQueue>(entity) {
            queue.reset();
        }
        Ok(())
    }

    /// Replace the entity's queue with a movement order towards `target`.
    pub fn issue_movement(&mut self, id: EntityId, target: Vec2) -> Result<(), SimError> {
        let entity = self.resolve(id)?;
        if let Ok(mut queue) = self.world.get::<&mut EffectQueue>(entity) {
            queue.issue_movement(target, self.movement_effects.iter().cloned());
        }
        Ok(())
    }

    /// Halt: drop any order and queue a single `resetMovement`.
    pub fn halt(&mut self, id: EntityId) -> Result<(), SimError> {
        let entity = self.resolve(id)?;
        let _ = self.world.remove_one::<Follow>(entity);
        if let Ok(mut queue) = self.world.get::<&mut EffectQueue>(entity) {
            queue.reset();
            queue.push(fivenations_logic::Effect::ResetMovement.name());
        }
        Ok(())
    }

    /// Install (or replace) a follow order. Following oneself is ignored.
    pub fn follow(&mut self, id: EntityId, target: EntityId) -> Result<(), SimError> {
        let entity = self.resolve(id)?;
        if id == target {
            return Ok(());
        }
        self.world
            .insert_one(entity, Follow { target })
            .map_err(|_| SimError::UnknownEntity(id))
    }

    pub fn unfollow(&mut self, id: EntityId) -> Result<(), SimError> {
        let entity = self.resolve(id)?;
        let _ = self.world.remove_one::<Follow>(entity);
        Ok(())
    }
}

impl Default for EntityManager {
    fn default() -> Self {
        Self::new(fivenations_logic::effects::movement_sequence())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_with(ids: &[u64]) -> EntityManager {
        let mut manager = EntityManager::default();
        for id in ids {
            manager
                .spawn(EntityId(*id), "drone", &UnitProfile::default(), Vec2::ZERO)
                .unwrap();
        }
        manager
    }

    #[test]
    fn spawn_and_resolve() {
        let manager = manager_with(&[7]);
        assert!(manager.resolve(EntityId(7)).is_ok());
        assert!(matches!(manager.resolve(EntityId(8)), Err(SimError::UnknownEntity(EntityId(8)))));
        assert_eq!(manager.position(EntityId(7)), Some(Vec2::ZERO));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let mut manager = manager_with(&[1]);
        let result = manager.spawn(EntityId(1), "drone", &UnitProfile::default(), Vec2::ZERO);
        assert!(matches!(result, Err(SimError::DuplicateEntity(EntityId(1)))));
    }

    #[test]
    fn iteration_is_by_ascending_id() {
        let manager = manager_with(&[30, 10, 20]);
        let ids: Vec<u64> = manager.iter().map(|(id, _)| id.0).collect();
        assert_eq!(ids, vec![10, 20, 30]);
    }

    #[test]
    fn issue_movement_installs_default_sequence() {
        let mut manager = manager_with(&[1]);
        manager.issue_movement(EntityId(1), Vec2::new(10.0, 0.0)).unwrap();
        let effects = manager.effects(EntityId(1)).unwrap();
        assert_eq!(effects, fivenations_logic::effects::movement_sequence());
    }

    #[test]
    fn halt_leaves_only_reset() {
        let mut manager = manager_with(&[1, 2]);
        manager.follow(EntityId(1), EntityId(2)).unwrap();
        manager.issue_movement(EntityId(1), Vec2::new(10.0, 0.0)).unwrap();
        manager.halt(EntityId(1)).unwrap();
        assert_eq!(manager.effects(EntityId(1)).unwrap(), vec!["resetMovement".to_string()]);
        assert_eq!(manager.following(EntityId(1)), None);
    }

    #[test]
    fn following_self_is_ignored() {
        let mut manager = manager_with(&[1]);
        manager.follow(EntityId(1), EntityId(1)).unwrap();
        assert_eq!(manager.following(EntityId(1)), None);
    }

    #[test]
    fn despawn_removes_from_index() {
        let mut manager = manager_with(&[1]);
        manager.despawn(EntityId(1)).unwrap();
        assert!(!manager.contains(EntityId(1)));
        assert!(manager.is_empty());
        assert!(manager.despawn(EntityId(1)).is_err());
    }
}

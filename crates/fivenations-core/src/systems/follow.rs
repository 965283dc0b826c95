//! Follow system - keeps following entities moving towards their leader's live position

use fivenations_logic::effects::init_movement;
use fivenations_logic::{Effect, MotionContext, MotionState, Vec2};
use log::debug;

use crate::components::{EffectQueue, EntityId, Follow, Position, Unit};
use crate::entities::EntityManager;
use crate::error::SimError;

/// Turn follow orders into movement. Runs after command dispatch and before motion.
///
/// - A follower whose leader is gone stops following and halts.
/// - An idle follower farther than `follow_distance` gets a fresh movement order.
/// - A follower still approaching is re-aimed in place when the leader has
///   moved. One that is braking or resetting gets a fresh order instead;
///   either way it keeps its current speed.
pub fn follow_system(entities: &mut EntityManager, follow_distance: f64) -> Result<(), SimError> {
    let followers: Vec<(EntityId, EntityId)> = entities
        .iter()
        .filter_map(|(id, _)| entities.following(id).map(|leader| (id, leader)))
        .collect();
    let movement_effects = entities.movement_effects().to_vec();

    for (id, leader) in followers {
        let Some(leader_position) = entities.position(leader) else {
            debug!("{} lost its follow target {}", id, leader);
            entities.halt(id)?;
            continue;
        };

        let entity = entities.resolve(id)?;
        let Ok((position, motion, queue)) = entities
            .world
            .query_one_mut::<(&Position, &mut MotionState, &mut EffectQueue)>(entity)
        else {
            continue;
        };

        let far = position.0.distance(&leader_position) > follow_distance;
        if queue.is_idle() {
            if far {
                queue.issue_movement(leader_position, movement_effects.iter().cloned());
            }
        } else if far && queue.target() != Some(leader_position) {
            retarget(motion, queue, position.0, leader_position, &movement_effects);
        }
    }

    Ok(())
}

fn retarget(
    motion: &mut MotionState,
    queue: &mut EffectQueue,
    position: Vec2,
    target: Vec2,
    movement_effects: &[String],
) {
    match queue.front().and_then(Effect::from_name) {
        Some(
            Effect::InitMovement
            | Effect::RotateToTarget
            | Effect::AccelerateToTarget
            | Effect::MoveToTarget,
        ) => {
            queue.set_target(target);
            init_movement(motion, &MotionContext { position, target });
        }
        // initMovement keeps the velocity and rotateToTarget yields while moving
        _ => queue.issue_movement(target, movement_effects.iter().cloned()),
    }
}

/// Followers of `leader`, in ascending id order.
pub fn followers_of(entities: &EntityManager, leader: EntityId) -> Vec<EntityId> {
    let mut query = entities.world.query::<(&Unit, &Follow)>();
    let mut ids: Vec<EntityId> = query
        .iter()
        .filter(|(_, (_, follow))| follow.target == leader)
        .map(|(_, (unit, _))| unit.id)
        .collect();
    ids.sort();
    ids
}

//! Motion system - runs each entity's active effect and integrates its position

use fivenations_logic::integration::integrate;
use fivenations_logic::{EffectRegistry, MotionContext, MotionState};
use log::{debug, trace};

use crate::components::{EffectQueue, Position};
use crate::entities::EntityManager;
use crate::error::SimError;

/// Advance every entity by one tick of `dt` seconds, in ascending id order.
///
/// At most one effect runs per entity. An unknown effect name aborts the
/// pass; entities after the failing one are not ticked.
pub fn motion_system(
    entities: &mut EntityManager,
    effects: &EffectRegistry,
    dt: f64,
) -> Result<(), SimError> {
    // Collect first; the world is borrowed mutably below
    let handles: Vec<_> = entities.iter().collect();

    for (id, entity) in handles {
        let Ok((position, motion, queue)) = entities
            .world
            .query_one_mut::<(&mut Position, &mut MotionState, &mut EffectQueue)>(entity)
        else {
            continue;
        };

        let was_arrived = motion.is_entity_arrived_at_destination;
        let was_stopped = motion.is_entity_stopped_at_destination;

        if let Some(name) = queue.front() {
            let effect = effects.get(name)?;
            let ctx = MotionContext {
                position: position.0,
                target: queue.target().unwrap_or_else(|| motion.movement.target()),
            };
            if !effect(motion, &ctx) {
                trace!("{}: effect {} finished", id, name);
                queue.advance();
            }
        }

        position.0 = integrate(motion, position.0, dt);

        if motion.is_entity_arrived_at_destination && !was_arrived {
            debug!(
                "{} arrived near ({:.1}, {:.1})",
                id, motion.movement.target_x, motion.movement.target_y
            );
        }
        if motion.is_entity_stopped_at_destination && !was_stopped {
            debug!("{} stopped at ({:.1}, {:.1})", id, position.0.x, position.0.y);
        }
    }

    Ok(())
}

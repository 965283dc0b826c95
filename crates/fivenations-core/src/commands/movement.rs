//! `entity/move` and `entity/stop`.

use fivenations_logic::Vec2;
use serde_json::{Map, Value};

use super::{CommandContext, CommandHandler};
use crate::entities::EntityManager;
use crate::error::SimError;

/// Orders every entity in `targets` to move to `data.x`, `data.y`.
///
/// A move replaces any follow order. With `resetActivityQueue` unset the
/// order still replaces the queue, since a movement order is the whole queue.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityMove;

fn coordinates(data: &Map<String, Value>) -> Option<Vec2> {
    let x = data.get("x")?.as_f64()?;
    let y = data.get("y")?.as_f64()?;
    Some(Vec2::new(x, y))
}

impl CommandHandler for EntityMove {
    fn execute(
        &self,
        ctx: &CommandContext<'_>,
        entities: &mut EntityManager,
    ) -> Result<(), SimError> {
        let Some((targets, data)) = ctx.targets_and_data()? else {
            return Ok(());
        };
        let Some(destination) = coordinates(data) else {
            ctx.malformed::<()>("x and y must be numbers")?;
            return Ok(());
        };

        for &id in targets {
            if ctx.reset_activity_queue {
                entities.reset_activity(id)?;
            }
            entities.unfollow(id)?;
            entities.issue_movement(id, destination)?;
        }
        Ok(())
    }
}

/// Halts every entity in `targets` and cancels their follow orders.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityStop;

impl CommandHandler for EntityStop {
    fn execute(
        &self,
        ctx: &CommandContext<'_>,
        entities: &mut EntityManager,
    ) -> Result<(), SimError> {
        let Some(targets) = ctx.targets else {
            ctx.malformed::<()>("targets are required")?;
            return Ok(());
        };
        for &id in targets {
            entities.halt(id)?;
        }
        Ok(())
    }
}

//! `entity/follow` - make each acting entity trail another one.

use super::{entity_id_from_value, CommandContext, CommandHandler};
use crate::entities::EntityManager;
use crate::error::SimError;

/// Installs a follow order on every entity in `targets`.
///
/// `data.targetEntity` names the entity to follow. Without `targets` or
/// `data` the command changes nothing. The follow system turns the order into
/// movement on the next tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityFollow;

impl CommandHandler for EntityFollow {
    fn execute(
        &self,
        ctx: &CommandContext<'_>,
        entities: &mut EntityManager,
    ) -> Result<(), SimError> {
        let Some((targets, data)) = ctx.targets_and_data()? else {
            return Ok(());
        };
        let Some(leader) = data.get("targetEntity").and_then(entity_id_from_value) else {
            ctx.malformed::<()>("targetEntity is missing or not an entity id")?;
            return Ok(());
        };
        entities.resolve(leader)?;

        for &id in targets {
            entities.resolve(id)?;
            if ctx.reset_activity_queue {
                entities.reset_activity(id)?;
            }
            entities.follow(id, leader)?;
        }
        Ok(())
    }
}

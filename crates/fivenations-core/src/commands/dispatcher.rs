//! Dispatcher - drains the command queue once per tick.

use log::{debug, trace, warn};

use super::{CommandContext, CommandQueue, CommandRegistry, LocalNotifier};
use crate::config::MalformedInputPolicy;
use crate::entities::EntityManager;
use crate::error::SimError;

/// Executes queued commands and announces them on the notifier.
pub struct Dispatcher {
    pub registry: CommandRegistry,
    pub notifier: LocalNotifier,
    pub policy: MalformedInputPolicy,
}

impl Dispatcher {
    pub fn new(registry: CommandRegistry, policy: MalformedInputPolicy) -> Self {
        Self {
            registry,
            notifier: LocalNotifier::new(),
            policy,
        }
    }

    /// Drain `queue` completely, returning how many commands executed.
    ///
    /// Commands run in FIFO order. Commands without an id are skipped (or
    /// rejected under `MalformedInputPolicy::Reject`). The first error from
    /// handler resolution or execution is returned immediately; commands
    /// still queued behind it stay queued for the next call.
    pub fn run(
        &mut self,
        queue: &mut CommandQueue,
        entities: &mut EntityManager,
    ) -> Result<usize, SimError> {
        let mut executed = 0;

        while let Some(command) = queue.next() {
            if command.id.is_empty() {
                if self.policy == MalformedInputPolicy::Reject {
                    warn!("Rejecting command without id");
                    return Err(SimError::MalformedCommand {
                        id: String::new(),
                        reason: "missing id",
                    });
                }
                trace!("Skipping command without id");
                continue;
            }

            debug!("Executing: {}", command.id);
            let ctx = CommandContext::from_command(&command, self.policy);
            let result = self
                .registry
                .get(&command.id)
                .and_then(|handler| handler.execute(&ctx, entities));
            if let Err(err) = result {
                warn!("Command {} failed: {}", command.id, err);
                return Err(err);
            }

            self.notifier.dispatch(&command.id);
            executed += 1;
        }

        Ok(executed)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(CommandRegistry::default(), MalformedInputPolicy::default())
    }
}

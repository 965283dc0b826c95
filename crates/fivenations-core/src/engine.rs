//! Simulation engine - owns the world, the command pipeline and the tick loop

use fivenations_logic::{EffectFn, EffectRegistry, MotionState, Vec2};
use log::{debug, info, warn};

use crate::commands::{
    CommandHandler, CommandQueue, CommandRegistry, CommandSender, Dispatcher, LocalNotifier,
};
use crate::components::EntityId;
use crate::config::{SimConfig, UnitCatalog};
use crate::entities::EntityManager;
use crate::error::SimError;
use crate::systems::{follow_system, followers_of, motion_system};

/// Main simulation engine
pub struct SimulationEngine {
    /// Units and their components
    pub entities: EntityManager,
    /// Commands waiting for the next tick
    commands: CommandQueue,
    dispatcher: Dispatcher,
    effects: EffectRegistry,
    catalog: UnitCatalog,
    config: SimConfig,
    tick_count: u64,
}

impl SimulationEngine {
    /// Build an engine with the built-in effects and command handlers.
    ///
    /// Fails if `config.default_movement_effects` names an unknown effect.
    pub fn new(config: SimConfig, catalog: UnitCatalog) -> Result<Self, SimError> {
        let effects = EffectRegistry::with_builtins();
        effects.validate(config.default_movement_effects.iter().map(String::as_str))?;
        info!(
            "Simulation engine ready: {} unit types, {} Hz",
            catalog.len(),
            config.tick_rate
        );

        Ok(Self {
            entities: EntityManager::new(config.default_movement_effects.clone()),
            commands: CommandQueue::new(),
            dispatcher: Dispatcher::new(CommandRegistry::with_builtins(), config.malformed_input),
            effects,
            catalog,
            config,
            tick_count: 0,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn catalog(&self) -> &UnitCatalog {
        &self.catalog
    }

    /// Pending commands; producers on the simulation thread add here.
    pub fn commands(&mut self) -> &mut CommandQueue {
        &mut self.commands
    }

    /// Handle for producers on other threads
    pub fn sender(&self) -> CommandSender {
        self.commands.sender()
    }

    pub fn notifier(&mut self) -> &mut LocalNotifier {
        &mut self.dispatcher.notifier
    }

    /// Add or replace the handler for `id`.
    pub fn register_command(
        &mut self,
        id: impl Into<String>,
        handler: impl CommandHandler + 'static,
    ) {
        self.dispatcher.registry.register(id, handler);
    }

    /// Add or replace an effect, returning the one it replaced.
    pub fn register_effect(
        &mut self,
        name: impl Into<String>,
        effect: EffectFn,
    ) -> Option<EffectFn> {
        self.effects.register(name, effect)
    }

    /// Change the sequence later movement orders install. Every name must be registered.
    pub fn set_movement_effects(&mut self, effects: Vec<String>) -> Result<(), SimError> {
        self.effects.validate(effects.iter().map(String::as_str))?;
        self.config.default_movement_effects = effects.clone();
        self.entities.set_movement_effects(effects);
        Ok(())
    }

    /// Spawn a unit of a catalog type, at rest, facing sector 0.
    pub fn spawn_unit(
        &mut self,
        id: impl Into<EntityId>,
        unit_type: &str,
        position: Vec2,
    ) -> Result<(), SimError> {
        let id = id.into();
        let profile = self
            .catalog
            .get(unit_type)
            .ok_or_else(|| SimError::UnknownUnitType(unit_type.to_string()))?;
        self.entities.spawn(id, unit_type, profile, position)?;
        debug!("Spawned {} {} at ({:.1}, {:.1})", unit_type, id, position.x, position.y);
        Ok(())
    }

    /// Remove a unit. Its followers stop following and halt.
    pub fn despawn(&mut self, id: impl Into<EntityId>) -> Result<(), SimError> {
        let id = id.into();
        self.entities.resolve(id)?;
        for follower in followers_of(&self.entities, id) {
            self.entities.halt(follower)?;
        }
        self.entities.despawn(id)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn motion(&self, id: impl Into<EntityId>) -> Option<MotionState> {
        self.entities.motion(id.into())
    }

    pub fn position(&self, id: impl Into<EntityId>) -> Option<Vec2> {
        self.entities.position(id.into())
    }

    /// Queued effect names, active one first
    pub fn effects(&self, id: impl Into<EntityId>) -> Option<Vec<String>> {
        self.entities.effects(id.into())
    }

    pub fn following(&self, id: impl Into<EntityId>) -> Option<EntityId> {
        self.entities.following(id.into())
    }

    /// Advance the simulation by one tick.
    ///
    /// Order: drain commands, apply follow orders, run effects and integrate.
    /// A failing command stops the drain, but the rest of the tick still runs
    /// before the error is returned.
    pub fn tick(&mut self) -> Result<(), SimError> {
        let dispatched = self.dispatcher.run(&mut self.commands, &mut self.entities);

        let dt = self.config.tick_delta();
        let moved = follow_system(&mut self.entities, self.config.follow_distance)
            .and_then(|()| motion_system(&mut self.entities, &self.effects, dt));
        self.tick_count += 1;

        match (dispatched, moved) {
            (Err(dispatch), Err(motion)) => {
                warn!("Tick {}: motion also failed: {}", self.tick_count, motion);
                Err(dispatch)
            }
            (Err(e), Ok(())) | (Ok(_), Err(e)) => Err(e),
            (Ok(_), Ok(())) => Ok(()),
        }
    }

    /// Run `ticks` ticks, stopping at the first error.
    pub fn run_ticks(&mut self, ticks: u64) -> Result<(), SimError> {
        for _ in 0..ticks {
            self.tick()?;
        }
        Ok(())
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Simulated seconds since start
    pub fn sim_time(&self) -> f64 {
        self.tick_count as f64 * self.config.tick_delta()
    }

    /// Drop every pending command (simulation restart).
    pub fn reset(&mut self) {
        self.commands.reset();
    }
}

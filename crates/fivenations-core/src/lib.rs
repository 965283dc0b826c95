//! Five Nations Core - command dispatch and effect-driven unit motion
//!
//! A deterministic, tick-driven simulation of RTS units. Producers (input,
//! AI, scripts) queue discrete commands; once per tick the engine drains the
//! queue, lets handlers rewrite each unit's effect queue, then runs every
//! unit's active motion effect and integrates its position and facing.
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: Units, addressed by producer-facing [`EntityId`](components::EntityId)s
//! - **Components**: `Position`, `Unit`, `MotionState`, `EffectQueue`, `Follow`
//! - **Systems**: The follow system and the motion system, run after command dispatch
//!
//! The motion rules themselves (effects, sectors, integration) live in
//! `fivenations_logic`.
//!
//! # Example
//!
//! ```rust,no_run
//! use fivenations_core::prelude::*;
//!
//! let catalog = UnitCatalog::from_json(r#"{ "drone": { "max_velocity": 80.0 } }"#)?;
//! let mut engine = SimulationEngine::new(SimConfig::default(), catalog)?;
//! engine.spawn_unit(1u64, "drone", Vec2::ZERO)?;
//!
//! engine.commands().add(
//!     Command::new(ids::ENTITY_MOVE)
//!         .with_targets([1u64])
//!         .with_field("x", 300.0)
//!         .with_field("y", 120.0),
//! );
//!
//! loop {
//!     engine.tick()?; // 60 Hz by default
//! }
//! # Ok::<(), SimError>(())
//! ```

pub mod commands;
pub mod components;
pub mod config;
pub mod engine;
pub mod entities;
pub mod error;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::commands::{
        ids, Command, CommandContext, CommandHandler, CommandQueue, CommandSender, LocalNotifier,
    };
    pub use crate::components::*;
    pub use crate::config::{MalformedInputPolicy, SimConfig, UnitCatalog};
    pub use crate::engine::SimulationEngine;
    pub use crate::error::SimError;
    pub use fivenations_logic::{EffectRegistry, MotionState, UnitProfile, Vec2};
}

//! Component definitions for the ECS simulation.
//!
//! Components are pure data structs attached to entities.
//! They have no behavior - that lives in systems and command handlers.
//! `MotionState` from `fivenations_logic` is attached directly as a component.

mod activity;
mod common;

pub use activity::*;
pub use common::*;

//! Pure motion logic for Five Nations.
//!
//! This crate contains the unit-motion rules that are independent of any
//! ECS, renderer or runtime. Functions take plain data and return results,
//! making them unit-testable and usable from the simulation core, headless
//! tools and tests alike.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`effects`] | The six built-in motion effects and their names |
//! | [`geometry`] | 2D vectors, headings, degree helpers |
//! | [`integration`] | Per-tick velocity, position, distance and facing integration |
//! | [`motion`] | `MotionState`: per-entity movement, rotation and arrival flags |
//! | [`profile`] | Per unit-type motion limits and their validation |
//! | [`registry`] | Effect name to function lookup, extensible |
//! | [`sectors`] | Discrete heading sectors and step counting |

pub mod effects;
pub mod geometry;
pub mod integration;
pub mod motion;
pub mod profile;
pub mod registry;
pub mod sectors;

pub use effects::{Effect, EffectFn};
pub use geometry::Vec2;
pub use motion::{MotionContext, MotionState};
pub use profile::{ProfileError, UnitProfile};
pub use registry::{EffectNotFound, EffectRegistry};

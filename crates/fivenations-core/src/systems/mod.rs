//! Systems - per-tick logic over the entity world

mod follow;
mod motion;

pub use follow::*;
pub use motion::*;

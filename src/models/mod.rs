//! Core data models for the comparison engine.

mod comparison;
mod entity;
mod ids;
mod metric;

pub use comparison::*;
pub use entity::*;
pub use ids::*;
pub use metric::*;

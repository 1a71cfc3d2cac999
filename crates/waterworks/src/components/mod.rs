//! Component definitions for liquid container entities.
//!
//! Components are pure data structs attached to entities in the host world.
//! They have no behavior - that lives in systems.

mod container;
mod production;

pub use container::*;
pub use production::*;

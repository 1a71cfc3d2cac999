//! Systems - logic that operates on container components

mod items;
mod production;
mod reconcile;

pub use items::*;
pub use production::*;
pub use reconcile::*;

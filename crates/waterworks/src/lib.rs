//! WaterWorks - liquid container reconciliation for a game server
//!
//! Rewrites the capacity, production rate and timers of live water entities
//! (barrels, catchers, purifiers, pumps, pools) to match an operator's
//! settings file, and puts the recorded vanilla values back on unload.
//!
//! # Architecture
//!
//! The host game is modelled with an Entity Component System via `hecs`:
//! - **Components**: container data attached to entities (`LiquidContainer`, `WaterPump`, ...)
//! - **Systems**: the reconciler plus the host's own production ticks
//! - **Plugin**: the lifecycle driver that scans, subscribes and reverts
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`components`] | Container, catcher, pump and purifier data |
//! | [`config`] | Operator settings document |
//! | [`kind`] | Entity kind allow-list and classification |
//! | [`persistence`] | Config Store: load, self-heal, save |
//! | [`plugin`] | Lifecycle driver |
//! | [`registry`] | Vanilla defaults captured on first sight |
//! | [`server`] | In-process host: world, timers, network queue |
//! | [`systems`] | Reconciler, item definitions, production ticks |
//! | [`timers`] | Per-entity invocation scheduler |
//!
//! # Example
//!
//! ```rust,no_run
//! use waterworks::prelude::*;
//!
//! let mut server = Server::new();
//! let mut plugin = WaterWorks::new(ConfigStore::new("config/WaterWorks.json"));
//!
//! plugin.load(&mut server);
//! loop {
//!     plugin.update(&mut server, 1.0 / 30.0);
//! }
//! ```

pub mod components;
pub mod config;
pub mod kind;
pub mod persistence;
pub mod plugin;
pub mod registry;
pub mod server;
pub mod systems;
pub mod timers;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::config::Configuration;
    pub use crate::kind::EntityKind;
    pub use crate::persistence::ConfigStore;
    pub use crate::plugin::{LifecycleState, WaterWorks};
    pub use crate::server::Server;
    pub use crate::systems::DesiredState;
}

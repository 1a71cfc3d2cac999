//! Lifecycle driver - the plugin as the host sees it
//!
//! ```text
//! Unloaded --load--> Loading --scan done--> Active --unload--> Unloading --> Unloaded
//! ```
//!
//! Spawn notifications are only honoured while `Active`, which is entered
//! after the initial scan has finished, so an entity is never processed by
//! both the scan and its spawn notification.

use hecs::Entity;

use crate::config::Configuration;
use crate::persistence::ConfigStore;
use crate::registry::DefaultRegistry;
use crate::server::Server;
use crate::systems::{apply_item_definitions, DesiredState, RearmLedger, Reconciler};
use crate::timers::{Firing, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Unloaded,
    Loading,
    Active,
    Unloading,
}

/// The WaterWorks plugin
pub struct WaterWorks {
    state: LifecycleState,
    store: ConfigStore,
    registry: DefaultRegistry,
    rearms: RearmLedger,
}

impl WaterWorks {
    pub fn new(store: ConfigStore) -> Self {
        Self {
            state: LifecycleState::Unloaded,
            store,
            registry: DefaultRegistry::new(),
            rearms: RearmLedger::new(),
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn config(&self) -> &Configuration {
        self.store.config()
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn registry(&self) -> &DefaultRegistry {
        &self.registry
    }

    /// Catcher rearms scheduled but not yet run
    pub fn pending_rearms(&self) -> usize {
        self.rearms.pending()
    }

    /// Load the configuration and apply it to every live container.
    pub fn load(&mut self, server: &mut Server) {
        if self.state != LifecycleState::Unloaded {
            log::warn!("WaterWorks load requested while {:?}", self.state);
            return;
        }

        self.state = LifecycleState::Loading;
        self.store.load();

        let handled = self.scan(server, DesiredState::Configured);
        apply_item_definitions(
            &mut server.items,
            &mut self.registry,
            self.store.config(),
            DesiredState::Configured,
        );

        self.state = LifecycleState::Active;
        log::info!("WaterWorks loaded, configured {} containers", handled);
    }

    /// Host notification: a new entity was spawned.
    pub fn on_entity_spawned(&mut self, server: &mut Server, entity: Entity) {
        if self.state != LifecycleState::Active {
            return;
        }
        self.reconciler(server).apply(entity, DesiredState::Configured);
    }

    /// Host notification: a plugin timer fired.
    pub fn on_timer(&mut self, server: &mut Server, firing: Firing) {
        if let Task::RearmCatcher { generation, state } = firing.task {
            self.reconciler(server)
                .rearm_catcher(firing.entity, generation, state);
        }
    }

    /// Advance the host by `dt` seconds and dispatch plugin timers.
    pub fn update(&mut self, server: &mut Server, dt: f32) {
        for firing in server.update(dt) {
            self.on_timer(server, firing);
        }
        // Despawning drops the pending one-shot, so its callback never completes the entry
        self.rearms.retain(|entity| server.is_alive(entity));
    }

    /// Re-read the settings file and re-apply it to every live container.
    pub fn reload(&mut self, server: &mut Server) {
        if self.state != LifecycleState::Active {
            log::warn!("WaterWorks reload requested while {:?}", self.state);
            return;
        }

        self.state = LifecycleState::Loading;
        self.store.reload();
        let handled = self.scan(server, DesiredState::Configured);
        apply_item_definitions(
            &mut server.items,
            &mut self.registry,
            self.store.config(),
            DesiredState::Configured,
        );
        self.state = LifecycleState::Active;

        log::info!("WaterWorks reloaded, configured {} containers", handled);
    }

    /// Stop the plugin, reverting containers if the settings ask for it.
    ///
    /// Nothing is reverted while the host itself is shutting down, since the
    /// deferred catcher rearm would never get to run.
    pub fn unload(&mut self, server: &mut Server) {
        if self.state != LifecycleState::Active {
            return;
        }
        self.state = LifecycleState::Unloading;

        let reset = self.store.config().settings.reset_on_unload;
        if reset && !server.is_shutting_down() {
            let handled = self.scan(server, DesiredState::Vanilla);
            apply_item_definitions(
                &mut server.items,
                &mut self.registry,
                self.store.config(),
                DesiredState::Vanilla,
            );
            log::info!("WaterWorks unloaded, reverted {} containers", handled);
        } else {
            log::info!("WaterWorks unloaded, containers left as configured");
        }

        self.state = LifecycleState::Unloaded;
    }

    /// Reconcile every live container. Returns how many were handled.
    fn scan(&mut self, server: &mut Server, state: DesiredState) -> usize {
        let containers = server.live_containers();
        let mut reconciler = self.reconciler(server);
        containers
            .into_iter()
            .filter(|entity| reconciler.apply(*entity, state).is_some())
            .count()
    }

    fn reconciler<'a>(&'a mut self, server: &'a mut Server) -> Reconciler<'a> {
        Reconciler::new(
            server,
            &mut self.registry,
            self.store.config(),
            &mut self.rearms,
        )
    }
}

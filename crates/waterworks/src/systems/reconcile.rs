//! Reconciler - rewrites a container's attributes to match the configuration
//!
//! Each call classifies the entity, captures its vanilla snapshot if this is
//! the first time its prefab is seen, then runs exactly one kind handler.
//!
//! A configured value of `0` means "leave this attribute alone". The
//! capacity-only kinds (barrels, purifiers, pools, modded containers) honour
//! that in both directions, so a zeroed knob also skips the revert. Catchers
//! and pumps restore every attribute from the snapshot on revert regardless
//! of their knobs.

use std::collections::HashMap;

use hecs::Entity;

use crate::components::{LiquidContainer, Prefab, WaterCatcher, WaterPump, WaterPurifier};
use crate::config::{CatcherSettings, Configuration};
use crate::kind::{classify, EntityKind};
use crate::registry::{DefaultRegistry, DefaultSnapshot};
use crate::server::{Server, VANILLA_COLLECT_JITTER};
use crate::timers::Task;

/// Seconds between a catcher update and its timer rearm, so the host
/// finishes initializing a freshly spawned catcher first
pub const CATCHER_REARM_DELAY: f32 = 0.1;

/// Pump timers wander by this fraction of their interval
pub const PUMP_JITTER_FRACTION: f32 = 0.1;

/// Which values a container should end up with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DesiredState {
    /// Operator configuration
    Configured,
    /// Recorded defaults
    Vanilla,
}

/// Latest rearm generation issued per catcher.
///
/// Only the newest scheduled rearm for an entity is allowed to act; older
/// ones fire as no-ops.
#[derive(Debug, Clone, Default)]
pub struct RearmLedger {
    next: u64,
    pending: HashMap<Entity, u64>,
}

impl RearmLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new generation for `entity`, superseding any pending one
    pub fn issue(&mut self, entity: Entity) -> u64 {
        self.next += 1;
        self.pending.insert(entity, self.next);
        self.next
    }

    pub fn is_current(&self, entity: Entity, generation: u64) -> bool {
        self.pending.get(&entity) == Some(&generation)
    }

    /// Consume the pending generation. Returns false if it was stale.
    pub fn complete(&mut self, entity: Entity, generation: u64) -> bool {
        if self.is_current(entity, generation) {
            self.pending.remove(&entity);
            true
        } else {
            false
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Forget entities whose rearm can no longer fire, e.g. despawned ones
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(Entity) -> bool,
    {
        self.pending.retain(|entity, _| keep(*entity));
    }
}

/// Borrowed state a reconciliation pass needs
pub struct Reconciler<'a> {
    pub server: &'a mut Server,
    pub registry: &'a mut DefaultRegistry,
    pub config: &'a Configuration,
    pub rearms: &'a mut RearmLedger,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        server: &'a mut Server,
        registry: &'a mut DefaultRegistry,
        config: &'a Configuration,
        rearms: &'a mut RearmLedger,
    ) -> Self {
        Self {
            server,
            registry,
            config,
            rearms,
        }
    }

    /// Bring one entity to `state`.
    ///
    /// Returns the kind that was handled, or `None` for despawned entities
    /// and kinds outside the allow-list.
    pub fn apply(&mut self, entity: Entity, state: DesiredState) -> Option<EntityKind> {
        let kind = classify(&self.server.world, entity, self.config)?;
        let snapshot = self.capture(entity)?;

        log::debug!("Reconciling {} {:?} to {:?}", kind.label(), entity, state);

        match &kind {
            EntityKind::Barrel => {
                self.update_capacity(entity, self.config.barrel.capacity, &snapshot, state)
            }
            EntityKind::PoweredPurifier => self.update_capacity(
                entity,
                self.config.powered_purifier.capacity,
                &snapshot,
                state,
            ),
            EntityKind::GroundPool => {
                self.update_capacity(entity, self.config.ground_pool.capacity, &snapshot, state)
            }
            EntityKind::BigGroundPool => self.update_capacity(
                entity,
                self.config.big_ground_pool.capacity,
                &snapshot,
                state,
            ),
            EntityKind::ModdedContainer(short_name) => {
                let configured = self.config.modded_capacity(short_name);
                self.update_capacity(entity, configured, &snapshot, state)
            }
            EntityKind::UnpoweredPurifier => self.update_purifier(entity, &snapshot, state),
            EntityKind::SmallCatcher => {
                self.update_catcher(entity, self.config.small_catcher, &snapshot, state)
            }
            EntityKind::LargeCatcher => {
                self.update_catcher(entity, self.config.large_catcher, &snapshot, state)
            }
            EntityKind::Pump => self.update_pump(entity, &snapshot, state),
        }

        Some(kind)
    }

    /// Run a deferred catcher rearm.
    ///
    /// No-op when the entity is gone, the generation was superseded, or the
    /// entity is no longer a catcher.
    pub fn rearm_catcher(&mut self, entity: Entity, generation: u64, state: DesiredState) {
        if !self.server.is_alive(entity) {
            self.rearms.complete(entity, generation);
            return;
        }
        if !self.rearms.complete(entity, generation) {
            log::debug!("Dropping stale catcher rearm {} for {:?}", generation, entity);
            return;
        }

        let settings = match classify(&self.server.world, entity, self.config) {
            Some(EntityKind::SmallCatcher) => self.config.small_catcher,
            Some(EntityKind::LargeCatcher) => self.config.large_catcher,
            _ => return,
        };

        match state {
            DesiredState::Configured => {
                if settings.interval <= 0.0 {
                    return;
                }
                self.server.scheduler.cancel(entity, Task::CollectWater);
                self.server.scheduler.invoke_repeating(
                    entity,
                    Task::CollectWater,
                    settings.interval,
                    settings.interval,
                );
            }
            DesiredState::Vanilla => {
                let Some(interval) = self.snapshot_of(entity).map(|s| s.interval) else {
                    return;
                };
                self.server.scheduler.cancel(entity, Task::CollectWater);
                self.server.scheduler.invoke_randomized(
                    entity,
                    Task::CollectWater,
                    interval,
                    interval,
                    VANILLA_COLLECT_JITTER,
                );
            }
        }
    }

    fn snapshot_of(&self, entity: Entity) -> Option<DefaultSnapshot> {
        let prefab = self.server.world.get::<&Prefab>(entity).ok()?;
        self.registry.get(prefab.id).copied()
    }

    /// Snapshot for the entity's prefab, read from the live entity on first sight
    fn capture(&mut self, entity: Entity) -> Option<DefaultSnapshot> {
        let world = &self.server.world;
        let prefab_id = world.get::<&Prefab>(entity).ok()?.id;

        Some(self.registry.capture(prefab_id, || {
            let mut snapshot = DefaultSnapshot::default();
            if let Ok(container) = world.get::<&LiquidContainer>(entity) {
                snapshot.capacity = container.capacity();
            }
            if let Ok(catcher) = world.get::<&WaterCatcher>(entity) {
                snapshot.interval = catcher.collect_interval;
                snapshot.max_item_to_create = catcher.max_item_to_create;
            }
            if let Ok(pump) = world.get::<&WaterPump>(entity) {
                snapshot.interval = pump.pump_interval;
                snapshot.amount = pump.amount_per_pump as f32;
            }
            if let Ok(purifier) = world.get::<&WaterPurifier>(entity) {
                snapshot.water_storage_capacity = purifier.water_storage_capacity;
            }
            snapshot
        }))
    }

    /// Set capacity, clamp, mark dirty, resync. Skipped when `configured` is inactive.
    fn update_capacity(
        &mut self,
        entity: Entity,
        configured: i32,
        snapshot: &DefaultSnapshot,
        state: DesiredState,
    ) {
        if configured <= 0 {
            return;
        }
        let capacity = match state {
            DesiredState::Configured => configured,
            DesiredState::Vanilla => snapshot.capacity,
        };

        {
            let Ok(mut container) = self.server.world.get::<&mut LiquidContainer>(entity) else {
                return;
            };
            container.set_capacity(capacity);
            container.mark_dirty();
        }
        self.server.network.send_immediate(entity);
    }

    fn update_purifier(&mut self, entity: Entity, snapshot: &DefaultSnapshot, state: DesiredState) {
        let configured = self.config.purifier.capacity;

        if let Ok(mut purifier) = self.server.world.get::<&mut WaterPurifier>(entity) {
            purifier.stop_when_output_full = true;
            if configured > 0 {
                purifier.water_storage_capacity = match state {
                    DesiredState::Configured => configured,
                    DesiredState::Vanilla => snapshot.water_storage_capacity,
                };
            }
        }

        self.update_capacity(entity, configured, snapshot, state);
    }

    fn update_catcher(
        &mut self,
        entity: Entity,
        settings: CatcherSettings,
        snapshot: &DefaultSnapshot,
        state: DesiredState,
    ) {
        let (capacity, max_item_to_create, rearm) = match state {
            DesiredState::Configured => (
                (settings.stack_size > 0).then_some(settings.stack_size),
                (settings.max_item_to_create > 0.0).then_some(settings.max_item_to_create),
                settings.interval > 0.0,
            ),
            DesiredState::Vanilla => (
                Some(snapshot.capacity),
                Some(snapshot.max_item_to_create),
                true,
            ),
        };

        {
            let Ok((container, catcher)) = self
                .server
                .world
                .query_one_mut::<(&mut LiquidContainer, &mut WaterCatcher)>(entity)
            else {
                return;
            };
            match capacity {
                Some(capacity) => container.set_capacity(capacity),
                None => {
                    container.inventory.clamp_to_capacity();
                }
            }
            if let Some(max_item_to_create) = max_item_to_create {
                catcher.max_item_to_create = max_item_to_create;
            }
            container.mark_dirty();
        }
        self.server.network.send_immediate(entity);

        if rearm {
            self.server.scheduler.cancel(
                entity,
                Task::RearmCatcher {
                    generation: 0,
                    state,
                },
            );
            let generation = self.rearms.issue(entity);
            self.server.scheduler.invoke(
                entity,
                Task::RearmCatcher { generation, state },
                CATCHER_REARM_DELAY,
            );
        }
    }

    fn update_pump(&mut self, entity: Entity, snapshot: &DefaultSnapshot, state: DesiredState) {
        let settings = self.config.pump;

        let (interval, powered) = {
            let Ok((container, pump)) = self
                .server
                .world
                .query_one_mut::<(&mut LiquidContainer, &mut WaterPump)>(entity)
            else {
                return;
            };

            match state {
                DesiredState::Configured => {
                    if settings.capacity > 0 {
                        container.set_capacity(settings.capacity);
                    } else {
                        container.inventory.clamp_to_capacity();
                    }
                    if settings.interval > 0.0 {
                        pump.pump_interval = settings.interval;
                    }
                    if settings.amount > 0 {
                        pump.amount_per_pump = settings.amount;
                    }
                }
                DesiredState::Vanilla => {
                    container.set_capacity(snapshot.capacity);
                    pump.pump_interval = snapshot.interval;
                    pump.amount_per_pump = snapshot.amount.round() as i32;
                }
            }
            container.mark_dirty();
            (pump.pump_interval, pump.powered)
        };
        self.server.network.send_immediate(entity);

        self.server.scheduler.cancel(entity, Task::CreateWater);
        if !powered {
            return;
        }
        self.server.scheduler.invoke_randomized(
            entity,
            Task::CreateWater,
            interval,
            interval,
            interval * PUMP_JITTER_FRACTION,
        );
    }
}

//! In-process host - the game server the plugin runs inside
//!
//! Owns the entity world and the host services the plugin talks to:
//! timers, network updates, weather and item definitions.

use hecs::{Entity, World};

use crate::components::*;
use crate::systems::{collect_water, create_water};
use crate::timers::{Firing, Scheduler, Task};

/// Vanilla collection timer used by the host for freshly spawned catchers
pub const VANILLA_COLLECT_JITTER: f32 = 6.0;

/// Queue of "send network update immediately" requests
#[derive(Debug, Clone, Default)]
pub struct NetworkQueue {
    sent: Vec<Entity>,
}

impl NetworkQueue {
    pub fn send_immediate(&mut self, entity: Entity) {
        self.sent.push(entity);
    }

    pub fn sent(&self) -> &[Entity] {
        &self.sent
    }

    pub fn count_for(&self, entity: Entity) -> usize {
        self.sent.iter().filter(|e| **e == entity).count()
    }

    pub fn drain(&mut self) -> Vec<Entity> {
        std::mem::take(&mut self.sent)
    }
}

/// Climate values sampled by water catchers (each 0-1)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Weather {
    pub fog: f32,
    pub rain: f32,
    pub snow: f32,
}

/// Stack capacity of item definitions that hold water
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDefinitions {
    pub water_jug: Option<i32>,
    pub water_bucket: Option<i32>,
    /// The liquid item itself
    pub water: Option<i32>,
}

impl Default for ItemDefinitions {
    fn default() -> Self {
        Self {
            water_jug: Some(5000),
            water_bucket: Some(2000),
            water: Some(249_999),
        }
    }
}

/// The host game server
pub struct Server {
    /// ECS world containing all live entities
    pub world: World,
    pub scheduler: Scheduler,
    pub network: NetworkQueue,
    pub weather: Weather,
    pub items: ItemDefinitions,
    shutting_down: bool,
}

impl Server {
    pub fn new() -> Self {
        Self::with_scheduler(Scheduler::new())
    }

    /// Server with deterministic timer jitter
    pub fn seeded(seed: u64) -> Self {
        Self::with_scheduler(Scheduler::seeded(seed))
    }

    fn with_scheduler(scheduler: Scheduler) -> Self {
        Self {
            world: World::new(),
            scheduler,
            network: NetworkQueue::default(),
            weather: Weather::default(),
            items: ItemDefinitions::default(),
            shutting_down: false,
        }
    }

    /// Spawn a container with the kind components given, arming the host's own
    /// production timers the way a fresh entity gets them.
    pub fn spawn_container(
        &mut self,
        prefab: Prefab,
        container: LiquidContainer,
        bundle: impl hecs::DynamicBundle,
    ) -> Entity {
        let entity = self.world.spawn(bundle);
        // Prefab and container go in after the kind bundle so callers can pass ()
        let _ = self.world.insert(entity, (prefab, container));

        let catcher_interval = self
            .world
            .get::<&WaterCatcher>(entity)
            .ok()
            .map(|c| c.collect_interval);
        let pump = self
            .world
            .get::<&WaterPump>(entity)
            .ok()
            .map(|p| (p.pump_interval, p.powered));

        if let Some(interval) = catcher_interval {
            self.scheduler.invoke_randomized(
                entity,
                Task::CollectWater,
                interval,
                interval,
                VANILLA_COLLECT_JITTER,
            );
        }
        if let Some((interval, true)) = pump {
            self.scheduler.invoke_randomized(
                entity,
                Task::CreateWater,
                interval,
                interval,
                interval * 0.1,
            );
        }

        entity
    }

    /// Destroy an entity and every timer it owns
    pub fn despawn(&mut self, entity: Entity) -> bool {
        self.scheduler.cancel_all(entity);
        self.world.despawn(entity).is_ok()
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.world.contains(entity)
    }

    /// Every live entity that is a liquid container
    pub fn live_containers(&self) -> Vec<Entity> {
        self.world
            .query::<&LiquidContainer>()
            .iter()
            .map(|(entity, _)| entity)
            .collect()
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down
    }

    /// Mark the host as going down; plugins unloaded after this skip deferred work
    pub fn begin_shutdown(&mut self) {
        self.shutting_down = true;
    }

    pub fn now(&self) -> f64 {
        self.scheduler.now()
    }

    /// Advance the clock by `dt` seconds.
    ///
    /// Host production tasks run here; plugin callbacks that came due are
    /// returned for the caller to dispatch.
    pub fn update(&mut self, dt: f32) -> Vec<Firing> {
        let mut callbacks = Vec::new();

        for firing in self.scheduler.advance(dt) {
            if !self.world.contains(firing.entity) {
                continue;
            }
            match firing.task {
                Task::CollectWater => collect_water(&mut self.world, firing.entity, self.weather),
                Task::CreateWater => create_water(&mut self.world, firing.entity),
                Task::RearmCatcher { .. } => callbacks.push(firing),
            }
        }

        callbacks
    }

    pub fn capacity(&self, entity: Entity) -> Option<i32> {
        self.world
            .get::<&LiquidContainer>(entity)
            .ok()
            .map(|c| c.capacity())
    }

    pub fn stored(&self, entity: Entity) -> Option<i32> {
        self.world
            .get::<&LiquidContainer>(entity)
            .ok()
            .map(|c| c.stored())
    }
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}

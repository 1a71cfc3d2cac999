//! Integration tests for the full plugin lifecycle.
//!
//! Exercises: ConfigStore → scan (Configured) → spawn notifications
//! → host timers → unload (Vanilla)
//!
//! Everything runs against the in-process host; no game server needed.

use std::fs;

use hecs::Entity;
use waterworks::config::CatcherSettings;
use waterworks::kind::{
    BARREL_PREFAB, BIG_GROUND_POOL_SHORTNAME, GROUND_POOL_SHORTNAME, LARGE_CATCHER_PREFAB,
    POWERED_PURIFIER_PREFAB, UNPOWERED_PURIFIER_PREFAB,
};
use waterworks::prelude::*;
use waterworks::server::ItemDefinitions;
use waterworks::timers::{Repeat, Task};

// ── Helpers ────────────────────────────────────────────────────────────

const SMALL_CATCHER_PREFAB: PrefabId = 1_830_501_457;
const PUMP_PREFAB: PrefabId = 3_234_260_181;

/// Vanilla values of every container spawned by `populate`
#[derive(Debug, Clone, PartialEq)]
struct Observed {
    capacity: i32,
    stored: i32,
    interval: Option<f32>,
    amount: Option<f32>,
    water_storage: Option<i32>,
}

fn observe(server: &Server, entity: Entity) -> Observed {
    let container = server.world.get::<&LiquidContainer>(entity).unwrap();
    let catcher = server.world.get::<&WaterCatcher>(entity).ok();
    let pump = server.world.get::<&WaterPump>(entity).ok();
    let purifier = server.world.get::<&WaterPurifier>(entity).ok();
    Observed {
        capacity: container.capacity(),
        stored: container.stored(),
        interval: pump.as_ref().map(|p| p.pump_interval),
        amount: catcher
            .map(|c| c.max_item_to_create)
            .or(pump.map(|p| p.amount_per_pump as f32)),
        water_storage: purifier.map(|p| p.water_storage_capacity),
    }
}

fn populate(server: &mut Server) -> Vec<Entity> {
    vec![
        server.spawn_container(
            Prefab::new(BARREL_PREFAB, "water.barrel"),
            LiquidContainer::new(20_000).with_amount(15_000),
            (),
        ),
        server.spawn_container(
            Prefab::new(POWERED_PURIFIER_PREFAB, "powered.water.purifier.deployed"),
            LiquidContainer::new(5_000).with_amount(4_000),
            (WaterPurifier::new(5_000),),
        ),
        server.spawn_container(
            Prefab::new(UNPOWERED_PURIFIER_PREFAB, "water.purifier.deployed"),
            LiquidContainer::new(5_000),
            (WaterPurifier::new(2_000),),
        ),
        server.spawn_container(
            Prefab::new(SMALL_CATCHER_PREFAB, "water.catcher.small"),
            LiquidContainer::new(10_000).with_amount(9_000),
            (WaterCatcher::new(10.0, 60.0),),
        ),
        server.spawn_container(
            Prefab::new(LARGE_CATCHER_PREFAB, "water.catcher.large"),
            LiquidContainer::new(50_000),
            (WaterCatcher::new(30.0, 60.0),),
        ),
        server.spawn_container(
            Prefab::new(PUMP_PREFAB, "water.pump"),
            LiquidContainer::new(2_000).with_amount(1_500),
            (WaterPump::new(20.0, 30),),
        ),
        server.spawn_container(
            Prefab::new(20, GROUND_POOL_SHORTNAME),
            LiquidContainer::new(500),
            (),
        ),
        server.spawn_container(
            Prefab::new(21, BIG_GROUND_POOL_SHORTNAME),
            LiquidContainer::new(2_000),
            (),
        ),
        server.spawn_container(
            Prefab::new(22, "fridge.water"),
            LiquidContainer::new(1_000),
            (),
        ),
    ]
}

fn plugin_with(dir: &tempfile::TempDir, config: &Configuration) -> WaterWorks {
    let path = dir.path().join("WaterWorks.json");
    fs::write(&path, serde_json::to_string_pretty(config).unwrap()).unwrap();
    WaterWorks::new(ConfigStore::new(path))
}

fn full_config() -> Configuration {
    let mut config = Configuration::default();
    config.modded.insert("fridge.water".into(), 4_000);
    config
}

// ── Round trip ─────────────────────────────────────────────────────────

#[test]
fn test_configure_then_revert_restores_every_kind() {
    let dir = tempfile::tempdir().unwrap();
    let mut server = Server::seeded(11);
    let entities = populate(&mut server);
    let before: Vec<Observed> = entities.iter().map(|e| observe(&server, *e)).collect();

    let mut plugin = plugin_with(&dir, &full_config());
    plugin.load(&mut server);
    plugin.update(&mut server, 1.0);

    for (entity, vanilla) in entities.iter().zip(&before) {
        assert_ne!(
            observe(&server, *entity).capacity,
            vanilla.capacity,
            "{:?} was not configured",
            entity
        );
    }

    plugin.unload(&mut server);
    plugin.update(&mut server, 1.0);

    for (entity, vanilla) in entities.iter().zip(&before) {
        let after = observe(&server, *entity);
        assert_eq!(after.capacity, vanilla.capacity, "{:?}", entity);
        assert_eq!(after.interval, vanilla.interval, "{:?}", entity);
        assert_eq!(after.amount, vanilla.amount, "{:?}", entity);
        assert_eq!(after.water_storage, vanilla.water_storage, "{:?}", entity);
    }
    assert_eq!(server.items, ItemDefinitions::default());

    // Catchers are back on the randomized vanilla timer
    let small = entities[3];
    assert!(matches!(
        server.scheduler.find(small, Task::CollectWater).unwrap().repeat,
        Repeat::Randomized { interval, .. } if interval == 60.0
    ));
}

#[test]
fn test_stored_never_exceeds_capacity() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = full_config();
    config.barrel.capacity = 5_000;
    config.powered_purifier.capacity = 1_000;
    config.small_catcher.stack_size = 2_000;
    config.pump.capacity = 100;

    let mut server = Server::seeded(5);
    let entities = populate(&mut server);
    let mut plugin = plugin_with(&dir, &config);

    plugin.load(&mut server);
    for _ in 0..120 {
        plugin.update(&mut server, 1.0);
    }

    for entity in &entities {
        let o = observe(&server, *entity);
        assert!(o.stored <= o.capacity, "{:?}: {:?}", entity, o);
    }
    assert_eq!(server.stored(entities[0]), Some(5_000));
    assert_eq!(server.stored(entities[5]), Some(100));
}

// ── Zero means untouched ──────────────────────────────────────────────

#[test]
fn test_zero_config_leaves_capacities_alone() {
    let dir = tempfile::tempdir().unwrap();
    let config: Configuration = serde_json::from_str("{}").unwrap();

    let mut server = Server::seeded(2);
    let entities = populate(&mut server);
    let before: Vec<Observed> = entities.iter().map(|e| observe(&server, *e)).collect();

    let mut plugin = plugin_with(&dir, &config);
    plugin.load(&mut server);
    plugin.update(&mut server, 1.0);

    for (entity, vanilla) in entities.iter().zip(&before) {
        assert_eq!(observe(&server, *entity).capacity, vanilla.capacity);
    }
}

// ── Catchers ──────────────────────────────────────────────────────────

#[test]
fn test_small_catcher_fixed_interval_and_production() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Configuration::default();
    config.small_catcher = CatcherSettings {
        stack_size: 0,
        max_item_to_create: 20.0,
        interval: 30.0,
    };

    let mut server = Server::seeded(9);
    let catcher = server.spawn_container(
        Prefab::new(SMALL_CATCHER_PREFAB, "water.catcher.small"),
        LiquidContainer::new(10_000),
        (WaterCatcher::new(10.0, 60.0),),
    );
    let mut plugin = plugin_with(&dir, &config);
    plugin.load(&mut server);

    // Rearm lands, then two fixed 30s collections: 2 * ceil(20 * 0.25) = 10
    plugin.update(&mut server, 0.5);
    plugin.update(&mut server, 61.0);

    assert_eq!(server.capacity(catcher), Some(10_000));
    assert_eq!(server.stored(catcher), Some(10));
    assert_eq!(
        server.scheduler.find(catcher, Task::CollectWater).unwrap().repeat,
        Repeat::Fixed { interval: 30.0 }
    );
}

#[test]
fn test_catcher_destroyed_before_rearm() {
    let dir = tempfile::tempdir().unwrap();
    let mut server = Server::seeded(4);
    let catcher = server.spawn_container(
        Prefab::new(SMALL_CATCHER_PREFAB, "water.catcher.small"),
        LiquidContainer::new(10_000),
        (WaterCatcher::new(10.0, 60.0),),
    );
    let mut plugin = plugin_with(&dir, &Configuration::default());
    plugin.load(&mut server);

    server.despawn(catcher);
    plugin.update(&mut server, 1.0);

    assert!(server.scheduler.is_empty());
    assert_eq!(plugin.pending_rearms(), 0);
}

#[test]
fn test_catcher_churn_leaves_no_pending_rearms() {
    let dir = tempfile::tempdir().unwrap();
    let mut server = Server::seeded(4);
    let mut plugin = plugin_with(&dir, &Configuration::default());
    plugin.load(&mut server);

    for _ in 0..50 {
        let catcher = server.spawn_container(
            Prefab::new(SMALL_CATCHER_PREFAB, "water.catcher.small"),
            LiquidContainer::new(10_000),
            (WaterCatcher::new(10.0, 60.0),),
        );
        plugin.on_entity_spawned(&mut server, catcher);
        server.despawn(catcher);
    }
    plugin.update(&mut server, 5.0);

    assert_eq!(plugin.pending_rearms(), 0);
    assert!(server.scheduler.is_empty());
}

#[test]
fn test_spawned_catcher_rearmed_once() {
    let dir = tempfile::tempdir().unwrap();
    let mut server = Server::seeded(4);
    let mut plugin = plugin_with(&dir, &Configuration::default());
    plugin.load(&mut server);

    let catcher = server.spawn_container(
        Prefab::new(SMALL_CATCHER_PREFAB, "water.catcher.small"),
        LiquidContainer::new(10_000),
        (WaterCatcher::new(10.0, 60.0),),
    );
    // Same-tick re-entrant notification: only the newest rearm acts
    plugin.on_entity_spawned(&mut server, catcher);
    plugin.on_entity_spawned(&mut server, catcher);
    plugin.update(&mut server, 1.0);

    assert_eq!(server.capacity(catcher), Some(50_000));
    assert_eq!(server.scheduler.len(), 1);
    assert_eq!(
        server.scheduler.find(catcher, Task::CollectWater).unwrap().repeat,
        Repeat::Fixed { interval: 20.0 }
    );
}

// ── Pumps ─────────────────────────────────────────────────────────────

#[test]
fn test_unpowered_pump_configured_without_timer() {
    let dir = tempfile::tempdir().unwrap();
    let mut server = Server::seeded(8);
    let pump = server.spawn_container(
        Prefab::new(PUMP_PREFAB, "water.pump"),
        LiquidContainer::new(2_000),
        (WaterPump::new(20.0, 30).unpowered(),),
    );
    let mut config = Configuration::default();
    config.pump.amount = 85;
    config.pump.interval = 10.0;
    let mut plugin = plugin_with(&dir, &config);

    plugin.load(&mut server);
    plugin.update(&mut server, 60.0);

    let state = (*server.world.get::<&WaterPump>(pump).unwrap()).clone();
    assert_eq!(state.amount_per_pump, 85);
    assert_eq!(state.pump_interval, 10.0);
    assert_eq!(server.capacity(pump), Some(10_000));
    assert!(!server.scheduler.is_invoking(pump, Task::CreateWater));
    assert_eq!(server.stored(pump), Some(0));
}

// ── Config store ──────────────────────────────────────────────────────

#[test]
fn test_malformed_config_falls_back_and_heals() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("WaterWorks.json");
    fs::write(&path, "{ not json").unwrap();

    let mut server = Server::seeded(1);
    let barrel = server.spawn_container(
        Prefab::new(BARREL_PREFAB, "water.barrel"),
        LiquidContainer::new(20_000),
        (),
    );
    let mut plugin = WaterWorks::new(ConfigStore::new(&path));
    plugin.load(&mut server);

    assert_eq!(plugin.state(), LifecycleState::Active);
    assert_eq!(plugin.config(), &Configuration::default());
    assert_eq!(server.capacity(barrel), Some(100_000));

    let mut second = ConfigStore::new(&path);
    assert_eq!(second.load(), &Configuration::default());
}

#[test]
fn test_unload_without_reset_reverts_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = full_config();
    config.settings.reset_on_unload = false;

    let mut server = Server::seeded(3);
    let entities = populate(&mut server);
    let mut plugin = plugin_with(&dir, &config);
    plugin.load(&mut server);
    plugin.update(&mut server, 1.0);
    let configured: Vec<Observed> = entities.iter().map(|e| observe(&server, *e)).collect();

    plugin.unload(&mut server);
    plugin.update(&mut server, 1.0);

    for (entity, expected) in entities.iter().zip(&configured) {
        assert_eq!(observe(&server, *entity).capacity, expected.capacity);
    }
    assert!(!plugin.registry().is_empty());
    assert_eq!(server.items.water_jug, Some(25_000));
}

//! WaterWorks Headless Scenario Harness
//!
//! Runs the plugin against the in-process host and checks the behaviours an
//! operator relies on. No game server, no networking.
//!
//! Usage:
//!   cargo run -p waterworks-simtest
//!   cargo run -p waterworks-simtest -- --verbose

use std::fs;
use std::path::{Path, PathBuf};

use hecs::Entity;
use waterworks::config::CatcherSettings;
use waterworks::kind::{BARREL_PREFAB, UNPOWERED_PURIFIER_PREFAB};
use waterworks::prelude::*;
use waterworks::timers::{Repeat, Task};

const SMALL_CATCHER_PREFAB: PrefabId = 1_830_501_457;
const PUMP_PREFAB: PrefabId = 3_234_260_181;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: String) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail,
    }
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== WaterWorks Scenario Harness ===\n");

    let dir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("cannot create scratch directory: {}", e);
            std::process::exit(1);
        }
    };

    let mut results = Vec::new();

    // 1. Barrel capacity and clamping
    results.extend(validate_barrel(dir.path()));

    // 2. Catcher timers
    results.extend(validate_small_catcher(dir.path()));

    // 3. Pumps without power
    results.extend(validate_unpowered_pump(dir.path()));

    // 4. Config self-heal
    results.extend(validate_config_store(dir.path()));

    // 5. Unload behaviour
    results.extend(validate_unload(dir.path()));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn plugin_with(dir: &Path, name: &str, config: &Configuration) -> WaterWorks {
    let path: PathBuf = dir.join(format!("{}.json", name));
    let json = serde_json::to_string_pretty(config).unwrap_or_default();
    if let Err(e) = fs::write(&path, json) {
        eprintln!("cannot write {}: {}", path.display(), e);
    }
    WaterWorks::new(ConfigStore::new(path))
}

fn barrel(server: &mut Server, stored: i32) -> Entity {
    server.spawn_container(
        Prefab::new(BARREL_PREFAB, "water.barrel"),
        LiquidContainer::new(20_000).with_amount(stored),
        (),
    )
}

// ── 1. Barrels ──────────────────────────────────────────────────────────

fn validate_barrel(dir: &Path) -> Vec<TestResult> {
    println!("--- Barrels ---");
    let mut results = Vec::new();

    let mut config = Configuration::default();
    config.barrel.capacity = 100_000;
    let mut server = Server::seeded(1);
    let partly_full = barrel(&mut server, 19_999);
    let mut plugin = plugin_with(dir, "barrel_up", &config);
    plugin.load(&mut server);

    results.push(check(
        "barrel_capacity_raised",
        server.capacity(partly_full) == Some(100_000),
        format!("capacity {:?}", server.capacity(partly_full)),
    ));
    results.push(check(
        "barrel_stored_unchanged",
        server.stored(partly_full) == Some(19_999),
        format!("stored {:?}", server.stored(partly_full)),
    ));

    config.barrel.capacity = 5_000;
    let mut server = Server::seeded(1);
    let full = barrel(&mut server, 20_000);
    let mut plugin = plugin_with(dir, "barrel_down", &config);
    plugin.load(&mut server);

    results.push(check(
        "barrel_stored_clamped",
        server.stored(full) == Some(5_000),
        format!("stored {:?} after shrinking to 5000", server.stored(full)),
    ));

    config.barrel.capacity = 0;
    let mut server = Server::seeded(1);
    let untouched = barrel(&mut server, 0);
    let mut plugin = plugin_with(dir, "barrel_zero", &config);
    plugin.load(&mut server);

    results.push(check(
        "barrel_zero_untouched",
        server.capacity(untouched) == Some(20_000),
        format!("capacity {:?} with knob 0", server.capacity(untouched)),
    ));

    results
}

// ── 2. Catchers ─────────────────────────────────────────────────────────

fn validate_small_catcher(dir: &Path) -> Vec<TestResult> {
    println!("--- Water Catchers ---");
    let mut results = Vec::new();

    let mut config = Configuration::default();
    config.small_catcher = CatcherSettings {
        stack_size: 0,
        max_item_to_create: 20.0,
        interval: 30.0,
    };
    let mut server = Server::seeded(2);
    let catcher = server.spawn_container(
        Prefab::new(SMALL_CATCHER_PREFAB, "water.catcher.small"),
        LiquidContainer::new(10_000),
        (WaterCatcher::new(10.0, 60.0),),
    );
    let mut plugin = plugin_with(dir, "catcher", &config);
    plugin.load(&mut server);
    plugin.update(&mut server, 1.0);

    let per_tick = server
        .world
        .get::<&WaterCatcher>(catcher)
        .map(|c| c.max_item_to_create)
        .unwrap_or_default();
    let timer = server
        .scheduler
        .find(catcher, Task::CollectWater)
        .map(|t| t.repeat);

    results.push(check(
        "catcher_capacity_untouched",
        server.capacity(catcher) == Some(10_000),
        format!("capacity {:?}", server.capacity(catcher)),
    ));
    results.push(check(
        "catcher_per_tick_set",
        per_tick == 20.0,
        format!("max item to create {}", per_tick),
    ));
    results.push(check(
        "catcher_fixed_timer",
        timer == Some(Repeat::Fixed { interval: 30.0 }),
        format!("timer {:?}", timer),
    ));

    plugin.unload(&mut server);
    plugin.update(&mut server, 1.0);
    let timer = server
        .scheduler
        .find(catcher, Task::CollectWater)
        .map(|t| t.repeat);
    results.push(check(
        "catcher_vanilla_timer_restored",
        matches!(timer, Some(Repeat::Randomized { interval, .. }) if interval == 60.0),
        format!("timer {:?}", timer),
    ));

    results
}

// ── 3. Pumps ────────────────────────────────────────────────────────────

fn validate_unpowered_pump(dir: &Path) -> Vec<TestResult> {
    println!("--- Water Pumps ---");
    let mut results = Vec::new();

    let mut server = Server::seeded(3);
    let pump = server.spawn_container(
        Prefab::new(PUMP_PREFAB, "water.pump"),
        LiquidContainer::new(2_000),
        (WaterPump::new(20.0, 30).unpowered(),),
    );
    let mut plugin = plugin_with(dir, "pump", &Configuration::default());
    plugin.load(&mut server);
    plugin.update(&mut server, 120.0);

    results.push(check(
        "pump_capacity_set",
        server.capacity(pump) == Some(10_000),
        format!("capacity {:?}", server.capacity(pump)),
    ));
    results.push(check(
        "pump_timer_not_armed",
        !server.scheduler.is_invoking(pump, Task::CreateWater),
        "unpowered pump must not produce".into(),
    ));
    results.push(check(
        "pump_produced_nothing",
        server.stored(pump) == Some(0),
        format!("stored {:?}", server.stored(pump)),
    ));

    results
}

// ── 4. Config store ─────────────────────────────────────────────────────

fn validate_config_store(dir: &Path) -> Vec<TestResult> {
    println!("--- Config Store ---");
    let mut results = Vec::new();

    let path = dir.join("broken.json");
    if let Err(e) = fs::write(&path, "{ \"Water Barrel\": ") {
        results.push(check("config_fixture", false, e.to_string()));
        return results;
    }

    let mut store = ConfigStore::new(&path);
    let healed = store.load().clone();
    results.push(check(
        "config_defaults_on_parse_error",
        healed == Configuration::default(),
        "malformed JSON replaced with defaults".into(),
    ));

    let reparsed = fs::read_to_string(&path)
        .ok()
        .and_then(|text| serde_json::from_str::<Configuration>(&text).ok());
    results.push(check(
        "config_healed_on_disk",
        reparsed.as_ref() == Some(&healed),
        "second load parses cleanly".into(),
    ));

    let mut server = Server::seeded(4);
    let purifier = server.spawn_container(
        Prefab::new(UNPOWERED_PURIFIER_PREFAB, "water.purifier.deployed"),
        LiquidContainer::new(5_000),
        (WaterPurifier::new(5_000),),
    );
    let mut plugin = WaterWorks::new(ConfigStore::new(&path));
    plugin.load(&mut server);
    let stop_flag = server
        .world
        .get::<&WaterPurifier>(purifier)
        .map(|p| p.stop_when_output_full)
        .unwrap_or(false);
    results.push(check(
        "purifier_stops_when_full",
        stop_flag,
        format!("stop_when_output_full {}", stop_flag),
    ));

    results
}

// ── 5. Unload ───────────────────────────────────────────────────────────

fn validate_unload(dir: &Path) -> Vec<TestResult> {
    println!("--- Unload ---");
    let mut results = Vec::new();

    let mut config = Configuration::default();
    config.settings.reset_on_unload = false;
    let mut server = Server::seeded(5);
    let kept = barrel(&mut server, 0);
    let mut plugin = plugin_with(dir, "no_reset", &config);
    plugin.load(&mut server);
    plugin.unload(&mut server);

    results.push(check(
        "unload_without_reset_keeps_values",
        server.capacity(kept) == Some(100_000),
        format!("capacity {:?}", server.capacity(kept)),
    ));

    config.settings.reset_on_unload = true;
    let mut server = Server::seeded(5);
    let reverted = barrel(&mut server, 0);
    let mut plugin = plugin_with(dir, "reset", &config);
    plugin.load(&mut server);
    plugin.unload(&mut server);

    results.push(check(
        "unload_with_reset_reverts",
        server.capacity(reverted) == Some(20_000),
        format!("capacity {:?}", server.capacity(reverted)),
    ));
    results.push(check(
        "unload_state",
        plugin.state() == LifecycleState::Unloaded,
        format!("state {:?}", plugin.state()),
    ));

    results
}

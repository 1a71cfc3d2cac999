//! Operator-editable settings document.
//!
//! One group per container kind plus global settings. Every numeric knob
//! uses `0` as "inactive": the matching attribute keeps its vanilla value.
//! Fields missing from the file deserialize to `0` for the same reason.
//!
//! ```
//! use waterworks::config::Configuration;
//!
//! let config: Configuration = serde_json::from_str(r#"{
//!     "Water Barrel": { "Capacity": 50000 }
//! }"#).unwrap();
//! assert_eq!(config.barrel.capacity, 50000);
//! assert_eq!(config.purifier.capacity, 0);
//! assert!(config.settings.reset_on_unload);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Global plugin settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalSettings {
    /// Revert every container to vanilla when the plugin unloads
    #[serde(rename = "Reset On Unload", default = "default_reset_on_unload")]
    pub reset_on_unload: bool,
}

fn default_reset_on_unload() -> bool {
    true
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            reset_on_unload: default_reset_on_unload(),
        }
    }
}

/// Settings for kinds that only expose a capacity
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CapacitySettings {
    #[serde(rename = "Capacity", default)]
    pub capacity: i32,
}

impl CapacitySettings {
    pub fn new(capacity: i32) -> Self {
        Self { capacity }
    }
}

/// Water catcher settings (small and large catchers each get a group)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CatcherSettings {
    #[serde(rename = "Stack Size", default)]
    pub stack_size: i32,
    #[serde(rename = "Max Item To Create", default)]
    pub max_item_to_create: f32,
    /// Fixed collection interval in seconds
    #[serde(rename = "Interval", default)]
    pub interval: f32,
}

/// Water pump settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PumpSettings {
    #[serde(rename = "Capacity", default)]
    pub capacity: i32,
    /// Millilitres added per pump
    #[serde(rename = "Amount", default)]
    pub amount: i32,
    /// Seconds between pumps
    #[serde(rename = "Interval", default)]
    pub interval: f32,
}

/// Complete plugin configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(rename = "Settings", default)]
    pub settings: GlobalSettings,

    #[serde(rename = "Water Barrel (vanilla: 20000)", alias = "Water Barrel", default)]
    pub barrel: CapacitySettings,
    #[serde(rename = "Water Purifier (vanilla: 5000)", alias = "Water Purifier", default)]
    pub purifier: CapacitySettings,
    #[serde(
        rename = "Water Purifier (Powered) (vanilla: 5000)",
        alias = "Water Purifier (Powered)",
        default
    )]
    pub powered_purifier: CapacitySettings,
    #[serde(rename = "Paddling Pool", default)]
    pub ground_pool: CapacitySettings,
    #[serde(rename = "Above Ground Pool", default)]
    pub big_ground_pool: CapacitySettings,

    #[serde(rename = "Small Water Catcher (vanilla: 10000)", alias = "Small Water Catcher", default)]
    pub small_catcher: CatcherSettings,
    #[serde(rename = "Large Water Catcher (vanilla: 50000)", alias = "Large Water Catcher", default)]
    pub large_catcher: CatcherSettings,

    #[serde(rename = "Water Pump (vanilla: 2000)", alias = "Water Pump", default)]
    pub pump: PumpSettings,

    #[serde(rename = "Water Jug (vanilla: 5000)", alias = "Water Jug", default)]
    pub water_jug: CapacitySettings,
    #[serde(rename = "Water Bucket (vanilla: 2000)", alias = "Water Bucket", default)]
    pub water_bucket: CapacitySettings,

    /// Containers from other plugins, keyed by short name
    #[serde(rename = "Modded Containers", default)]
    pub modded: BTreeMap<String, i32>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            settings: GlobalSettings::default(),
            barrel: CapacitySettings::new(100_000),
            purifier: CapacitySettings::new(25_000),
            powered_purifier: CapacitySettings::new(25_000),
            ground_pool: CapacitySettings::new(5_000),
            big_ground_pool: CapacitySettings::new(25_000),
            small_catcher: CatcherSettings {
                stack_size: 50_000,
                max_item_to_create: 20.0,
                interval: 20.0,
            },
            large_catcher: CatcherSettings {
                stack_size: 250_000,
                max_item_to_create: 60.0,
                interval: 20.0,
            },
            pump: PumpSettings {
                capacity: 10_000,
                amount: 30,
                interval: 20.0,
            },
            water_jug: CapacitySettings::new(25_000),
            water_bucket: CapacitySettings::new(10_000),
            modded: BTreeMap::new(),
        }
    }
}

impl Configuration {
    /// Configured capacity for a modded container, 0 when not listed.
    pub fn modded_capacity(&self, short_name: &str) -> i32 {
        self.modded.get(short_name).copied().unwrap_or(0)
    }

    /// Replace negative or non-finite numbers with 0 (inactive).
    ///
    /// Returns a description of every value that was changed.
    pub fn sanitize(&mut self) -> Vec<String> {
        let mut fixed = Vec::new();

        fn int(fixed: &mut Vec<String>, name: &str, value: &mut i32) {
            if *value < 0 {
                fixed.push(format!("{} was {}", name, value));
                *value = 0;
            }
        }

        fn float(fixed: &mut Vec<String>, name: &str, value: &mut f32) {
            if !value.is_finite() || *value < 0.0 {
                fixed.push(format!("{} was {}", name, value));
                *value = 0.0;
            }
        }

        int(&mut fixed, "barrel capacity", &mut self.barrel.capacity);
        int(&mut fixed, "purifier capacity", &mut self.purifier.capacity);
        int(&mut fixed, "powered purifier capacity", &mut self.powered_purifier.capacity);
        int(&mut fixed, "paddling pool capacity", &mut self.ground_pool.capacity);
        int(&mut fixed, "above ground pool capacity", &mut self.big_ground_pool.capacity);
        int(&mut fixed, "small catcher stack size", &mut self.small_catcher.stack_size);
        float(&mut fixed, "small catcher max item to create", &mut self.small_catcher.max_item_to_create);
        float(&mut fixed, "small catcher interval", &mut self.small_catcher.interval);
        int(&mut fixed, "large catcher stack size", &mut self.large_catcher.stack_size);
        float(&mut fixed, "large catcher max item to create", &mut self.large_catcher.max_item_to_create);
        float(&mut fixed, "large catcher interval", &mut self.large_catcher.interval);
        int(&mut fixed, "pump capacity", &mut self.pump.capacity);
        int(&mut fixed, "pump amount", &mut self.pump.amount);
        float(&mut fixed, "pump interval", &mut self.pump.interval);
        int(&mut fixed, "water jug capacity", &mut self.water_jug.capacity);
        int(&mut fixed, "water bucket capacity", &mut self.water_bucket.capacity);
        for (name, value) in self.modded.iter_mut() {
            int(&mut fixed, name, value);
        }

        fixed
    }
}

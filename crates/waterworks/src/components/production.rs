//! Kind-specific components: catchers, pumps, purifiers.

use serde::{Deserialize, Serialize};

/// Water catcher - collects rain, fog and snow on a timer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterCatcher {
    /// Base millilitres created per collection tick
    pub max_item_to_create: f32,
    /// Host's own collection interval in seconds
    pub collect_interval: f32,
    /// Whether the catcher is exposed to the sky
    pub outside: bool,
}

impl WaterCatcher {
    pub fn new(max_item_to_create: f32, collect_interval: f32) -> Self {
        Self {
            max_item_to_create,
            collect_interval,
            outside: true,
        }
    }

    pub fn indoors(mut self) -> Self {
        self.outside = false;
        self
    }
}

/// Water pump - draws water while powered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterPump {
    /// Seconds between pumps
    pub pump_interval: f32,
    pub amount_per_pump: i32,
    pub powered: bool,
}

impl WaterPump {
    pub fn new(pump_interval: f32, amount_per_pump: i32) -> Self {
        Self {
            pump_interval,
            amount_per_pump,
            powered: true,
        }
    }

    pub fn unpowered(mut self) -> Self {
        self.powered = false;
        self
    }
}

/// Water purifier - both the powered and unpowered variants carry this
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterPurifier {
    /// Capacity of the internal dirty-water buffer
    pub water_storage_capacity: i32,
    /// Stop purifying once the output slot is full
    pub stop_when_output_full: bool,
}

impl WaterPurifier {
    pub fn new(water_storage_capacity: i32) -> Self {
        Self {
            water_storage_capacity,
            stop_when_output_full: false,
        }
    }
}

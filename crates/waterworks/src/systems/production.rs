//! Host production ticks - what catcher and pump timers do when they fire

use hecs::{Entity, World};

use crate::components::{LiquidContainer, WaterCatcher, WaterPump};
use crate::server::Weather;

/// Collect water into a catcher based on the weather.
///
/// Full catchers collect nothing. Indoor catchers only get fog.
pub fn collect_water(world: &mut World, entity: Entity, weather: Weather) {
    let Ok((container, catcher)) =
        world.query_one_mut::<(&mut LiquidContainer, &WaterCatcher)>(entity)
    else {
        return;
    };

    if container.inventory.is_full() {
        return;
    }

    let amount = (catcher.max_item_to_create * collection_factor(catcher, weather)).ceil() as i32;
    container.inventory.add(amount);
}

/// Multiplier applied to `max_item_to_create` for one collection tick
pub fn collection_factor(catcher: &WaterCatcher, weather: Weather) -> f32 {
    let mut factor = 0.25 + weather.fog * 2.0;
    if catcher.outside {
        factor += weather.rain;
        factor += weather.snow * 0.5;
    }
    factor
}

/// Pump one batch of water, if the pump has power
pub fn create_water(world: &mut World, entity: Entity) {
    let Ok((container, pump)) = world.query_one_mut::<(&mut LiquidContainer, &WaterPump)>(entity)
    else {
        return;
    };

    if !pump.powered {
        return;
    }
    container.inventory.add(pump.amount_per_pump);
}

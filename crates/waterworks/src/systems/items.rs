//! Item definitions that hold water (jug, bucket and the water item itself)

use crate::config::Configuration;
use crate::registry::DefaultRegistry;
use crate::server::ItemDefinitions;

use super::DesiredState;

pub const WATER_JUG_ITEM: &str = "waterjug";
pub const WATER_BUCKET_ITEM: &str = "bucket.water";
pub const WATER_ITEM: &str = "water";

/// Water item stack limit per unit of jug capacity
pub const WATER_STACK_PER_JUG: i32 = 62;

/// Apply or revert item stack capacities. A configured capacity of 0 leaves
/// the definition alone in both directions. Missing definitions are skipped.
///
/// The water item's stack limit follows the jug knob so a full jug still
/// fits in one stack.
pub fn apply_item_definitions(
    items: &mut ItemDefinitions,
    registry: &mut DefaultRegistry,
    config: &Configuration,
    state: DesiredState,
) {
    let slots = [
        (&mut items.water_jug, WATER_JUG_ITEM, config.water_jug.capacity),
        (&mut items.water_bucket, WATER_BUCKET_ITEM, config.water_bucket.capacity),
        (
            &mut items.water,
            WATER_ITEM,
            config.water_jug.capacity.saturating_mul(WATER_STACK_PER_JUG),
        ),
    ];

    for (slot, short_name, configured) in slots {
        let Some(current) = slot.as_mut() else {
            continue;
        };
        if configured <= 0 {
            continue;
        }
        let vanilla = registry.capture_item(short_name, || *current);
        *current = match state {
            DesiredState::Configured => configured,
            DesiredState::Vanilla => vanilla,
        };
    }
}

//! Entity kind classification.
//!
//! The set of handled kinds is a fixed allow-list. Anything that does not
//! classify is left alone by the reconciler.

use hecs::{Entity, World};

use crate::components::{LiquidContainer, Prefab, PrefabId, WaterCatcher, WaterPump};
use crate::config::Configuration;

pub const BARREL_PREFAB: PrefabId = 3746060889;
pub const POWERED_PURIFIER_PREFAB: PrefabId = 1259335874;
pub const UNPOWERED_PURIFIER_PREFAB: PrefabId = 2905007296;
pub const LARGE_CATCHER_PREFAB: PrefabId = 3418194637;

pub const GROUND_POOL_SHORTNAME: &str = "paddlingpool.deployed";
pub const BIG_GROUND_POOL_SHORTNAME: &str = "abovegroundpool.deployed";

/// Every container kind the reconciler knows how to handle
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Barrel,
    SmallCatcher,
    LargeCatcher,
    PoweredPurifier,
    UnpoweredPurifier,
    Pump,
    GroundPool,
    BigGroundPool,
    /// Container added by another plugin, identified by short name
    ModdedContainer(String),
}

impl EntityKind {
    pub fn is_catcher(&self) -> bool {
        matches!(self, EntityKind::SmallCatcher | EntityKind::LargeCatcher)
    }

    pub fn label(&self) -> &str {
        match self {
            EntityKind::Barrel => "water barrel",
            EntityKind::SmallCatcher => "small water catcher",
            EntityKind::LargeCatcher => "large water catcher",
            EntityKind::PoweredPurifier => "powered water purifier",
            EntityKind::UnpoweredPurifier => "water purifier",
            EntityKind::Pump => "water pump",
            EntityKind::GroundPool => "paddling pool",
            EntityKind::BigGroundPool => "above ground pool",
            EntityKind::ModdedContainer(short_name) => short_name,
        }
    }
}

/// Work out which kind a live entity is.
///
/// Returns `None` for despawned entities, entities that are not liquid
/// containers, and containers outside the allow-list.
pub fn classify(world: &World, entity: Entity, config: &Configuration) -> Option<EntityKind> {
    let entity_ref = world.entity(entity).ok()?;
    if !entity_ref.has::<LiquidContainer>() {
        return None;
    }
    let prefab = entity_ref.get::<&Prefab>()?;

    if entity_ref.has::<WaterPump>() {
        return Some(EntityKind::Pump);
    }
    if entity_ref.has::<WaterCatcher>() {
        return Some(if prefab.id == LARGE_CATCHER_PREFAB {
            EntityKind::LargeCatcher
        } else {
            EntityKind::SmallCatcher
        });
    }

    match prefab.id {
        BARREL_PREFAB => return Some(EntityKind::Barrel),
        POWERED_PURIFIER_PREFAB => return Some(EntityKind::PoweredPurifier),
        UNPOWERED_PURIFIER_PREFAB => return Some(EntityKind::UnpoweredPurifier),
        _ => {}
    }

    match prefab.short_name.as_str() {
        GROUND_POOL_SHORTNAME => Some(EntityKind::GroundPool),
        BIG_GROUND_POOL_SHORTNAME => Some(EntityKind::BigGroundPool),
        other if config.modded.contains_key(other) => {
            Some(EntityKind::ModdedContainer(other.to_string()))
        }
        _ => None,
    }
}

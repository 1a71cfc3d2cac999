//! Vanilla defaults, captured on first sight of each prefab.
//!
//! A snapshot is taken from the live entity the first time its prefab is
//! reconciled and is never replaced afterwards; it is the restoration target
//! when reverting. Capture assumes the entity has not been modified yet. If
//! something else already changed it, the snapshot holds the changed values
//! and there is no way to tell from here.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::components::PrefabId;

/// Original numeric attributes of one prefab
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultSnapshot {
    pub capacity: i32,
    /// Production interval in seconds (catchers and pumps)
    pub interval: f32,
    /// Amount produced per tick (pumps)
    pub amount: f32,
    /// Base amount created per collection (catchers)
    pub max_item_to_create: f32,
    /// Internal dirty-water buffer (purifiers)
    pub water_storage_capacity: i32,
}

impl DefaultSnapshot {
    pub fn capacity_only(capacity: i32) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }
}

/// Process-wide store of vanilla values
#[derive(Debug, Clone, Default)]
pub struct DefaultRegistry {
    prefabs: HashMap<PrefabId, DefaultSnapshot>,
    items: HashMap<String, i32>,
}

impl DefaultRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the snapshot for `prefab`, reading it with `read` only if absent.
    pub fn capture<F>(&mut self, prefab: PrefabId, read: F) -> DefaultSnapshot
    where
        F: FnOnce() -> DefaultSnapshot,
    {
        *self.prefabs.entry(prefab).or_insert_with(read)
    }

    pub fn get(&self, prefab: PrefabId) -> Option<&DefaultSnapshot> {
        self.prefabs.get(&prefab)
    }

    /// Item-definition counterpart of [`capture`](Self::capture), keyed by item short name.
    pub fn capture_item<F>(&mut self, short_name: &str, read: F) -> i32
    where
        F: FnOnce() -> i32,
    {
        if let Some(capacity) = self.items.get(short_name) {
            return *capacity;
        }
        let capacity = read();
        self.items.insert(short_name.to_string(), capacity);
        capacity
    }

    pub fn item(&self, short_name: &str) -> Option<i32> {
        self.items.get(short_name).copied()
    }

    pub fn len(&self) -> usize {
        self.prefabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefabs.is_empty()
    }
}

//! Components shared by every liquid container.

use serde::{Deserialize, Serialize};

/// Stable identifier of the template an entity was spawned from.
pub type PrefabId = u32;

/// Prefab identity - which template this entity came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Prefab {
    pub id: PrefabId,
    /// Human-readable short name, e.g. `water.barrel`
    pub short_name: String,
}

impl Prefab {
    pub fn new(id: PrefabId, short_name: impl Into<String>) -> Self {
        Self {
            id,
            short_name: short_name.into(),
        }
    }
}

/// Item storage owned by a container.
///
/// Quantities are in millilitres.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub max_stack_size: i32,
    pub amount: i32,
    #[serde(skip)]
    pub dirty: bool,
}

impl Inventory {
    pub fn new(max_stack_size: i32) -> Self {
        Self {
            max_stack_size,
            amount: 0,
            dirty: false,
        }
    }

    pub fn is_full(&self) -> bool {
        self.amount >= self.max_stack_size
    }

    /// Add liquid, never exceeding capacity. Returns the amount accepted.
    pub fn add(&mut self, amount: i32) -> i32 {
        let accepted = amount.clamp(0, (self.max_stack_size - self.amount).max(0));
        self.amount += accepted;
        if accepted > 0 {
            self.dirty = true;
        }
        accepted
    }

    /// Pull the stored amount down to capacity. Returns true if anything was removed.
    pub fn clamp_to_capacity(&mut self) -> bool {
        if self.amount > self.max_stack_size {
            self.amount = self.max_stack_size.max(0);
            true
        } else {
            false
        }
    }
}

/// Liquid container component - present on every water entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidContainer {
    /// Entity-level stack limit (mirrors the inventory limit)
    pub max_stack_size: i32,
    pub inventory: Inventory,
    #[serde(skip)]
    pub dirty: bool,
}

impl LiquidContainer {
    pub fn new(capacity: i32) -> Self {
        Self {
            max_stack_size: capacity,
            inventory: Inventory::new(capacity),
            dirty: false,
        }
    }

    pub fn with_amount(mut self, amount: i32) -> Self {
        self.inventory.amount = amount;
        self
    }

    /// Effective capacity
    pub fn capacity(&self) -> i32 {
        self.inventory.max_stack_size
    }

    pub fn stored(&self) -> i32 {
        self.inventory.amount
    }

    /// Set capacity on both the entity and its inventory, clamping what is stored.
    pub fn set_capacity(&mut self, capacity: i32) {
        self.max_stack_size = capacity;
        self.inventory.max_stack_size = capacity;
        self.inventory.clamp_to_capacity();
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
        self.inventory.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_add_caps_at_capacity() {
        let mut inv = Inventory::new(100);
        assert_eq!(inv.add(60), 60);
        assert_eq!(inv.add(60), 40);
        assert!(inv.is_full());
        assert_eq!(inv.add(10), 0);
    }

    #[test]
    fn test_set_capacity_clamps_stored() {
        let mut lc = LiquidContainer::new(20000).with_amount(20000);
        lc.set_capacity(5000);
        assert_eq!(lc.capacity(), 5000);
        assert_eq!(lc.max_stack_size, 5000);
        assert_eq!(lc.stored(), 5000);
    }

    #[test]
    fn test_set_capacity_keeps_stored_below_limit() {
        let mut lc = LiquidContainer::new(20000).with_amount(19999);
        lc.set_capacity(100000);
        assert_eq!(lc.stored(), 19999);
    }
}

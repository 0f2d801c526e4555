//! Bijective key↔dense-index registry (§4.1 in the design doc).
//!
//! Keys are tagged tuples over a work, a (wave, vehicle) pair, or a plain
//! vehicle. Indices are allocated sequentially from 0 on first mention and
//! never reassigned, so the same key always yields the same index within a
//! registry's lifetime.

use std::collections::HashMap;

use crate::domain::{VehicleId, WorkId};
use crate::waves::WaveNumber;

/// A registry key: what an index actually names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Pickup(WorkId),
    Delivery(WorkId),
    ShipmentPickup(WorkId),
    ShipmentDelivery(WorkId),
    ShipmentAssembly(WorkId),
    Dummy(WaveNumber, VehicleId),
    Vehicle(VehicleId),
}

impl Key {
    /// Indices tagged `dummy` or `shipment_assembly` are solver-internal
    /// placeholders that must never be materialised as real tasks.
    pub fn is_dummy(&self) -> bool {
        matches!(self, Key::Dummy(_, _) | Key::ShipmentAssembly(_))
    }
}

/// The key↔index bijection for one request.
#[derive(Debug, Default, Clone)]
pub struct IndexRegistry {
    next: usize,
    key_to_index: HashMap<Key, usize>,
    index_to_key: HashMap<usize, Key>,
}

impl IndexRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index for `key`, allocating a fresh one if this is the
    /// first time `key` has been seen.
    pub fn index(&mut self, key: Key) -> usize {
        if let Some(&i) = self.key_to_index.get(&key) {
            return i;
        }
        let i = self.next;
        self.next += 1;
        self.key_to_index.insert(key, i);
        self.index_to_key.insert(i, key);
        i
    }

    pub fn pickup_index(&mut self, work_id: WorkId) -> usize {
        self.index(Key::Pickup(work_id))
    }

    pub fn delivery_index(&mut self, work_id: WorkId) -> usize {
        self.index(Key::Delivery(work_id))
    }

    pub fn shipment_pickup_index(&mut self, work_id: WorkId) -> usize {
        self.index(Key::ShipmentPickup(work_id))
    }

    pub fn shipment_delivery_index(&mut self, work_id: WorkId) -> usize {
        self.index(Key::ShipmentDelivery(work_id))
    }

    pub fn shipment_assembly_index(&mut self, work_id: WorkId) -> usize {
        self.index(Key::ShipmentAssembly(work_id))
    }

    pub fn dummy_index(&mut self, wave: WaveNumber, vehicle_id: VehicleId) -> usize {
        self.index(Key::Dummy(wave, vehicle_id))
    }

    pub fn vehicle_index(&mut self, vehicle_id: VehicleId) -> usize {
        self.index(Key::Vehicle(vehicle_id))
    }

    /// Returns the key for a previously-allocated index, if any.
    pub fn key_of(&self, index: usize) -> Option<Key> {
        self.index_to_key.get(&index).copied()
    }

    /// Returns the work id named by an index, if the index names a
    /// work-shaped key (pickup/delivery/shipment leg).
    pub fn work_id(&self, index: usize) -> Option<WorkId> {
        match self.key_of(index)? {
            Key::Pickup(w)
            | Key::Delivery(w)
            | Key::ShipmentPickup(w)
            | Key::ShipmentDelivery(w)
            | Key::ShipmentAssembly(w) => Some(w),
            Key::Dummy(_, _) | Key::Vehicle(_) => None,
        }
    }

    /// Convenience mirror of [`Key::is_dummy`] over an index.
    pub fn is_dummy(&self, index: usize) -> bool {
        self.key_of(index).map(|k| k.is_dummy()).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_key_always_yields_same_index() {
        let mut reg = IndexRegistry::new();
        let a = reg.pickup_index(5);
        let b = reg.pickup_index(5);
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_keys_get_distinct_indices() {
        let mut reg = IndexRegistry::new();
        let p = reg.pickup_index(1);
        let d = reg.delivery_index(1);
        assert_ne!(p, d);
    }

    #[test]
    fn round_trip_key_lookup() {
        let mut reg = IndexRegistry::new();
        let key = Key::Dummy(WaveNumber::Two, 9);
        let i = reg.index(key);
        assert_eq!(reg.key_of(i), Some(key));
    }

    #[test]
    fn is_dummy_covers_dummy_and_shipment_assembly_only() {
        let mut reg = IndexRegistry::new();
        let dummy = reg.dummy_index(WaveNumber::One, 1);
        let assembly = reg.shipment_assembly_index(2);
        let pickup = reg.pickup_index(3);
        assert!(reg.is_dummy(dummy));
        assert!(reg.is_dummy(assembly));
        assert!(!reg.is_dummy(pickup));
    }

    #[test]
    fn indices_allocate_sequentially_from_zero() {
        let mut reg = IndexRegistry::new();
        assert_eq!(reg.pickup_index(1), 0);
        assert_eq!(reg.delivery_index(1), 1);
        assert_eq!(reg.vehicle_index(42), 2);
    }
}

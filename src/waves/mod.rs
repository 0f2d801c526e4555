//! Per-wave vehicle index spaces and wave timing metadata (§4.3).
//!
//! Each wave owns a disjoint prefixed range of solver-facing vehicle
//! indices so a single global index unambiguously buckets back to
//! `(wave, vehicle_id)`.

use std::collections::HashMap;

use crate::domain::{AssemblyId, Schedule, VehicleId};

/// One of the three consecutive operating-day phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WaveNumber {
    One,
    Two,
    Three,
}

impl WaveNumber {
    /// Base offset of this wave's vehicle index space.
    pub fn prefix(self) -> usize {
        match self {
            WaveNumber::One => 10_000,
            WaveNumber::Two => 20_000,
            WaveNumber::Three => 30_000,
        }
    }
}

/// Per-vehicle metadata captured from the prior-plan `VehicleSchedule`: its
/// zone and its wave-boundary assemblies.
#[derive(Debug, Clone, Default)]
pub struct VehicleMeta {
    pub group: Option<String>,
    pub from_assembly: Option<AssemblyId>,
    pub to_assembly: Option<AssemblyId>,
}

/// One wave's vehicle roster, its dense index space, and its timing.
#[derive(Debug, Clone, Default)]
pub struct Wave {
    vehicle_order: Vec<VehicleId>,
    vehicle_id_to_offset: HashMap<VehicleId, usize>,
    vehicle_meta: HashMap<VehicleId, VehicleMeta>,
    pub start: i64,
    pub end: Option<i64>,
    pub assembly_stopover_times: HashMap<AssemblyId, i64>,
    pub stopover_waiting_time: u32,
}

impl Wave {
    pub fn from_schedule(schedule: &Schedule) -> Self {
        let mut assembly_stopover_times = HashMap::new();
        for entry in &schedule.assembly_stopover_time {
            assembly_stopover_times.insert(entry.assembly_id, entry.stopover_time);
        }
        let mut wave = Wave {
            start: schedule.start,
            end: schedule.end,
            assembly_stopover_times,
            stopover_waiting_time: schedule.stopover_waiting_time,
            ..Default::default()
        };
        for vs in &schedule.vehicles {
            wave.register_vehicle(vs.id);
            wave.vehicle_meta.insert(
                vs.id,
                VehicleMeta {
                    group: vs.group.clone(),
                    from_assembly: vs.from_assembly_id,
                    to_assembly: vs.to_assembly_id,
                },
            );
        }
        wave
    }

    pub fn meta(&self, vehicle_id: VehicleId) -> Option<&VehicleMeta> {
        self.vehicle_meta.get(&vehicle_id)
    }

    pub fn group_of(&self, vehicle_id: VehicleId) -> Option<&str> {
        self.vehicle_meta
            .get(&vehicle_id)
            .and_then(|m| m.group.as_deref())
    }

    pub fn from_assembly_of(&self, vehicle_id: VehicleId) -> Option<AssemblyId> {
        self.vehicle_meta.get(&vehicle_id).and_then(|m| m.from_assembly)
    }

    pub fn to_assembly_of(&self, vehicle_id: VehicleId) -> Option<AssemblyId> {
        self.vehicle_meta.get(&vehicle_id).and_then(|m| m.to_assembly)
    }

    /// Registers a vehicle in this wave's dense index space if not already
    /// present, returning its (possibly pre-existing) dense offset.
    pub fn register_vehicle(&mut self, vehicle_id: VehicleId) -> usize {
        if let Some(&offset) = self.vehicle_id_to_offset.get(&vehicle_id) {
            return offset;
        }
        let offset = self.vehicle_order.len();
        self.vehicle_order.push(vehicle_id);
        self.vehicle_id_to_offset.insert(vehicle_id, offset);
        offset
    }

    pub fn vehicle_offset(&self, vehicle_id: VehicleId) -> Option<usize> {
        self.vehicle_id_to_offset.get(&vehicle_id).copied()
    }

    pub fn vehicle_at_offset(&self, offset: usize) -> Option<VehicleId> {
        self.vehicle_order.get(offset).copied()
    }

    pub fn vehicles(&self) -> impl Iterator<Item = VehicleId> + '_ {
        self.vehicle_order.iter().copied()
    }

    pub fn rendezvous_time(&self, assembly_id: AssemblyId) -> Option<i64> {
        self.assembly_stopover_times.get(&assembly_id).copied()
    }
}

/// The three waves together, supporting global-index bucketing.
#[derive(Debug, Clone, Default)]
pub struct WaveRegistry {
    pub w1: Wave,
    pub w2: Wave,
    pub w3: Wave,
}

impl WaveRegistry {
    pub fn new(w1: Wave, w2: Wave, w3: Wave) -> Self {
        Self { w1, w2, w3 }
    }

    pub fn wave(&self, number: WaveNumber) -> &Wave {
        match number {
            WaveNumber::One => &self.w1,
            WaveNumber::Two => &self.w2,
            WaveNumber::Three => &self.w3,
        }
    }

    pub fn wave_mut(&mut self, number: WaveNumber) -> &mut Wave {
        match number {
            WaveNumber::One => &mut self.w1,
            WaveNumber::Two => &mut self.w2,
            WaveNumber::Three => &mut self.w3,
        }
    }

    /// Global solver-facing index for `(wave, vehicle)`, given the vehicle
    /// has already been registered in that wave.
    pub fn global_index(&self, number: WaveNumber, vehicle_id: VehicleId) -> Option<usize> {
        let offset = self.wave(number).vehicle_offset(vehicle_id)?;
        Some(number.prefix() + offset)
    }

    /// Buckets a global index back to `(wave, vehicle_id)`. Wave 3 is
    /// checked first since its prefix is the highest, so a global index
    /// below 30_000 can never be mistaken for a wave-3 one.
    pub fn vehicle_index_to_id(&self, global_index: usize) -> Option<(WaveNumber, VehicleId)> {
        if global_index >= WaveNumber::Three.prefix() {
            let offset = global_index - WaveNumber::Three.prefix();
            return self
                .w3
                .vehicle_at_offset(offset)
                .map(|v| (WaveNumber::Three, v));
        }
        if global_index >= WaveNumber::Two.prefix() {
            let offset = global_index - WaveNumber::Two.prefix();
            return self
                .w2
                .vehicle_at_offset(offset)
                .map(|v| (WaveNumber::Two, v));
        }
        if global_index >= WaveNumber::One.prefix() {
            let offset = global_index - WaveNumber::One.prefix();
            return self
                .w1
                .vehicle_at_offset(offset)
                .map(|v| (WaveNumber::One, v));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_are_disjoint_and_ordered() {
        assert_eq!(WaveNumber::One.prefix(), 10_000);
        assert_eq!(WaveNumber::Two.prefix(), 20_000);
        assert_eq!(WaveNumber::Three.prefix(), 30_000);
    }

    #[test]
    fn round_trip_global_index() {
        let mut registry = WaveRegistry::default();
        registry.w2.register_vehicle(7);
        let gi = registry.global_index(WaveNumber::Two, 7).unwrap();
        assert_eq!(registry.vehicle_index_to_id(gi), Some((WaveNumber::Two, 7)));
    }

    #[test]
    fn bucketing_prefers_highest_prefix_first() {
        let mut registry = WaveRegistry::default();
        registry.w1.register_vehicle(1);
        registry.w3.register_vehicle(1);
        let gi1 = registry.global_index(WaveNumber::One, 1).unwrap();
        let gi3 = registry.global_index(WaveNumber::Three, 1).unwrap();
        assert_eq!(registry.vehicle_index_to_id(gi1), Some((WaveNumber::One, 1)));
        assert_eq!(
            registry.vehicle_index_to_id(gi3),
            Some((WaveNumber::Three, 1))
        );
    }

    #[test]
    fn unregistered_vehicle_has_no_global_index() {
        let registry = WaveRegistry::default();
        assert_eq!(registry.global_index(WaveNumber::One, 99), None);
    }
}

//! Negative-skill encoder (§4.2).
//!
//! The solver only understands "task skills ⊆ vehicle skills." To express
//! "only wave *w*, vehicle *v* may serve this task" we register one skill
//! per `(wave, vehicle)` pair and give each vehicle every skill *except* its
//! own — a vehicle is missing exactly `¬(w, v)`, so any task whose skill set
//! includes `¬(w, v)` cannot be assigned to it. Eligibility for a task thus
//! reduces to picking the allowed set `S` of `(wave, vehicle)` pairs and
//! encoding its complement.

use std::collections::{HashMap, HashSet};

use crate::domain::{AssemblyId, VehicleId};
use crate::waves::{WaveNumber, WaveRegistry};

/// Which side of a wave boundary a vehicle visits an assembly on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Start,
    End,
}

pub type SkillId = u32;
pub type WaveVehicle = (WaveNumber, VehicleId);

#[derive(Debug, Default, Clone)]
struct AssemblyVisits {
    starts: HashMap<AssemblyId, HashSet<VehicleId>>,
    ends: HashMap<AssemblyId, HashSet<VehicleId>>,
}

/// Precomputed compatibility tables plus the `¬(w, v)` skill registry for
/// one request.
#[derive(Debug, Default, Clone)]
pub struct SkillEncoder {
    neg_keys: HashMap<WaveVehicle, SkillId>,
    all_pairs: Vec<WaveVehicle>,
    next_skill: SkillId,
    group_vehicles: HashMap<String, HashSet<WaveVehicle>>,
    assembly_visits: HashMap<WaveNumber, AssemblyVisits>,
}

impl SkillEncoder {
    /// Builds the encoder's tables from the three waves' registered
    /// vehicles and their group/assembly metadata.
    pub fn build(waves: &WaveRegistry) -> Self {
        let mut encoder = SkillEncoder::default();
        for &wave_number in &[WaveNumber::One, WaveNumber::Two, WaveNumber::Three] {
            let wave = waves.wave(wave_number);
            let visits = encoder.assembly_visits.entry(wave_number).or_default();
            for vehicle_id in wave.vehicles() {
                let pair = (wave_number, vehicle_id);
                encoder.add_neg_key(pair);
                if let Some(group) = wave.group_of(vehicle_id) {
                    encoder
                        .group_vehicles
                        .entry(group.to_string())
                        .or_default()
                        .insert(pair);
                }
                if let Some(a) = wave.from_assembly_of(vehicle_id) {
                    visits.starts.entry(a).or_default().insert(vehicle_id);
                }
                if let Some(a) = wave.to_assembly_of(vehicle_id) {
                    visits.ends.entry(a).or_default().insert(vehicle_id);
                }
            }
        }
        encoder
    }

    fn add_neg_key(&mut self, pair: WaveVehicle) -> SkillId {
        if let Some(&id) = self.neg_keys.get(&pair) {
            return id;
        }
        let id = self.next_skill;
        self.next_skill += 1;
        self.neg_keys.insert(pair, id);
        self.all_pairs.push(pair);
        id
    }

    /// The full skill set a vehicle at `(wave, vehicle_id)` carries: every
    /// registered `¬(w, v)` except its own.
    pub fn vehicle_skills(&self, wave: WaveNumber, vehicle_id: VehicleId) -> HashSet<SkillId> {
        let own = (wave, vehicle_id);
        self.all_pairs
            .iter()
            .filter(|&&pair| pair != own)
            .map(|pair| self.neg_keys[pair])
            .collect()
    }

    /// Encodes an eligible set `S` as the task skill set: every registered
    /// `¬(w, v)` whose pair is NOT in `S`.
    pub fn encode(&self, eligible: &HashSet<WaveVehicle>) -> HashSet<SkillId> {
        self.all_pairs
            .iter()
            .filter(|pair| !eligible.contains(pair))
            .map(|pair| self.neg_keys[pair])
            .collect()
    }

    fn in_group(&self, group: &str, wave: WaveNumber, vehicle_id: VehicleId) -> bool {
        self.group_vehicles
            .get(group)
            .map(|set| set.contains(&(wave, vehicle_id)))
            .unwrap_or(false)
    }

    fn assembly_starts(&self, wave: WaveNumber, assembly: AssemblyId) -> HashSet<VehicleId> {
        self.assembly_visits
            .get(&wave)
            .and_then(|v| v.starts.get(&assembly))
            .cloned()
            .unwrap_or_default()
    }

    fn assembly_ends(&self, wave: WaveNumber, assembly: AssemblyId) -> HashSet<VehicleId> {
        self.assembly_visits
            .get(&wave)
            .and_then(|v| v.ends.get(&assembly))
            .cloned()
            .unwrap_or_default()
    }

    /// Explicit inclusion: the eligible set is exactly the given pairs.
    pub fn wave_vehicles(&self, pairs: &[WaveVehicle]) -> HashSet<WaveVehicle> {
        pairs.iter().copied().collect()
    }

    /// Convenience: skills for the explicit-inclusion eligible set.
    pub fn wave_vehicles_skills(&self, pairs: &[WaveVehicle]) -> HashSet<SkillId> {
        self.encode(&self.wave_vehicles(pairs))
    }

    /// Vehicles that visit the given `(wave, side, assembly)` and belong to
    /// `group`.
    pub fn assembly_visits_in_group(
        &self,
        wave: WaveNumber,
        side: Side,
        assembly: AssemblyId,
        group: &str,
    ) -> HashSet<WaveVehicle> {
        let visiting = match side {
            Side::Start => self.assembly_starts(wave, assembly),
            Side::End => self.assembly_ends(wave, assembly),
        };
        visiting
            .into_iter()
            .filter(|&v| self.in_group(group, wave, v))
            .map(|v| (wave, v))
            .collect()
    }

    /// Vehicles that can receive a parcel already shipped on `(wave,
    /// vehicle)`: the same vehicle itself (if `shipped_can_deliver`), or any
    /// `delivery_group` vehicle starting, at some wave `>= wave`, from the
    /// assembly where `(wave, vehicle)` ends.
    pub fn meet_shipped_vehicle(
        &self,
        wave: WaveNumber,
        vehicle: VehicleId,
        delivery_group: &str,
        shipped_can_deliver: bool,
    ) -> HashSet<WaveVehicle> {
        let mut eligible = HashSet::new();
        if shipped_can_deliver {
            eligible.insert((wave, vehicle));
        }
        let Some(end_assembly) = self.end_assembly_of(wave, vehicle) else {
            return eligible;
        };
        for &later_wave in &[WaveNumber::One, WaveNumber::Two, WaveNumber::Three] {
            if later_wave < wave {
                continue;
            }
            for v2 in self.assembly_starts(later_wave, end_assembly) {
                if self.in_group(delivery_group, later_wave, v2) {
                    eligible.insert((later_wave, v2));
                }
            }
        }
        eligible
    }

    fn end_assembly_of(&self, wave: WaveNumber, vehicle: VehicleId) -> Option<AssemblyId> {
        let visits = self.assembly_visits.get(&wave)?;
        visits
            .ends
            .iter()
            .find(|(_, vehicles)| vehicles.contains(&vehicle))
            .map(|(&a, _)| a)
    }

    /// Pickup eligibility for a `waiting` work (§4.2, resolved per
    /// SPEC_FULL.md §E.1): any pickup-group vehicle in wave 1 or 2 whose
    /// wave-end assembly is reachable by a delivery-group vehicle at a wave
    /// `>= ` the pickup wave — either the same vehicle continuing in the
    /// same wave, or a different vehicle starting from that assembly at a
    /// later wave.
    pub fn waiting_pickup(&self, pickup_group: &str, delivery_group: &str) -> HashSet<WaveVehicle> {
        let mut eligible = HashSet::new();
        let Some(pickup_vehicles) = self.group_vehicles.get(pickup_group) else {
            return eligible;
        };
        for &(pickup_wave, v) in pickup_vehicles {
            if pickup_wave == WaveNumber::Three {
                continue;
            }
            let Some(end_assembly) = self.end_assembly_of(pickup_wave, v) else {
                continue;
            };
            let reachable = [WaveNumber::One, WaveNumber::Two, WaveNumber::Three]
                .into_iter()
                .filter(|&delivery_wave| delivery_wave >= pickup_wave)
                .any(|delivery_wave| {
                    if delivery_wave == pickup_wave {
                        self.in_group(delivery_group, pickup_wave, v)
                    } else {
                        self.assembly_starts(delivery_wave, end_assembly)
                            .into_iter()
                            .any(|v2| self.in_group(delivery_group, delivery_wave, v2))
                    }
                });
            if reachable {
                eligible.insert((pickup_wave, v));
            }
        }
        eligible
    }

    /// Shipment eligibility: the same vehicle handles both legs, waves 1-2
    /// only.
    pub fn waiting_shipment(&self, group: &str) -> HashSet<WaveVehicle> {
        self.group_vehicles
            .get(group)
            .into_iter()
            .flatten()
            .filter(|(w, _)| *w != WaveNumber::Three)
            .copied()
            .collect()
    }
}

/// Skill-prune step: restricts both job and vehicle skill sets to
/// `union(jobs) \ intersection(vehicles)` — skills every vehicle has are
/// redundant, and skills no job carries are redundant. Never increases any
/// set.
pub fn prune(job_skills: &mut [HashSet<SkillId>], vehicle_skills: &mut [HashSet<SkillId>]) {
    let union: HashSet<SkillId> = job_skills.iter().flatten().copied().collect();
    let intersection: HashSet<SkillId> = match vehicle_skills.split_first() {
        None => HashSet::new(),
        Some((first, rest)) => {
            let mut acc = first.clone();
            for set in rest {
                acc.retain(|s| set.contains(s));
            }
            acc
        }
    };
    let keep: HashSet<SkillId> = union.difference(&intersection).copied().collect();
    for set in job_skills.iter_mut() {
        set.retain(|s| keep.contains(s));
    }
    for set in vehicle_skills.iter_mut() {
        set.retain(|s| keep.contains(s));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Schedule, VehicleSchedule};

    fn schedule_with(vehicles: Vec<VehicleSchedule>) -> Schedule {
        Schedule {
            start: 0,
            end: None,
            vehicles,
            assembly_stopover_time: vec![],
            stopover_waiting_time: 900,
        }
    }

    fn vs(id: VehicleId, group: &str, from: Option<AssemblyId>, to: Option<AssemblyId>) -> VehicleSchedule {
        VehicleSchedule {
            id,
            from_assembly_id: from,
            to_assembly_id: to,
            group: Some(group.to_string()),
            tasks: vec![],
            up: vec![],
            down: vec![],
            running: true,
        }
    }

    fn registry() -> WaveRegistry {
        let w1 = crate::waves::Wave::from_schedule(&schedule_with(vec![vs(1, "A", Some(100), Some(200))]));
        let w2 = crate::waves::Wave::from_schedule(&schedule_with(vec![vs(2, "B", Some(200), Some(300))]));
        let w3 = crate::waves::Wave::from_schedule(&schedule_with(vec![]));
        WaveRegistry::new(w1, w2, w3)
    }

    #[test]
    fn vehicle_skill_set_excludes_only_its_own_key() {
        let waves = registry();
        let enc = SkillEncoder::build(&waves);
        let own = enc.vehicle_skills(WaveNumber::One, 1);
        let all: HashSet<SkillId> = enc.neg_keys.values().copied().collect();
        let missing: Vec<_> = all.difference(&own).collect();
        assert_eq!(missing.len(), 1);
    }

    #[test]
    fn encode_is_complement_of_eligible_set() {
        let waves = registry();
        let enc = SkillEncoder::build(&waves);
        let eligible: HashSet<WaveVehicle> = [(WaveNumber::One, 1)].into_iter().collect();
        let encoded = enc.encode(&eligible);
        // vehicle (1,1) must NOT be assignable: its own skill set lacks
        // exactly the negative key for (1,1), which is excluded from
        // `encoded` by construction.
        let neg_key_1_1 = enc.neg_keys[&(WaveNumber::One, 1)];
        assert!(!encoded.contains(&neg_key_1_1));
    }

    #[test]
    fn waiting_pickup_reaches_across_rendezvous() {
        let waves = registry();
        let enc = SkillEncoder::build(&waves);
        // vehicle 1 (group A, wave 1) ends at assembly 200; vehicle 2
        // (group B, wave 2) starts at assembly 200, so a group-A pickup
        // delivered to group B should find vehicle (wave 1, 1) eligible.
        let eligible = enc.waiting_pickup("A", "B");
        assert!(eligible.contains(&(WaveNumber::One, 1)));
    }

    #[test]
    fn waiting_shipment_excludes_wave_three() {
        let waves = registry();
        let enc = SkillEncoder::build(&waves);
        let eligible = enc.waiting_shipment("A");
        assert!(eligible.iter().all(|(w, _)| *w != WaveNumber::Three));
    }

    #[test]
    fn prune_never_increases_any_set() {
        let mut jobs = vec![
            HashSet::from([1, 2, 3]),
            HashSet::from([2, 3]),
        ];
        let mut vehicles = vec![HashSet::from([1, 2]), HashSet::from([2])];
        let jobs_before = jobs.clone();
        let vehicles_before = vehicles.clone();
        prune(&mut jobs, &mut vehicles);
        for (before, after) in jobs_before.iter().zip(jobs.iter()) {
            assert!(after.is_subset(before));
        }
        for (before, after) in vehicles_before.iter().zip(vehicles.iter()) {
            assert!(after.is_subset(before));
        }
    }
}

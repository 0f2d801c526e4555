//! Request classifier (§4.4).
//!
//! For each work, picks exactly one branch based on its status and its
//! membership in the prior-plan pickup/shipment maps threaded in from
//! `crate::optimize`, and returns the skill sets the job-construction code
//! in `crate::optimize` should attach to the pickup and/or delivery job (or
//! shipment) it builds for that work.

use std::collections::{HashMap, HashSet};

use crate::domain::{VehicleId, Work, WorkId, WorkStatus};
use crate::skills::{Side, SkillEncoder, SkillId};
use crate::waves::WaveNumber;

/// Which optimization stage is classifying — First Optimization only ever
/// sees `waiting`/`handle_pickup`/`handle_delivery`/`assembly` statuses (it
/// runs before any pickup has been pinned), Second Optimization additionally
/// consults the prior-plan maps First Optimization produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    First,
    Second,
}

/// Prior-plan bookkeeping threaded through from `crate::optimize`. Empty in
/// First Optimization.
#[derive(Debug, Clone, Default)]
pub struct PriorPlan {
    pub wave_1_done_pickups: HashMap<WorkId, VehicleId>,
    pub wave_1_pickups: HashMap<WorkId, VehicleId>,
    pub wave_1_shipments: HashMap<WorkId, VehicleId>,
    pub wave_2_pickups: HashMap<WorkId, VehicleId>,
    pub wave_2_shipments: HashMap<WorkId, VehicleId>,
    /// Second-Optimization `stopover` pinning: which vehicle unloaded this
    /// work at the 1↔2 rendezvous, if any.
    pub swap_1_2_down: HashMap<WorkId, VehicleId>,
    /// ... and which vehicle picked it back up there.
    pub swap_1_2_up: HashMap<WorkId, VehicleId>,
    pub swap_2_3_down: HashMap<WorkId, VehicleId>,
    pub swap_2_3_up: HashMap<WorkId, VehicleId>,
}

/// What role(s) a work contributes and the skills to attach.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub pickup_skills: Option<HashSet<SkillId>>,
    pub delivery_skills: Option<HashSet<SkillId>>,
    /// True when pickup and delivery should be expressed as a single
    /// solver shipment rather than two independent jobs.
    pub is_shipment: bool,
    /// True when the solver must be forced to assign this job/shipment
    /// (drives the minimum-end-time driver's must-handle set).
    pub must_handle: bool,
}

/// Classifies `work` for First Optimization (table rows: `handle_pickup`,
/// `handle_delivery`, `assembly`, `waiting`).
pub fn classify_first(skills: &SkillEncoder, work: &Work) -> Classification {
    match &work.status {
        WorkStatus::HandlePickup { vehicle_id } => Classification {
            pickup_skills: Some(skills.wave_vehicles_skills(&[(WaveNumber::One, *vehicle_id)])),
            delivery_skills: None,
            is_shipment: work.pickup.group == work.delivery.group,
            must_handle: true,
        },
        WorkStatus::HandleDelivery { vehicle_id } => Classification {
            pickup_skills: None,
            delivery_skills: Some(skills.wave_vehicles_skills(&[(WaveNumber::One, *vehicle_id)])),
            is_shipment: false,
            must_handle: true,
        },
        WorkStatus::Assembly { assembly_id } => {
            let eligible = skills.assembly_visits_in_group(
                WaveNumber::One,
                Side::Start,
                *assembly_id,
                &work.pickup.group,
            );
            Classification {
                pickup_skills: Some(skills.encode(&eligible)),
                delivery_skills: None,
                is_shipment: work.pickup.group == work.delivery.group,
                must_handle: false,
            }
        }
        WorkStatus::Waiting => {
            let eligible = skills.waiting_pickup(&work.pickup.group, &work.delivery.group);
            Classification {
                pickup_skills: Some(skills.encode(&eligible)),
                delivery_skills: None,
                is_shipment: work.pickup.group == work.delivery.group,
                must_handle: false,
            }
        }
        WorkStatus::Shipped { .. } | WorkStatus::Done => Classification::default(),
    }
}

/// Classifies `work` for Second Optimization under `current_status` ∈
/// {`wait`, `wave_1`}: all prior-plan rows plus the FO rows, all must-handle.
pub fn classify_second_wait_or_wave1(
    skills: &SkillEncoder,
    work: &Work,
    prior: &PriorPlan,
) -> Classification {
    if let Some(&v) = prior.wave_1_done_pickups.get(&work.id) {
        let eligible = skills.meet_shipped_vehicle(WaveNumber::One, v, &work.delivery.group, true);
        return Classification {
            pickup_skills: None,
            delivery_skills: Some(skills.encode(&eligible)),
            is_shipment: false,
            must_handle: true,
        };
    }
    if let Some(&v) = prior.wave_1_pickups.get(&work.id) {
        let eligible = skills.meet_shipped_vehicle(WaveNumber::One, v, &work.delivery.group, false);
        return Classification {
            pickup_skills: Some(skills.wave_vehicles_skills(&[(WaveNumber::One, v)])),
            delivery_skills: Some(skills.encode(&eligible)),
            is_shipment: prior.wave_1_shipments.get(&work.id) == Some(&v),
            must_handle: true,
        };
    }
    if let Some(&v) = prior.wave_2_pickups.get(&work.id) {
        let eligible = skills.meet_shipped_vehicle(WaveNumber::Two, v, &work.delivery.group, false);
        return Classification {
            pickup_skills: Some(skills.wave_vehicles_skills(&[(WaveNumber::Two, v)])),
            delivery_skills: Some(skills.encode(&eligible)),
            is_shipment: prior.wave_2_shipments.get(&work.id) == Some(&v),
            must_handle: true,
        };
    }
    let mut base = classify_first(skills, work);
    base.must_handle = !matches!(work.status, WorkStatus::Shipped { .. } | WorkStatus::Done);
    base
}

/// Classifies `work` for Second Optimization under `current_status` =
/// `stopover`: the prior plan is pinned harder via the swap maps (§4.7).
pub fn classify_second_stopover(
    skills: &SkillEncoder,
    work: &Work,
    prior: &PriorPlan,
) -> Classification {
    if let Some(&v) = prior.wave_1_done_pickups.get(&work.id) {
        let delivery_vehicle_wave = if let Some(&upv) = prior.swap_1_2_down.get(&work.id) {
            let upv = *prior.swap_1_2_up.get(&work.id).unwrap_or(&upv);
            skills.wave_vehicles(&[(WaveNumber::Two, upv), (WaveNumber::Three, upv)])
        } else if let Some(&upv) = prior.swap_2_3_down.get(&work.id) {
            let upv = *prior.swap_2_3_up.get(&work.id).unwrap_or(&upv);
            skills.wave_vehicles(&[(WaveNumber::Three, upv)])
        } else {
            skills.wave_vehicles(&[(WaveNumber::Two, v), (WaveNumber::Three, v)])
        };
        return Classification {
            pickup_skills: None,
            delivery_skills: Some(skills.encode(&delivery_vehicle_wave)),
            is_shipment: false,
            must_handle: true,
        };
    }
    let mut base = classify_first(skills, work);
    base.must_handle = !matches!(work.status, WorkStatus::Shipped { .. } | WorkStatus::Done);
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WorkPoint;

    fn sample_work(status: WorkStatus) -> Work {
        Work {
            id: 1,
            description: None,
            pickup: WorkPoint {
                location: (0.0, 0.0),
                group: "A".to_string(),
                setup_time: 0,
                service_time: 0,
            },
            delivery: WorkPoint {
                location: (1.0, 1.0),
                group: "A".to_string(),
                setup_time: 0,
                service_time: 0,
            },
            amount: Default::default(),
            status,
        }
    }

    #[test]
    fn done_work_classifies_to_nothing() {
        let skills = SkillEncoder::default();
        let c = classify_first(&skills, &sample_work(WorkStatus::Done));
        assert!(c.pickup_skills.is_none());
        assert!(c.delivery_skills.is_none());
    }

    #[test]
    fn handle_pickup_is_must_handle_pickup_only() {
        let skills = SkillEncoder::default();
        let c = classify_first(&skills, &sample_work(WorkStatus::HandlePickup { vehicle_id: 1 }));
        assert!(c.pickup_skills.is_some());
        assert!(c.delivery_skills.is_none());
        assert!(c.must_handle);
    }

    #[test]
    fn same_group_waiting_work_is_a_shipment_candidate() {
        let skills = SkillEncoder::default();
        let c = classify_first(&skills, &sample_work(WorkStatus::Waiting));
        assert!(c.is_shipment);
    }
}

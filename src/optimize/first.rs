//! First Optimization (§4.6): decide which wave serves each pickup.

use std::collections::{HashMap, HashSet};

use crate::classify::{classify_first, Classification};
use crate::domain::{AssemblyId, Request, VehicleId, Work, WorkId, WorkStatus};
use crate::error::PlannerError;
use crate::index::IndexRegistry;
use crate::minsearch::minimum_end_time;
use crate::skills::SkillEncoder;
use crate::solver::{
    CustomMatrix, DistributeOptions, ShipmentStep, SolverClient, SolverJob, SolverRequest,
    SolverShipment, SolverVehicle,
};
use crate::waves::{WaveNumber, WaveRegistry};

const GRACE_BEFORE_WAVE_END: i64 = 300;
const DEFAULT_RENDEZVOUS_OFFSET: i64 = 10_800;

/// Which wave a pickup (and, when it's a shipment, its paired delivery)
/// landed on.
#[derive(Debug, Clone, Default)]
pub struct FirstOptimizationResult {
    pub wave_1_pickups: HashMap<WorkId, VehicleId>,
    pub wave_1_shipments: HashMap<WorkId, VehicleId>,
    pub wave_2_pickups: HashMap<WorkId, VehicleId>,
    pub wave_2_shipments: HashMap<WorkId, VehicleId>,
    /// Per-assembly wave-2 arrival time, taken as the maximum across every
    /// wave-2 vehicle ending there, defaulted to `wave_2.start + 10800`
    /// for assemblies no vehicle reached.
    pub rendezvous: HashMap<AssemblyId, i64>,
    /// True when the fallback-to-prior-plan path was taken because some
    /// must-handle job stayed unassigned.
    pub used_fallback: bool,
}

struct VehicleInclusion {
    vehicle_id: VehicleId,
    wave: WaveNumber,
    start: crate::domain::Coordinate,
    end: crate::domain::Coordinate,
    time_window: (i64, i64),
}

/// Runs First Optimization and returns the resulting pickup/shipment wave
/// assignments and per-assembly rendezvous times.
pub async fn run(
    request: &Request,
    waves: &WaveRegistry,
    skills: &SkillEncoder,
    indices: &mut IndexRegistry,
    solver: &SolverClient,
) -> Result<FirstOptimizationResult, PlannerError> {
    let mut solver_request = SolverRequest {
        distribute_options: DistributeOptions {
            max_vehicle_work_time: 86_400,
            equalize_work_time: None,
            custom_matrix: CustomMatrix { enabled: true },
        },
        ..Default::default()
    };

    let assembly_locations: HashMap<AssemblyId, crate::domain::Coordinate> =
        request.assemblies.iter().map(|a| (a.id, a.location)).collect();

    let mut included: Vec<VehicleInclusion> = Vec::new();
    let mut status_overrides: HashMap<WorkId, WorkStatus> = HashMap::new();

    for vs in &request.schedules.wave_1.vehicles {
        let Some(vehicle) = request.vehicles.iter().find(|v| v.id == vs.id) else {
            continue;
        };
        let to_assembly_location = vs
            .to_assembly_id
            .and_then(|a| assembly_locations.get(&a).copied())
            .unwrap_or(vehicle.location);
        let from_assembly_location = vs
            .from_assembly_id
            .and_then(|a| assembly_locations.get(&a).copied())
            .unwrap_or(vehicle.location);
        let start_location = if request.current_status == crate::domain::CurrentStatus::Wave1 && vs.running {
            match vs.first_undone_task() {
                Some(task) => {
                    if let Some(work_id) = task.work_id {
                        let status = match task.kind {
                            crate::domain::TaskType::Pickup => WorkStatus::HandlePickup { vehicle_id: vs.id },
                            _ => WorkStatus::HandleDelivery { vehicle_id: vs.id },
                        };
                        status_overrides.insert(work_id, status);
                    }
                    task.location
                }
                None => from_assembly_location,
            }
        } else {
            from_assembly_location
        };
        let wave_1_end = request.schedules.wave_1.end.unwrap_or(request.current_time + 86_400);
        let next_task_eta = vs.first_undone_task().map(|t| t.eta).unwrap_or(request.current_time);
        let tw_start = request.current_time.max(next_task_eta).max(waves.w1.start);
        let tw_end = wave_1_end - GRACE_BEFORE_WAVE_END;
        if tw_start > tw_end {
            continue;
        }
        included.push(VehicleInclusion {
            vehicle_id: vs.id,
            wave: WaveNumber::One,
            start: start_location,
            end: to_assembly_location,
            time_window: (tw_start, tw_end),
        });
    }

    for vs in &request.schedules.wave_2.vehicles {
        let from_assembly_location = vs
            .from_assembly_id
            .and_then(|a| assembly_locations.get(&a).copied());
        let to_assembly_location = vs
            .to_assembly_id
            .and_then(|a| assembly_locations.get(&a).copied());
        let (Some(start_location), Some(end_location)) = (from_assembly_location, to_assembly_location) else {
            continue;
        };
        included.push(VehicleInclusion {
            vehicle_id: vs.id,
            wave: WaveNumber::Two,
            start: start_location,
            end: end_location,
            time_window: (waves.w2.start, waves.w2.start + 86_400),
        });
    }

    let mut minimum_time_indices = Vec::new();
    for inclusion in &included {
        let solver_id = waves.global_index(inclusion.wave, inclusion.vehicle_id).unwrap_or(0);
        let vehicle_skills = skills.vehicle_skills(inclusion.wave, inclusion.vehicle_id);
        let idx = solver_request.vehicles.len();
        solver_request.vehicles.push(SolverVehicle {
            id: solver_id,
            profile: "car".to_string(),
            start: inclusion.start,
            end: Some(inclusion.end),
            skills: vehicle_skills.into_iter().collect(),
            time_window: inclusion.time_window,
            capacity: None,
        });
        if inclusion.wave == WaveNumber::Two {
            minimum_time_indices.push(idx);
        }

        let dummy_index = indices.dummy_index(inclusion.wave, inclusion.vehicle_id);
        solver_request.jobs.push(SolverJob {
            id: dummy_index,
            location: inclusion.start,
            setup: 0,
            service: 0,
            skills: skills.wave_vehicles_skills(&[(inclusion.wave, inclusion.vehicle_id)]).into_iter().collect(),
            priority: Some(crate::domain::priority::LOWEST),
            pickup: None,
            delivery: None,
            description: Some("dummy".to_string()),
        });
    }

    let mut must_handle: HashSet<usize> = HashSet::new();

    for work in &request.works {
        if work.status.is_done() {
            continue;
        }
        let promoted;
        let work = match status_overrides.get(&work.id) {
            Some(status) => {
                promoted = Work { status: status.clone(), ..work.clone() };
                &promoted
            }
            None => work,
        };
        let c: Classification = classify_first(skills, work);
        add_work_to_request(
            &mut solver_request,
            indices,
            work,
            &c,
            &assembly_locations,
            &mut must_handle,
        );
    }

    let response = minimum_end_time(
        solver,
        solver_request,
        waves.w2.start,
        &minimum_time_indices,
        &must_handle,
    )
    .await?;

    let Some(response) = response else {
        return fallback_to_prior_plan(request);
    };

    let mut result = FirstOptimizationResult::default();
    let mut rendezvous_max: HashMap<AssemblyId, i64> = HashMap::new();

    for route in &response.routes {
        let Some((wave, vehicle_id)) = waves.vehicle_index_to_id(route.vehicle) else {
            continue;
        };
        let mut route_work_ids: Vec<WorkId> = Vec::new();
        for step in &route.steps {
            if let Some(id) = step.id {
                if indices.is_dummy(id) {
                    continue;
                }
                if let Some(work_id) = indices.work_id(id) {
                    route_work_ids.push(work_id);
                    match wave {
                        WaveNumber::One => {
                            result.wave_1_pickups.insert(work_id, vehicle_id);
                        }
                        WaveNumber::Two => {
                            result.wave_2_pickups.insert(work_id, vehicle_id);
                        }
                        WaveNumber::Three => {}
                    }
                }
            }
            if wave == WaveNumber::Two {
                if let Some(end_step) = route.steps.last() {
                    if let Some(vs) = request.schedules.wave_2.vehicles.iter().find(|v| v.id == vehicle_id) {
                        if let Some(a) = vs.to_assembly_id {
                            let entry = rendezvous_max.entry(a).or_insert(end_step.arrival);
                            *entry = (*entry).max(end_step.arrival);
                        }
                    }
                }
            }
        }
        // A work whose pickup and delivery both land on this route is a shipment.
        let counts: HashMap<WorkId, usize> = route_work_ids.iter().fold(HashMap::new(), |mut acc, &w| {
            *acc.entry(w).or_insert(0) += 1;
            acc
        });
        for (work_id, count) in counts {
            if count >= 2 {
                match wave {
                    WaveNumber::One => {
                        result.wave_1_shipments.insert(work_id, vehicle_id);
                    }
                    WaveNumber::Two => {
                        result.wave_2_shipments.insert(work_id, vehicle_id);
                    }
                    WaveNumber::Three => {}
                }
            }
        }
    }

    result.rendezvous = rendezvous_max;
    for assembly in &request.assemblies {
        result
            .rendezvous
            .entry(assembly.id)
            .or_insert(waves.w2.start + DEFAULT_RENDEZVOUS_OFFSET);
    }

    Ok(result)
}

pub(super) fn add_work_to_request(
    solver_request: &mut SolverRequest,
    indices: &mut IndexRegistry,
    work: &Work,
    c: &Classification,
    assembly_locations: &HashMap<AssemblyId, crate::domain::Coordinate>,
    must_handle: &mut HashSet<usize>,
) {
    let (pickup_location, pickup_setup, pickup_service) = match &work.status {
        WorkStatus::Assembly { assembly_id } => (
            assembly_locations
                .get(assembly_id)
                .copied()
                .unwrap_or(work.pickup.location),
            0,
            0,
        ),
        _ => (work.pickup.location, work.pickup.setup_time, work.pickup.service_time),
    };

    if c.is_shipment {
        if let (Some(pickup_skills), _) = (&c.pickup_skills, &c.delivery_skills) {
            let pickup_index = indices.shipment_pickup_index(work.id);
            let delivery_index = indices.shipment_delivery_index(work.id);
            solver_request.shipments.push(SolverShipment {
                pickup: ShipmentStep {
                    id: pickup_index,
                    location: pickup_location,
                    setup: pickup_setup,
                    service: pickup_service,
                },
                delivery: ShipmentStep {
                    id: delivery_index,
                    location: work.delivery.location,
                    setup: work.delivery.setup_time,
                    service: work.delivery.service_time,
                },
                skills: pickup_skills.iter().copied().collect(),
                amount: None,
            });
            if c.must_handle {
                must_handle.insert(pickup_index);
                must_handle.insert(delivery_index);
            }
        }
        return;
    }

    if let Some(pickup_skills) = &c.pickup_skills {
        let idx = indices.pickup_index(work.id);
        solver_request.jobs.push(SolverJob {
            id: idx,
            location: pickup_location,
            setup: pickup_setup,
            service: pickup_service,
            skills: pickup_skills.iter().copied().collect(),
            priority: Some(crate::domain::priority::HIGHEST),
            pickup: None,
            delivery: None,
            description: Some(format!("pickup:{}", work.id)),
        });
        if c.must_handle {
            must_handle.insert(idx);
        }
    }
    if let Some(delivery_skills) = &c.delivery_skills {
        let idx = indices.delivery_index(work.id);
        solver_request.jobs.push(SolverJob {
            id: idx,
            location: work.delivery.location,
            setup: work.delivery.setup_time,
            service: work.delivery.service_time,
            skills: delivery_skills.iter().copied().collect(),
            priority: Some(crate::domain::priority::HIGHEST),
            pickup: None,
            delivery: None,
            description: Some(format!("delivery:{}", work.id)),
        });
        if c.must_handle {
            must_handle.insert(idx);
        }
    }
}

fn fallback_to_prior_plan(request: &Request) -> Result<FirstOptimizationResult, PlannerError> {
    if request.schedules.wave_1.assembly_stopover_time.is_empty() {
        return Err(PlannerError::MissingAssemblyStopoverTime);
    }
    let mut result = FirstOptimizationResult {
        used_fallback: true,
        ..Default::default()
    };
    for vs in &request.schedules.wave_1.vehicles {
        for task in &vs.tasks {
            if let (Some(work_id), crate::domain::TaskType::Pickup) = (task.work_id, task.kind) {
                result.wave_1_pickups.insert(work_id, vs.id);
            }
        }
    }
    for vs in &request.schedules.wave_2.vehicles {
        for task in &vs.tasks {
            if let (Some(work_id), crate::domain::TaskType::Pickup) = (task.work_id, task.kind) {
                result.wave_2_pickups.insert(work_id, vs.id);
            }
        }
    }
    for entry in &request.schedules.wave_1.assembly_stopover_time {
        result.rendezvous.insert(entry.assembly_id, entry.stopover_time);
    }
    Ok(result)
}

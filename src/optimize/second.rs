//! Second Optimization (§4.7): the full three-wave plan given pinned
//! wave-1/2 pickups and per-assembly rendezvous times.

use std::collections::{HashMap, HashSet};

use super::first::FirstOptimizationResult;
use crate::classify::{classify_second_stopover, classify_second_wait_or_wave1, PriorPlan};
use crate::domain::{AssemblyId, Coordinate, CurrentStatus, Request, VehicleId, WorkId};
use crate::error::PlannerError;
use crate::index::IndexRegistry;
use crate::minsearch::minimum_end_time;
use crate::skills::SkillEncoder;
use crate::solver::{
    CustomMatrix, DistributeOptions, SolverClient, SolverJob, SolverRequest, SolverResponse,
    SolverVehicle,
};
use crate::waves::{WaveNumber, WaveRegistry};

const RENDEZVOUS_GRACE: i64 = 600;

pub struct SecondOptimizationResult {
    pub response: SolverResponse,
    pub rendezvous: HashMap<AssemblyId, i64>,
}

fn assembly_location_map(request: &Request) -> HashMap<AssemblyId, Coordinate> {
    request.assemblies.iter().map(|a| (a.id, a.location)).collect()
}

/// Scans the prior-plan `up`/`down` lists into the four swap pinning maps
/// `classify::PriorPlan` needs for the `stopover` branch (§4.7).
fn build_prior_plan(request: &Request, fo: &FirstOptimizationResult) -> PriorPlan {
    let mut prior = PriorPlan {
        wave_1_pickups: fo.wave_1_pickups.clone(),
        wave_1_shipments: fo.wave_1_shipments.clone(),
        wave_2_pickups: fo.wave_2_pickups.clone(),
        wave_2_shipments: fo.wave_2_shipments.clone(),
        ..Default::default()
    };
    for vs in &request.schedules.wave_1.vehicles {
        for &work_id in &vs.down {
            prior.swap_1_2_down.insert(work_id, vs.id);
        }
        for task in &vs.tasks {
            if task.done && task.kind == crate::domain::TaskType::Pickup {
                if let Some(work_id) = task.work_id {
                    prior.wave_1_done_pickups.entry(work_id).or_insert(vs.id);
                }
            }
        }
    }
    for vs in &request.schedules.wave_2.vehicles {
        for &work_id in &vs.up {
            prior.swap_1_2_up.insert(work_id, vs.id);
        }
        for &work_id in &vs.down {
            prior.swap_2_3_down.insert(work_id, vs.id);
        }
    }
    for vs in &request.schedules.wave_3.vehicles {
        for &work_id in &vs.up {
            prior.swap_2_3_up.insert(work_id, vs.id);
        }
    }
    prior
}

struct VehicleInclusion {
    vehicle_id: VehicleId,
    wave: WaveNumber,
    start: Coordinate,
    end: Coordinate,
    time_window: (i64, i64),
    is_minimum_time: bool,
}

pub async fn run(
    request: &Request,
    fo: &FirstOptimizationResult,
    waves: &WaveRegistry,
    skills: &SkillEncoder,
    indices: &mut IndexRegistry,
    solver: &SolverClient,
) -> Result<SecondOptimizationResult, PlannerError> {
    let assembly_locations = assembly_location_map(request);
    let rendezvous = fo.rendezvous.clone();

    let mut included: Vec<VehicleInclusion> = Vec::new();

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
        let start_location = if request.current_status == CurrentStatus::Wave1 && vs.running {
            vs.first_undone_task()
                .map(|t| t.location)
                .unwrap_or(from_assembly_location)
        } else {
            from_assembly_location
        };
        let wave_1_end = request.schedules.wave_1.end.unwrap_or(request.current_time + 86_400);
        let next_task_eta = vs.first_undone_task().map(|t| t.eta).unwrap_or(request.current_time);
        let tw_start = request.current_time.max(next_task_eta).max(waves.w1.start);
        if tw_start > wave_1_end {
            continue;
        }
        included.push(VehicleInclusion {
            vehicle_id: vs.id,
            wave: WaveNumber::One,
            start: start_location,
            end: to_assembly_location,
            time_window: (tw_start, wave_1_end),
            is_minimum_time: false,
        });
    }

    for vs in &request.schedules.wave_2.vehicles {
        let from_assembly_location = vs.from_assembly_id.and_then(|a| assembly_locations.get(&a).copied());
        let to_assembly_location = vs.to_assembly_id.and_then(|a| assembly_locations.get(&a).copied());
        let (Some(start_location), Some(end_location)) = (from_assembly_location, to_assembly_location) else {
            continue;
        };
        let rendezvous_entry = vs.to_assembly_id.and_then(|a| rendezvous.get(&a).copied());
        let (window_end, is_minimum_time) = match rendezvous_entry {
            Some(r) => (r + RENDEZVOUS_GRACE, false),
            None => (waves.w2.start + 86_400, true),
        };
        included.push(VehicleInclusion {
            vehicle_id: vs.id,
            wave: WaveNumber::Two,
            start: start_location,
            end: end_location,
            time_window: (waves.w2.start, window_end),
            is_minimum_time,
        });
    }

    for vs in &request.schedules.wave_3.vehicles {
        let Some(from_assembly_id) = vs.from_assembly_id else {
            continue;
        };
        let Some(&rendezvous_time) = rendezvous.get(&from_assembly_id) else {
            continue;
        };
        let start_location = assembly_locations
            .get(&from_assembly_id)
            .copied()
            .unwrap_or((0.0, 0.0));
        let end_location = vs
            .to_assembly_id
            .and_then(|a| assembly_locations.get(&a).copied())
            .unwrap_or(start_location);
        let window_start = rendezvous_time + waves.w3.stopover_waiting_time as i64;
        included.push(VehicleInclusion {
            vehicle_id: vs.id,
            wave: WaveNumber::Three,
            start: start_location,
            end: end_location,
            time_window: (window_start, window_start + 86_400),
            is_minimum_time: true,
        });
    }

    let mut solver_request = SolverRequest {
        distribute_options: DistributeOptions {
            max_vehicle_work_time: 86_400,
            equalize_work_time: None,
            custom_matrix: CustomMatrix { enabled: true },
        },
        ..Default::default()
    };
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
        if inclusion.is_minimum_time {
            minimum_time_indices.push(idx);
        }
        let dummy_index = indices.dummy_index(inclusion.wave, inclusion.vehicle_id);
        solver_request.jobs.push(SolverJob {
            id: dummy_index,
            location: inclusion.start,
            setup: 0,
            service: 0,
            skills: skills
                .wave_vehicles_skills(&[(inclusion.wave, inclusion.vehicle_id)])
                .into_iter()
                .collect(),
            priority: Some(crate::domain::priority::LOWEST),
            pickup: None,
            delivery: None,
            description: Some("dummy".to_string()),
        });
    }

    let prior = build_prior_plan(request, fo);
    let mut must_handle: HashSet<usize> = HashSet::new();

    match request.current_status {
        CurrentStatus::Wait | CurrentStatus::Wave1 => {
            for work in &request.works {
                if work.status.is_done() {
                    continue;
                }
                let c = classify_second_wait_or_wave1(skills, work, &prior);
                super::first::add_work_to_request(
                    &mut solver_request,
                    indices,
                    work,
                    &c,
                    &assembly_locations,
                    &mut must_handle,
                );
            }
        }
        CurrentStatus::Stopover => {
            for work in &request.works {
                if work.status.is_done() {
                    continue;
                }
                let c = classify_second_stopover(skills, work, &prior);
                super::first::add_work_to_request(
                    &mut solver_request,
                    indices,
                    work,
                    &c,
                    &assembly_locations,
                    &mut must_handle,
                );
            }
        }
        CurrentStatus::Wave2 => {
            return Err(PlannerError::UnsupportedCurrentStatus(CurrentStatus::Wave2));
        }
    }

    let response = minimum_end_time(
        solver,
        solver_request,
        waves.w2.start,
        &minimum_time_indices,
        &must_handle,
    )
    .await?;

    let response = response.ok_or_else(|| {
        PlannerError::PlanningRegression(must_handle.iter().filter_map(|&i| indices.work_id(i)).collect::<Vec<WorkId>>())
    })?;

    Ok(SecondOptimizationResult { response, rendezvous })
}

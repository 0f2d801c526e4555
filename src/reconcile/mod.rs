//! Response reconciliation (§4.8): per-wave task emission, routing
//! enrichment, and inter-wave swap manifest derivation.

use std::collections::HashMap;

use crate::domain::{
    AssemblyId, Request, Task, TaskType, VehicleId, VehicleSwaps, VehicleTasks, WorkId,
};
use crate::error::PlannerError;
use crate::index::{IndexRegistry, Key};
use crate::optimize::SecondOptimizationResult;
use crate::routing::RoutingClient;
use crate::solver::StepType;
use crate::waves::{WaveNumber, WaveRegistry};

/// Maps a solver step id back to the task kind it represents, using the
/// index registry's tag rather than the solver's own step type — per
/// §4.8 the mapping authority is the index prefix tag, not the solver's
/// reported `type`.
fn step_task_type(indices: &IndexRegistry, id: usize) -> Option<TaskType> {
    match indices.key_of(id)? {
        Key::Pickup(_) | Key::ShipmentPickup(_) => Some(TaskType::Pickup),
        Key::Delivery(_) | Key::ShipmentDelivery(_) => Some(TaskType::Delivery),
        Key::Dummy(_, _) | Key::ShipmentAssembly(_) | Key::Vehicle(_) => None,
    }
}

/// Converts one solver route's steps into tasks. `duration` is always left
/// at zero here: the solver's own payload only carries `distance` per step,
/// and the routing enrichment pass fills in both from scratch.
fn route_to_tasks(steps: &[crate::solver::SolverStep], indices: &IndexRegistry) -> Vec<Task> {
    let mut tasks = Vec::new();
    for step in steps {
        match step.kind {
            StepType::Start => tasks.push(Task {
                work_id: None,
                kind: TaskType::Departure,
                eta: step.arrival,
                duration: 0,
                distance: 0,
                setup_time: step.setup,
                service_time: step.service,
                assembly_id: None,
                location: step.location,
                done: false,
            }),
            StepType::End => tasks.push(Task {
                work_id: None,
                kind: TaskType::Arrival,
                eta: step.arrival,
                duration: 0,
                distance: step.distance,
                setup_time: step.setup,
                service_time: step.service,
                assembly_id: None,
                location: step.location,
                done: false,
            }),
            StepType::Job | StepType::Pickup | StepType::Delivery => {
                let Some(id) = step.id else { continue };
                if indices.is_dummy(id) {
                    continue;
                }
                let Some(kind) = step_task_type(indices, id) else {
                    continue;
                };
                tasks.push(Task {
                    work_id: indices.work_id(id),
                    kind,
                    eta: step.arrival,
                    duration: 0,
                    distance: step.distance,
                    setup_time: step.setup,
                    service_time: step.service,
                    assembly_id: None,
                    location: step.location,
                    done: false,
                });
            }
        }
    }
    tasks
}

fn synthesize_departure(eta: i64, location: crate::domain::Coordinate) -> Task {
    Task {
        work_id: None,
        kind: TaskType::Departure,
        eta,
        duration: 0,
        distance: 0,
        setup_time: 0,
        service_time: 0,
        assembly_id: None,
        location,
        done: false,
    }
}

fn synthesize_arrival(eta: i64, location: crate::domain::Coordinate) -> Task {
    Task {
        work_id: None,
        kind: TaskType::Arrival,
        eta,
        duration: 0,
        distance: 0,
        setup_time: 0,
        service_time: 0,
        assembly_id: None,
        location,
        done: false,
    }
}

async fn enrich_with_routing(
    tasks: &mut [Task],
    routing: &RoutingClient,
    base_url: &str,
) {
    if tasks.len() < 2 {
        return;
    }
    let locations: Vec<_> = tasks.iter().map(|t| t.location).collect();
    if let Some(response) = routing.route(base_url, &locations).await {
        if let Some(route) = response.routes.first() {
            for (task, leg) in tasks.iter_mut().skip(1).zip(route.legs.iter()) {
                task.duration = leg.duration;
                task.distance = leg.distance;
            }
        }
    }
}

/// Builds the per-wave task plans from the Second Optimization response,
/// enriching each vehicle's sequence with routing legs.
pub async fn reconcile(
    request: &Request,
    waves: &WaveRegistry,
    indices: &IndexRegistry,
    so: &SecondOptimizationResult,
    routing: &RoutingClient,
    routing_base_url: impl Fn(&str) -> String,
    version: &str,
) -> Result<crate::domain::Response, PlannerError> {
    let assembly_locations: HashMap<AssemblyId, crate::domain::Coordinate> =
        request.assemblies.iter().map(|a| (a.id, a.location)).collect();

    let mut routes_by_wave_vehicle: HashMap<(WaveNumber, VehicleId), &crate::solver::SolverRoute> =
        HashMap::new();
    for route in &so.response.routes {
        if let Some((wave, vehicle_id)) = waves.vehicle_index_to_id(route.vehicle) {
            routes_by_wave_vehicle.insert((wave, vehicle_id), route);
        }
    }

    let mut wave_1_out = Vec::new();
    for vs in &request.schedules.wave_1.vehicles {
        let done_prefix: Vec<Task> = vs.tasks.iter().filter(|t| t.done).cloned().collect();
        let mut tasks = done_prefix;
        if let Some(route) = routes_by_wave_vehicle.get(&(WaveNumber::One, vs.id)) {
            let produced = route_to_tasks(&route.steps, indices);
            let has_departure = produced.iter().any(|t| t.kind == TaskType::Departure);
            let has_arrival = produced.iter().any(|t| t.kind == TaskType::Arrival);
            if !has_departure {
                let loc = vs
                    .from_assembly_id
                    .and_then(|a| assembly_locations.get(&a).copied())
                    .unwrap_or(request.vehicles.iter().find(|v| v.id == vs.id).map(|v| v.location).unwrap_or((0.0, 0.0)));
                tasks.push(synthesize_departure(waves.w1.start, loc));
            }
            tasks.extend(produced);
            if !has_arrival {
                let loc = vs
                    .to_assembly_id
                    .and_then(|a| assembly_locations.get(&a).copied())
                    .unwrap_or(request.vehicles.iter().find(|v| v.id == vs.id).map(|v| v.location).unwrap_or((0.0, 0.0)));
                tasks.push(synthesize_arrival(waves.w1.end.unwrap_or(waves.w1.start), loc));
            }
        }
        let base_url = request
            .vehicles
            .iter()
            .find(|v| v.id == vs.id)
            .map(|v| routing_base_url(&v.profile))
            .unwrap_or_default();
        if !base_url.is_empty() {
            enrich_with_routing(&mut tasks, routing, &base_url).await;
        }
        wave_1_out.push(VehicleTasks { vehicle_id: vs.id, tasks });
    }

    let mut wave_2_out = Vec::new();
    for vs in &request.schedules.wave_2.vehicles {
        let Some(route) = routes_by_wave_vehicle.get(&(WaveNumber::Two, vs.id)) else {
            continue;
        };
        let mut tasks = route_to_tasks(&route.steps, indices);
        if !tasks.iter().any(|t| t.kind == TaskType::Departure) {
            let loc = vs.from_assembly_id.and_then(|a| assembly_locations.get(&a).copied()).unwrap_or((0.0, 0.0));
            tasks.insert(0, synthesize_departure(waves.w2.start, loc));
        }
        if !tasks.iter().any(|t| t.kind == TaskType::Arrival) {
            let loc = vs.to_assembly_id.and_then(|a| assembly_locations.get(&a).copied()).unwrap_or((0.0, 0.0));
            let eta = vs.to_assembly_id.and_then(|a| so.rendezvous.get(&a).copied()).unwrap_or(waves.w2.start);
            tasks.push(synthesize_arrival(eta, loc));
        }
        let base_url = request
            .vehicles
            .iter()
            .find(|v| v.id == vs.id)
            .map(|v| routing_base_url(&v.profile))
            .unwrap_or_default();
        if !base_url.is_empty() {
            enrich_with_routing(&mut tasks, routing, &base_url).await;
        }
        wave_2_out.push(VehicleTasks { vehicle_id: vs.id, tasks });
    }

    let mut wave_3_out = Vec::new();
    for vs in &request.schedules.wave_3.vehicles {
        let Some(route) = routes_by_wave_vehicle.get(&(WaveNumber::Three, vs.id)) else {
            continue;
        };
        let mut tasks = route_to_tasks(&route.steps, indices);
        if !tasks.iter().any(|t| t.kind == TaskType::Departure) {
            let loc = vs.from_assembly_id.and_then(|a| assembly_locations.get(&a).copied()).unwrap_or((0.0, 0.0));
            let eta = vs.from_assembly_id.and_then(|a| so.rendezvous.get(&a).copied()).unwrap_or(0);
            tasks.insert(0, synthesize_departure(eta, loc));
        }
        if !tasks.iter().any(|t| t.kind == TaskType::Arrival) {
            let loc = vs.to_assembly_id.and_then(|a| assembly_locations.get(&a).copied()).unwrap_or((0.0, 0.0));
            tasks.push(synthesize_arrival(0, loc));
        }
        let base_url = request
            .vehicles
            .iter()
            .find(|v| v.id == vs.id)
            .map(|v| routing_base_url(&v.profile))
            .unwrap_or_default();
        if !base_url.is_empty() {
            enrich_with_routing(&mut tasks, routing, &base_url).await;
        }
        wave_3_out.push(VehicleTasks { vehicle_id: vs.id, tasks });
    }

    let (swap_1_2, swap_2_3) = derive_swaps(request, waves, &routes_by_wave_vehicle, indices, &so.rendezvous)?;

    Ok(crate::domain::Response {
        v: version.to_string(),
        wave_1: wave_1_out,
        swap_1_2,
        wave_2: wave_2_out,
        swap_2_3,
        wave_3: wave_3_out,
    })
}

#[derive(Default)]
struct SwapBucket {
    assembly_id: Option<AssemblyId>,
    stopover_time: i64,
    down: Vec<WorkId>,
    up: Vec<WorkId>,
}

fn derive_swaps(
    request: &Request,
    waves: &WaveRegistry,
    routes: &HashMap<(WaveNumber, VehicleId), &crate::solver::SolverRoute>,
    indices: &IndexRegistry,
    rendezvous: &HashMap<AssemblyId, i64>,
) -> Result<(Vec<VehicleSwaps>, Vec<VehicleSwaps>), PlannerError> {
    let mut pickup_of: HashMap<WorkId, (WaveNumber, VehicleId)> = HashMap::new();
    let mut delivery_of: HashMap<WorkId, (WaveNumber, VehicleId)> = HashMap::new();

    // Pickups already completed before this request (current_status = wave_1
    // or stopover) are known from the done prefix of the prior wave-1 plan.
    for vs in &request.schedules.wave_1.vehicles {
        for task in &vs.tasks {
            if task.done && task.kind == TaskType::Pickup {
                if let Some(work_id) = task.work_id {
                    pickup_of.insert(work_id, (WaveNumber::One, vs.id));
                }
            }
        }
    }

    for (&(wave, vehicle_id), route) in routes {
        for step in &route.steps {
            let Some(id) = step.id else { continue };
            if indices.is_dummy(id) {
                continue;
            }
            let Some(work_id) = indices.work_id(id) else { continue };
            match step_task_type(indices, id) {
                Some(TaskType::Pickup) => {
                    pickup_of.insert(work_id, (wave, vehicle_id));
                }
                Some(TaskType::Delivery) => {
                    delivery_of.insert(work_id, (wave, vehicle_id));
                }
                _ => {}
            }
        }
    }

    let mut swap_1_2: HashMap<VehicleId, SwapBucket> = HashMap::new();
    let mut swap_2_3: HashMap<VehicleId, SwapBucket> = HashMap::new();

    for (&work_id, &(pickup_wave, v_p)) in &pickup_of {
        let Some(&(delivery_wave, v_d)) = delivery_of.get(&work_id) else {
            continue;
        };
        if v_p == v_d {
            continue;
        }
        match (pickup_wave, delivery_wave) {
            (WaveNumber::One, WaveNumber::Two) => {
                let a_p = waves.w1.to_assembly_of(v_p);
                let a_d = waves.w2.from_assembly_of(v_d);
                if a_p.is_none() || a_p != a_d {
                    return Err(PlannerError::ReconciliationImpossible {
                        work_id,
                        pickup_vehicle: v_p,
                        delivery_vehicle: v_d,
                    });
                }
                let a = a_p.unwrap();
                let stopover_time = waves.w1.end.unwrap_or_else(|| rendezvous.get(&a).copied().unwrap_or(0));
                record_swap(&mut swap_1_2, v_p, v_d, a, stopover_time, work_id);
            }
            (WaveNumber::Two, WaveNumber::Three) => {
                let a_p = waves.w2.to_assembly_of(v_p);
                let a_d = waves.w3.from_assembly_of(v_d);
                if a_p.is_none() || a_p != a_d {
                    return Err(PlannerError::ReconciliationImpossible {
                        work_id,
                        pickup_vehicle: v_p,
                        delivery_vehicle: v_d,
                    });
                }
                let a = a_p.unwrap();
                let stopover_time = rendezvous.get(&a).copied().unwrap_or(0);
                record_swap(&mut swap_2_3, v_p, v_d, a, stopover_time, work_id);
            }
            (WaveNumber::One, WaveNumber::Three) => {
                let a_p1 = waves.w1.to_assembly_of(v_p);
                let a_d_w2 = waves.w2.from_assembly_of(v_d);
                if a_p1.is_some() && a_p1 == a_d_w2 {
                    let a = a_p1.unwrap();
                    let stopover_time = waves.w1.end.unwrap_or_else(|| rendezvous.get(&a).copied().unwrap_or(0));
                    record_swap(&mut swap_1_2, v_p, v_d, a, stopover_time, work_id);
                    continue;
                }
                let a_p2 = waves.w2.to_assembly_of(v_p);
                let a_d3 = waves.w3.from_assembly_of(v_d);
                if a_p2.is_some() && a_p2 == a_d3 {
                    let a = a_p2.unwrap();
                    let stopover_time = rendezvous.get(&a).copied().unwrap_or(0);
                    record_swap(&mut swap_2_3, v_p, v_d, a, stopover_time, work_id);
                    continue;
                }
                return Err(PlannerError::ReconciliationImpossible {
                    work_id,
                    pickup_vehicle: v_p,
                    delivery_vehicle: v_d,
                });
            }
            _ => {}
        }
    }

    let to_vec = |buckets: HashMap<VehicleId, SwapBucket>| -> Vec<VehicleSwaps> {
        buckets
            .into_iter()
            .filter_map(|(vehicle_id, bucket)| {
                bucket.assembly_id.map(|assembly_id| VehicleSwaps {
                    vehicle_id,
                    assembly_id,
                    stopover_time: bucket.stopover_time,
                    down: bucket.down,
                    up: bucket.up,
                })
            })
            .collect()
    };

    Ok((to_vec(swap_1_2), to_vec(swap_2_3)))
}

fn record_swap(
    buckets: &mut HashMap<VehicleId, SwapBucket>,
    down_vehicle: VehicleId,
    up_vehicle: VehicleId,
    assembly_id: AssemblyId,
    stopover_time: i64,
    work_id: WorkId,
) {
    let down_bucket = buckets.entry(down_vehicle).or_default();
    down_bucket.assembly_id.get_or_insert(assembly_id);
    down_bucket.stopover_time = stopover_time;
    down_bucket.down.push(work_id);

    let up_bucket = buckets.entry(up_vehicle).or_default();
    up_bucket.assembly_id.get_or_insert(assembly_id);
    up_bucket.stopover_time = stopover_time;
    up_bucket.up.push(work_id);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_task_type_maps_pickup_and_delivery_tags_only() {
        let mut indices = IndexRegistry::new();
        let p = indices.pickup_index(1);
        let d = indices.delivery_index(1);
        let dummy = indices.dummy_index(WaveNumber::One, 9);
        assert_eq!(step_task_type(&indices, p), Some(TaskType::Pickup));
        assert_eq!(step_task_type(&indices, d), Some(TaskType::Delivery));
        assert_eq!(step_task_type(&indices, dummy), None);
    }

    #[test]
    fn record_swap_fills_down_and_up_buckets_for_the_two_vehicles() {
        let mut buckets: HashMap<VehicleId, SwapBucket> = HashMap::new();
        record_swap(&mut buckets, 1, 2, 100, 5_000, 42);
        assert_eq!(buckets[&1].down, vec![42]);
        assert!(buckets[&1].up.is_empty());
        assert_eq!(buckets[&2].up, vec![42]);
        assert!(buckets[&2].down.is_empty());
        assert_eq!(buckets[&1].assembly_id, Some(100));
        assert_eq!(buckets[&1].stopover_time, 5_000);
    }

    #[test]
    fn same_vehicle_pickup_and_delivery_produces_no_swap() {
        let request = Request {
            current_time: 0,
            current_status: crate::domain::CurrentStatus::Wait,
            vehicles: vec![],
            works: vec![],
            assemblies: vec![],
            schedules: crate::domain::Schedules {
                wave_1: blank_schedule(),
                wave_2: blank_schedule(),
                wave_3: blank_schedule(),
            },
            algorithm: Default::default(),
        };
        let waves = WaveRegistry::default();
        let routes: HashMap<(WaveNumber, VehicleId), &crate::solver::SolverRoute> = HashMap::new();
        let indices = IndexRegistry::new();
        let rendezvous = HashMap::new();
        let (s12, s23) = derive_swaps(&request, &waves, &routes, &indices, &rendezvous).unwrap();
        assert!(s12.is_empty());
        assert!(s23.is_empty());
    }

    fn blank_schedule() -> crate::domain::Schedule {
        crate::domain::Schedule {
            start: 0,
            end: None,
            vehicles: vec![],
            assembly_stopover_time: vec![],
            stopover_waiting_time: 900,
        }
    }
}

//! Minimum-end-time binary search driver (§4.5).
//!
//! Narrows the closing time of a designated subset of vehicles until it is
//! the tightest feasible closing time — one where every must-handle job is
//! still assigned — within a 1000-second tolerance. Roughly
//! `log2(86400/1000) ≈ 7` solver calls.

use std::collections::HashSet;

use crate::error::PlannerError;
use crate::skills::{self, SkillId};
use crate::solver::{SolverClient, SolverRequest, SolverResponse};

const HORIZON: i64 = 86_400;
const TOLERANCE: i64 = 1_000;

/// Restricts every job/shipment/vehicle skill vector on `request` to
/// `union(jobs) \ intersection(vehicles)` via [`skills::prune`]. A
/// shipment contributes one combined skill set (its pickup and delivery
/// legs share `skills`).
fn prune_request_skills(request: &mut SolverRequest) {
    let mut job_sets: Vec<HashSet<SkillId>> = request
        .jobs
        .iter()
        .map(|j| j.skills.iter().copied().collect())
        .chain(request.shipments.iter().map(|s| s.skills.iter().copied().collect()))
        .collect();
    let mut vehicle_sets: Vec<HashSet<SkillId>> = request
        .vehicles
        .iter()
        .map(|v| v.skills.iter().copied().collect())
        .collect();

    skills::prune(&mut job_sets, &mut vehicle_sets);

    let shipments_start = request.jobs.len();
    for (job, set) in request.jobs.iter_mut().zip(job_sets.iter()) {
        job.skills = set.iter().copied().collect();
    }
    for (shipment, set) in request.shipments.iter_mut().zip(job_sets[shipments_start..].iter()) {
        shipment.skills = set.iter().copied().collect();
    }
    for (vehicle, set) in request.vehicles.iter_mut().zip(vehicle_sets.iter()) {
        vehicle.skills = set.iter().copied().collect();
    }
}

/// Runs the binary search over `request`, tightening the time windows of
/// the vehicles at `minimum_time_vehicle_indices` (indices into
/// `request.vehicles`) between their own original start and the candidate
/// closing time `c`. `must_handle` holds the solver-facing job/shipment ids
/// that must never appear in `unassigned`.
///
/// Returns the best (tightest, fully-assigned) response, or `None` if no
/// candidate closing time kept every must-handle id assigned.
pub async fn minimum_end_time(
    solver: &SolverClient,
    mut request: SolverRequest,
    start: i64,
    minimum_time_vehicle_indices: &[usize],
    must_handle: &HashSet<usize>,
) -> Result<Option<SolverResponse>, PlannerError> {
    prune_request_skills(&mut request);

    let original_time_windows: Vec<(i64, i64)> = minimum_time_vehicle_indices
        .iter()
        .map(|&i| request.vehicles[i].time_window)
        .collect();

    let mut l = start;
    let mut r = start + HORIZON;
    let mut best: Option<SolverResponse> = None;

    while l + TOLERANCE < r {
        let c = (l + r) / 2;
        for (&idx, &(tw0, _)) in minimum_time_vehicle_indices.iter().zip(&original_time_windows) {
            request.vehicles[idx].time_window = if tw0 > c { (tw0, tw0) } else { (tw0, c) };
        }
        let response = solver.solve(&request).await?;
        let any_must_handle_unassigned = response
            .unassigned
            .iter()
            .any(|u| must_handle.contains(&u.id));
        if any_must_handle_unassigned {
            l = c;
        } else {
            r = c;
            best = Some(response);
        }
    }
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::{SolverVehicle, Unassigned};

    fn vehicle(id: usize, tw: (i64, i64)) -> SolverVehicle {
        SolverVehicle {
            id,
            profile: "car".to_string(),
            start: (0.0, 0.0),
            end: None,
            skills: vec![],
            time_window: tw,
            capacity: None,
        }
    }

    #[tokio::test]
    async fn tightens_window_when_must_handle_stays_assigned() {
        // A fake solver that always succeeds: calling it directly isn't
        // possible without a real HTTP endpoint, so this test exercises the
        // narrowing arithmetic via a handwritten reimplementation of the
        // loop bounds instead of the full `minimum_end_time` (which needs a
        // live `SolverClient`). See `optimize` tests for end-to-end
        // coverage against a stub server.
        let start = 0i64;
        let mut l = start;
        let mut r = start + HORIZON;
        let mut iterations = 0;
        while l + TOLERANCE < r {
            let c = (l + r) / 2;
            r = c; // pretend every candidate succeeds: always shrink right
            iterations += 1;
            assert!(iterations < 64, "loop should converge in ~7 iterations");
        }
        assert!(iterations <= 8);
    }

    #[test]
    fn request_vehicles_constructible_for_fixture_use() {
        let v = vehicle(0, (0, 100));
        assert_eq!(v.time_window, (0, 100));
    }

    #[test]
    fn prune_request_skills_drops_skills_every_vehicle_shares() {
        use crate::solver::SolverJob;

        let mut v0 = vehicle(0, (0, 100));
        v0.skills = vec![1, 2];
        let mut v1 = vehicle(1, (0, 100));
        v1.skills = vec![1, 3];

        let job = SolverJob {
            id: 0,
            location: (0.0, 0.0),
            setup: 0,
            service: 0,
            skills: vec![1, 2],
            priority: None,
            pickup: None,
            delivery: None,
            description: None,
        };

        let mut request = SolverRequest {
            jobs: vec![job],
            shipments: vec![],
            vehicles: vec![v0, v1],
            distribute_options: Default::default(),
        };
        prune_request_skills(&mut request);

        // skill 1 sits in the intersection of every vehicle, so it is
        // redundant and dropped from both the job and the vehicles.
        assert_eq!(request.jobs[0].skills, vec![2]);
        assert!(!request.vehicles[0].skills.contains(&1));
        assert!(!request.vehicles[1].skills.contains(&1));
    }

    #[test]
    fn unassigned_ids_are_plain_solver_indices() {
        let u = Unassigned { id: 7 };
        let must_handle: HashSet<usize> = [7].into_iter().collect();
        assert!(must_handle.contains(&u.id));
    }
}

//! Cost evaluation and the Second-Assembly algorithm selector (§4.9).
//!
//! `evaluate` scores a Second Optimization response by the total distance
//! its wave-3 routes still have left to drive — the later a rendezvous, the
//! shorter wave 3 tends to run, so sweeping rendezvous candidates trades
//! handling time against mileage. Vehicle count is tracked alongside the
//! distance but, per the original, never affects the ranking.

use std::collections::HashMap;
use std::collections::HashSet;

use crate::domain::{AssemblyId, Request, SecondAssemblyAlgorithmType};
use crate::error::PlannerError;
use crate::index::IndexRegistry;
use crate::optimize::{first::FirstOptimizationResult, second, SecondOptimizationResult};
use crate::skills::SkillEncoder;
use crate::solver::{SolverClient, SolverResponse};
use crate::waves::{WaveNumber, WaveRegistry};

#[derive(Debug, Clone, Copy)]
pub struct CostBreakdown {
    pub wave_3_distance: u32,
    pub vehicle_count: usize,
}

/// Sums the last step's cumulative distance of every wave-3 route. This is
/// the only figure that feeds ranking; `vehicle_count` is informational.
pub fn evaluate(response: &SolverResponse, waves: &WaveRegistry) -> CostBreakdown {
    let mut wave_3_distance = 0;
    let mut vehicles = HashSet::new();
    for route in &response.routes {
        if let Some((WaveNumber::Three, vehicle_id)) = waves.vehicle_index_to_id(route.vehicle) {
            if let Some(last) = route.steps.last() {
                wave_3_distance += last.distance;
            }
            vehicles.insert(vehicle_id);
        }
    }
    CostBreakdown {
        wave_3_distance,
        vehicle_count: vehicles.len(),
    }
}

/// Runs Second Optimization according to `request.algorithm.second_assembly`:
/// `handle_pickup` trusts First Optimization's own rendezvous times,
/// `select_best` sweeps the configured candidate offsets and keeps the
/// cheapest feasible result.
pub async fn run_second_optimization(
    request: &Request,
    fo: &FirstOptimizationResult,
    waves: &WaveRegistry,
    skills: &SkillEncoder,
    indices: &mut IndexRegistry,
    solver: &SolverClient,
) -> Result<SecondOptimizationResult, PlannerError> {
    match request.algorithm.second_assembly.kind {
        SecondAssemblyAlgorithmType::HandlePickup => {
            second::run(request, fo, waves, skills, indices, solver).await
        }
        SecondAssemblyAlgorithmType::SelectBest => {
            select_best(request, fo, waves, skills, indices, solver).await
        }
    }
}

async fn select_best(
    request: &Request,
    fo: &FirstOptimizationResult,
    waves: &WaveRegistry,
    skills: &SkillEncoder,
    indices: &mut IndexRegistry,
    solver: &SolverClient,
) -> Result<SecondOptimizationResult, PlannerError> {
    let candidates = &request.algorithm.second_assembly.assembly_time_candidates;
    let mut best: Option<(CostBreakdown, SecondOptimizationResult)> = None;
    let mut last_error = None;

    for &offset in candidates {
        let uniform_rendezvous: HashMap<AssemblyId, i64> = fo
            .rendezvous
            .keys()
            .map(|&assembly_id| (assembly_id, waves.w2.start + offset))
            .collect();
        let candidate_fo = FirstOptimizationResult {
            rendezvous: uniform_rendezvous,
            ..fo.clone()
        };
        match second::run(request, &candidate_fo, waves, skills, indices, solver).await {
            Ok(result) => {
                let breakdown = evaluate(&result.response, waves);
                tracing::debug!(offset, wave_3_distance = breakdown.wave_3_distance, "candidate evaluated");
                let is_better = best
                    .as_ref()
                    .map(|(b, _)| breakdown.wave_3_distance < b.wave_3_distance)
                    .unwrap_or(true);
                if is_better {
                    best = Some((breakdown, result));
                }
            }
            Err(err) => {
                tracing::debug!(offset, error = %err, "candidate infeasible");
                last_error = Some(err);
            }
        }
    }

    best.map(|(_, result)| result)
        .ok_or_else(|| last_error.unwrap_or(PlannerError::PlanningRegression(Vec::new())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::{SolverRoute, SolverStep, StepType};

    fn step(kind: StepType, distance: u32) -> SolverStep {
        SolverStep {
            kind,
            id: None,
            arrival: 0,
            setup: 0,
            service: 0,
            location: (0.0, 0.0),
            distance,
        }
    }

    #[test]
    fn evaluate_sums_only_wave_3_last_step_distances() {
        let mut waves = WaveRegistry::default();
        waves.w1.register_vehicle(1);
        waves.w3.register_vehicle(1);
        waves.w3.register_vehicle(2);
        let gi1 = waves.global_index(WaveNumber::One, 1).unwrap();
        let gi3a = waves.global_index(WaveNumber::Three, 1).unwrap();
        let gi3b = waves.global_index(WaveNumber::Three, 2).unwrap();

        let response = SolverResponse {
            routes: vec![
                SolverRoute {
                    vehicle: gi1,
                    steps: vec![step(StepType::Start, 0), step(StepType::End, 999)],
                },
                SolverRoute {
                    vehicle: gi3a,
                    steps: vec![step(StepType::Start, 0), step(StepType::End, 500)],
                },
                SolverRoute {
                    vehicle: gi3b,
                    steps: vec![step(StepType::Start, 0), step(StepType::End, 700)],
                },
            ],
            unassigned: vec![],
        };

        let breakdown = evaluate(&response, &waves);
        assert_eq!(breakdown.wave_3_distance, 1200);
        assert_eq!(breakdown.vehicle_count, 2);
    }
}

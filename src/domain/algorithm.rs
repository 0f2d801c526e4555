//! Second-assembly algorithm selector.
//!
//! Chooses between the two strategies `crate::cost` offers for picking a
//! wave-2/wave-3 rendezvous time: take First Optimization's own rendezvous
//! times as-is (`HandlePickup`), or sweep a fixed set of candidate uniform
//! offsets and keep the cheapest feasible one (`SelectBest`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecondAssemblyAlgorithmType {
    HandlePickup,
    SelectBest,
}

/// Default candidate uniform rendezvous offsets, in seconds after wave-2 start.
pub const DEFAULT_ASSEMBLY_TIME_CANDIDATES: [i64; 4] = [7200, 10800, 14400, 18000];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondAssemblyAlgorithm {
    #[serde(rename = "type", default = "default_algorithm_type")]
    pub kind: SecondAssemblyAlgorithmType,
    #[serde(default = "default_assembly_time_candidates")]
    pub assembly_time_candidates: Vec<i64>,
}

fn default_algorithm_type() -> SecondAssemblyAlgorithmType {
    SecondAssemblyAlgorithmType::HandlePickup
}

fn default_assembly_time_candidates() -> Vec<i64> {
    DEFAULT_ASSEMBLY_TIME_CANDIDATES.to_vec()
}

impl Default for SecondAssemblyAlgorithm {
    fn default() -> Self {
        Self {
            kind: default_algorithm_type(),
            assembly_time_candidates: default_assembly_time_candidates(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Algorithm {
    #[serde(default)]
    pub second_assembly: SecondAssemblyAlgorithm,
}

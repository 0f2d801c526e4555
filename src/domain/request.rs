//! The top-level request and response wire types.

use serde::{Deserialize, Serialize};

use super::algorithm::Algorithm;
use super::ids::{AssemblyId, VehicleId, WorkId};
use super::schedule::Schedules;
use super::status::CurrentStatus;
use super::task::Task;
use super::work::{Assembly, Vehicle, Work};

/// The full planning request for one day's pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub current_time: i64,
    #[serde(default = "default_current_status")]
    pub current_status: CurrentStatus,
    pub vehicles: Vec<Vehicle>,
    pub works: Vec<Work>,
    pub assemblies: Vec<Assembly>,
    pub schedules: Schedules,
    #[serde(default)]
    pub algorithm: Algorithm,
}

fn default_current_status() -> CurrentStatus {
    CurrentStatus::Wait
}

/// One vehicle's emitted task sequence for a wave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleTasks {
    pub vehicle_id: VehicleId,
    pub tasks: Vec<Task>,
}

/// The parcels one vehicle hands off (`down`) or receives (`up`) at a given
/// assembly rendezvous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSwaps {
    pub vehicle_id: VehicleId,
    pub assembly_id: AssemblyId,
    pub stopover_time: i64,
    #[serde(default)]
    pub down: Vec<WorkId>,
    #[serde(default)]
    pub up: Vec<WorkId>,
}

/// The full response: per-wave task plans and the two inter-wave swap manifests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub v: String,
    pub wave_1: Vec<VehicleTasks>,
    pub swap_1_2: Vec<VehicleSwaps>,
    pub wave_2: Vec<VehicleTasks>,
    pub swap_2_3: Vec<VehicleSwaps>,
    pub wave_3: Vec<VehicleTasks>,
}

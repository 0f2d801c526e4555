//! Per-vehicle task sequences: the prior-plan input shape and the shape
//! emitted in the response.

use serde::{Deserialize, Serialize};

use super::ids::{AssemblyId, Coordinate, VehicleId, WorkId};
use super::status::TaskType;

/// A single scheduled stop: a pickup, a delivery, or a wave-boundary
/// departure/arrival.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub work_id: Option<WorkId>,
    #[serde(rename = "type")]
    pub kind: TaskType,
    pub eta: i64,
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub distance: u32,
    #[serde(default)]
    pub setup_time: u32,
    #[serde(default)]
    pub service_time: u32,
    #[serde(default)]
    pub assembly_id: Option<AssemblyId>,
    pub location: Coordinate,
    #[serde(default)]
    pub done: bool,
}

/// One vehicle's plan for a single wave: where it starts/ends, which zone it
/// serves, its task sequence so far, and what it loaded/unloaded at the
/// rendezvous opening this wave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSchedule {
    pub id: VehicleId,
    #[serde(default)]
    pub from_assembly_id: Option<AssemblyId>,
    #[serde(default)]
    pub to_assembly_id: Option<AssemblyId>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub up: Vec<WorkId>,
    #[serde(default)]
    pub down: Vec<WorkId>,
    #[serde(default = "default_running")]
    pub running: bool,
}

fn default_running() -> bool {
    true
}

impl VehicleSchedule {
    /// The first task that is not yet `done` and is a pickup or delivery
    /// (i.e. ignores departure/arrival/waiting markers), if any.
    pub fn first_undone_task(&self) -> Option<&Task> {
        self.tasks
            .iter()
            .find(|t| !t.done && matches!(t.kind, TaskType::Pickup | TaskType::Delivery))
    }
}

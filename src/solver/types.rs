//! Wire shapes exchanged with the VRP solver collaborator (§6).

use serde::{Deserialize, Serialize};

use crate::domain::Coordinate;
use crate::skills::SkillId;

#[derive(Debug, Clone, Serialize)]
pub struct SolverJob {
    pub id: usize,
    pub location: Coordinate,
    #[serde(default)]
    pub setup: u32,
    #[serde(default)]
    pub service: u32,
    pub skills: Vec<SkillId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShipmentStep {
    pub id: usize,
    pub location: Coordinate,
    #[serde(default)]
    pub setup: u32,
    #[serde(default)]
    pub service: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SolverShipment {
    pub pickup: ShipmentStep,
    pub delivery: ShipmentStep,
    pub skills: Vec<SkillId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SolverVehicle {
    pub id: usize,
    pub profile: String,
    pub start: Coordinate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<Coordinate>,
    pub skills: Vec<SkillId>,
    pub time_window: (i64, i64),
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomMatrix {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DistributeOptions {
    pub max_vehicle_work_time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equalize_work_time: Option<bool>,
    pub custom_matrix: CustomMatrix,
}

impl Default for DistributeOptions {
    fn default() -> Self {
        Self {
            max_vehicle_work_time: 86_400,
            equalize_work_time: None,
            custom_matrix: CustomMatrix { enabled: true },
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SolverRequest {
    pub jobs: Vec<SolverJob>,
    pub shipments: Vec<SolverShipment>,
    pub vehicles: Vec<SolverVehicle>,
    pub distribute_options: DistributeOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    Start,
    Job,
    Pickup,
    Delivery,
    End,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SolverStep {
    #[serde(rename = "type")]
    pub kind: StepType,
    #[serde(default)]
    pub id: Option<usize>,
    pub arrival: i64,
    #[serde(default)]
    pub setup: u32,
    #[serde(default)]
    pub service: u32,
    pub location: Coordinate,
    #[serde(default)]
    pub distance: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SolverRoute {
    pub vehicle: usize,
    pub steps: Vec<SolverStep>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Unassigned {
    pub id: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SolverResponse {
    #[serde(default)]
    pub routes: Vec<SolverRoute>,
    #[serde(default)]
    pub unassigned: Vec<Unassigned>,
}

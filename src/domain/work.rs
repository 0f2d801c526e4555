//! Work, its pickup/delivery points, and the vehicle/assembly entities.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::ids::{AssemblyId, Coordinate, VehicleId, WorkId};
use super::status::WorkStatus;

/// A capacity vector: named dimensions (e.g. `"volume"`, `"weight"`) to
/// quantities. Works carry an `amount`; vehicles carry an optional
/// `capacity`; the solver accepts both as-is.
pub type Amount = HashMap<String, f64>;

/// One endpoint of a work: where it sits, which zone it belongs to, and the
/// fixed durations a vehicle spends handling it there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkPoint {
    pub location: Coordinate,
    pub group: String,
    #[serde(default)]
    pub setup_time: u32,
    #[serde(default)]
    pub service_time: u32,
}

/// An identified delivery order with a pickup point and a delivery point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Work {
    pub id: WorkId,
    #[serde(default)]
    pub description: Option<String>,
    pub pickup: WorkPoint,
    pub delivery: WorkPoint,
    #[serde(default)]
    pub amount: Amount,
    pub status: WorkStatus,
}

/// A vehicle available to the fleet for the day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub profile: String,
    pub location: Coordinate,
    #[serde(default)]
    pub capacity: Option<Amount>,
}

/// A physical hub where wave boundaries occur and vehicles exchange parcels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Assembly {
    pub id: AssemblyId,
    pub location: Coordinate,
}

//! Closed status/task-kind enums.
//!
//! Per the design notes these are sum types, not flag fields, and every
//! match over them in this crate is exhaustive — the request classifier
//! (`crate::classify`) is the canonical site that reads [`WorkStatus`].

use serde::{Deserialize, Serialize};

use super::ids::{AssemblyId, VehicleId};

/// The lifecycle status of a [`Work`](super::work::Work).
///
/// Evolves `Waiting -> HandlePickup -> Shipped -> HandleDelivery -> Done`,
/// with `Assembly` branching in when a parcel is already sitting at a hub
/// (e.g. a shipment leftover from a previous day or a previous request in
/// the same operating day).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkStatus {
    Waiting,
    Shipped { vehicle_id: VehicleId },
    Assembly { assembly_id: AssemblyId },
    HandlePickup { vehicle_id: VehicleId },
    HandleDelivery { vehicle_id: VehicleId },
    Done,
}

impl WorkStatus {
    /// True once a work has reached its terminal status.
    pub fn is_done(&self) -> bool {
        matches!(self, WorkStatus::Done)
    }
}

/// The kind of a scheduled or emitted task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Pickup,
    Delivery,
    Arrival,
    Departure,
    Waiting,
}

/// Where the request's day currently stands relative to the three waves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrentStatus {
    Wait,
    Wave1,
    Stopover,
    Wave2,
}

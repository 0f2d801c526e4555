//! Wave-level containers: one [`Schedule`] per wave, grouped as [`Schedules`].

use serde::{Deserialize, Serialize};

use super::ids::AssemblyId;
use super::task::VehicleSchedule;

/// A previously-committed closing time for a given assembly hub.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssemblyStopoverTime {
    pub assembly_id: AssemblyId,
    pub stopover_time: i64,
}

/// Default grace period between a wave-2 arrival and its wave-3 departure,
/// in seconds.
pub const DEFAULT_STOPOVER_WAITING_TIME: u32 = 900;

/// One wave's vehicle schedules and timing envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub start: i64,
    #[serde(default)]
    pub end: Option<i64>,
    #[serde(default)]
    pub vehicles: Vec<VehicleSchedule>,
    #[serde(default)]
    pub assembly_stopover_time: Vec<AssemblyStopoverTime>,
    #[serde(default = "default_stopover_waiting_time")]
    pub stopover_waiting_time: u32,
}

fn default_stopover_waiting_time() -> u32 {
    DEFAULT_STOPOVER_WAITING_TIME
}

impl Schedule {
    /// Looks up a previously-committed rendezvous time for an assembly.
    pub fn stopover_time_for(&self, assembly_id: AssemblyId) -> Option<i64> {
        self.assembly_stopover_time
            .iter()
            .find(|a| a.assembly_id == assembly_id)
            .map(|a| a.stopover_time)
    }
}

/// The three waves' schedules together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedules {
    pub wave_1: Schedule,
    pub wave_2: Schedule,
    pub wave_3: Schedule,
}

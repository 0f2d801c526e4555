//! Wire data model: works, vehicles, assemblies, wave schedules, and the
//! top-level request/response shapes.

pub mod algorithm;
pub mod ids;
pub mod priority;
pub mod request;
pub mod schedule;
pub mod status;
pub mod task;
pub mod work;

pub use algorithm::{Algorithm, SecondAssemblyAlgorithm, SecondAssemblyAlgorithmType};
pub use ids::{AssemblyId, Coordinate, VehicleId, WorkId};
pub use request::{Request, Response, VehicleSwaps, VehicleTasks};
pub use schedule::{AssemblyStopoverTime, Schedule, Schedules};
pub use status::{CurrentStatus, TaskType, WorkStatus};
pub use task::{Task, VehicleSchedule};
pub use work::{Amount, Assembly, Vehicle, Work, WorkPoint};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_status_round_trips_through_json() {
        let statuses = vec![
            WorkStatus::Waiting,
            WorkStatus::Shipped { vehicle_id: 7 },
            WorkStatus::Assembly { assembly_id: 3 },
            WorkStatus::HandlePickup { vehicle_id: 1 },
            WorkStatus::HandleDelivery { vehicle_id: 2 },
            WorkStatus::Done,
        ];
        for status in statuses {
            let json = serde_json::to_string(&status).unwrap();
            let back: WorkStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(status, back);
        }
    }

    #[test]
    fn work_status_is_done() {
        assert!(WorkStatus::Done.is_done());
        assert!(!WorkStatus::Waiting.is_done());
    }

    #[test]
    fn algorithm_defaults_to_handle_pickup_with_standard_candidates() {
        let algo = Algorithm::default();
        assert_eq!(
            algo.second_assembly.kind,
            SecondAssemblyAlgorithmType::HandlePickup
        );
        assert_eq!(
            algo.second_assembly.assembly_time_candidates,
            vec![7200, 10800, 14400, 18000]
        );
    }

    #[test]
    fn vehicle_schedule_first_undone_task_skips_departure_and_done() {
        let vs = VehicleSchedule {
            id: 1,
            from_assembly_id: None,
            to_assembly_id: None,
            group: None,
            tasks: vec![
                Task {
                    work_id: None,
                    kind: TaskType::Departure,
                    eta: 0,
                    duration: 0,
                    distance: 0,
                    setup_time: 0,
                    service_time: 0,
                    assembly_id: None,
                    location: (0.0, 0.0),
                    done: true,
                },
                Task {
                    work_id: Some(5),
                    kind: TaskType::Pickup,
                    eta: 10,
                    duration: 0,
                    distance: 0,
                    setup_time: 0,
                    service_time: 0,
                    assembly_id: None,
                    location: (0.0, 0.0),
                    done: true,
                },
                Task {
                    work_id: Some(6),
                    kind: TaskType::Delivery,
                    eta: 20,
                    duration: 0,
                    distance: 0,
                    setup_time: 0,
                    service_time: 0,
                    assembly_id: None,
                    location: (0.0, 0.0),
                    done: false,
                },
            ],
            up: vec![],
            down: vec![],
            running: true,
        };
        let first = vs.first_undone_task().unwrap();
        assert_eq!(first.work_id, Some(6));
    }
}

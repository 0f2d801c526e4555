//! VRP solver collaborator: wire types and HTTP client.

pub mod client;
pub mod types;

pub use client::SolverClient;
pub use types::{
    CustomMatrix, DistributeOptions, ShipmentStep, SolverJob, SolverRequest, SolverResponse,
    SolverRoute, SolverShipment, SolverStep, SolverVehicle, StepType, Unassigned,
};

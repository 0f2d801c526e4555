//! Routing/ETA collaborator: wire types and HTTP client.

pub mod client;
pub mod types;

pub use client::RoutingClient;
pub use types::{RoutingLeg, RoutingResponse, RoutingRoute};

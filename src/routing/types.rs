//! Wire shapes exchanged with the routing/ETA collaborator (§6).

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct RoutingLeg {
    pub duration: u32,
    pub distance: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoutingRoute {
    pub legs: Vec<RoutingLeg>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoutingResponse {
    #[serde(default)]
    pub routes: Vec<RoutingRoute>,
}

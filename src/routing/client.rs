//! HTTP client for the routing/ETA collaborator.
//!
//! Grounded on `dependencies/osrm.py`: a GET against
//! `{base_url}/route/v1/car/{lng,lat;lng,lat;...}` with a fixed parameter
//! set. Per §6, a non-200 here is non-fatal — the caller skips enrichment
//! for that leg rather than failing the request.

use crate::domain::Coordinate;

use super::types::RoutingResponse;

#[derive(Debug, Clone)]
pub struct RoutingClient {
    http: reqwest::Client,
}

impl RoutingClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Requests a route over `coordinates` against `base_url`. Returns
    /// `None` on any transport error or non-200 status; callers should
    /// leave duration/distance at zero in that case.
    pub async fn route(&self, base_url: &str, coordinates: &[Coordinate]) -> Option<RoutingResponse> {
        let encoded = coordinates
            .iter()
            .map(|(lng, lat)| format!("{lng},{lat}"))
            .collect::<Vec<_>>()
            .join(";");
        let url = format!("{base_url}/route/v1/car/{encoded}");
        let response = self
            .http
            .get(&url)
            .query(&[
                ("geometries", "polyline"),
                ("overview", "false"),
                ("generate_hints", "false"),
                ("continue_straight", "false"),
            ])
            .send()
            .await
            .ok()?;
        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "routing leg skipped");
            return None;
        }
        response.json::<RoutingResponse>().await.ok()
    }
}

//! HTTP client for the VRP solver collaborator.
//!
//! Grounded on `dependencies/vroouty.py`: a single POST of the whole
//! request body, base URL from `VROOUTY_URL`. Any non-200 is fatal (§6:
//! "Non-200 is fatal").

use super::types::{SolverRequest, SolverResponse};
use crate::error::PlannerError;

#[derive(Debug, Clone)]
pub struct SolverClient {
    http: reqwest::Client,
    base_url: String,
}

impl SolverClient {
    pub fn new(http: reqwest::Client, base_url: String) -> Self {
        Self { http, base_url }
    }

    pub async fn solve(&self, request: &SolverRequest) -> Result<SolverResponse, PlannerError> {
        let response = self
            .http
            .post(&self.base_url)
            .json(request)
            .send()
            .await
            .map_err(|e| PlannerError::SolverTransport {
                status: 0,
                body: e.to_string(),
            })?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "solver call returned non-200");
            return Err(PlannerError::SolverTransport {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json::<SolverResponse>()
            .await
            .map_err(|e| PlannerError::SolverTransport {
                status: status.as_u16(),
                body: e.to_string(),
            })
    }
}

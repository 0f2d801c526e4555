//! The crate-wide error type and its HTTP status mapping (§7).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response as AxumResponse};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::domain::{AssemblyId, CurrentStatus, VehicleId, WorkId};

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("wave-1-ended request missing required assembly_stopover_time")]
    MissingAssemblyStopoverTime,

    #[error("unsupported current_status combination: {0:?}")]
    UnsupportedCurrentStatus(CurrentStatus),

    #[error("solver call failed: {status}: {body}")]
    SolverTransport { status: u16, body: String },

    #[error("planning regression: must-handle work {0:?} unassigned with no usable fallback plan")]
    PlanningRegression(Vec<WorkId>),

    #[error("cannot reconcile work {work_id}: pickup vehicle {pickup_vehicle} and delivery vehicle {delivery_vehicle} share no assembly")]
    ReconciliationImpossible {
        work_id: WorkId,
        pickup_vehicle: VehicleId,
        delivery_vehicle: VehicleId,
    },

    #[error("assembly {0} has no rendezvous time and cannot be used")]
    MissingRendezvous(AssemblyId),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl PlannerError {
    fn status_code(&self) -> StatusCode {
        match self {
            PlannerError::MissingAssemblyStopoverTime => StatusCode::UNPROCESSABLE_ENTITY,
            PlannerError::UnsupportedCurrentStatus(_) => StatusCode::BAD_REQUEST,
            PlannerError::SolverTransport { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            PlannerError::PlanningRegression(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PlannerError::ReconciliationImpossible { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            PlannerError::MissingRendezvous(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PlannerError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for PlannerError {
    fn into_response(self) -> AxumResponse {
        let status = self.status_code();
        tracing::warn!(error = %self, %status, "request failed");
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_assembly_stopover_time_is_422() {
        let e = PlannerError::MissingAssemblyStopoverTime;
        assert_eq!(e.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn unsupported_current_status_is_400() {
        let e = PlannerError::UnsupportedCurrentStatus(CurrentStatus::Stopover);
        assert_eq!(e.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn solver_transport_failure_is_500() {
        let e = PlannerError::SolverTransport {
            status: 503,
            body: "down".to_string(),
        };
        assert_eq!(e.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

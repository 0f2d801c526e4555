//! Route table and the `/v1/jeju_onul` handler wiring the full pipeline.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::cost;
use crate::domain::{Request, Response};
use crate::error::PlannerError;
use crate::index::IndexRegistry;
use crate::optimize::first;
use crate::reconcile::reconcile;
use crate::skills::SkillEncoder;
use crate::waves::{Wave, WaveRegistry};

use super::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/version", get(version))
        .route("/v1/jeju_onul", post(plan))
        .route("/v2/jeju_onul_before", post(not_implemented))
        .route("/v2/jeju_onul_after", post(not_implemented))
        .route("/v2/auto_pilot", post(not_implemented))
        .with_state(state)
}

async fn version(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "version": state.config.version }))
}

async fn not_implemented() -> StatusCode {
    StatusCode::NOT_IMPLEMENTED
}

async fn plan(
    State(state): State<AppState>,
    Json(request): Json<Request>,
) -> Result<Json<Response>, PlannerError> {
    let waves = WaveRegistry::new(
        Wave::from_schedule(&request.schedules.wave_1),
        Wave::from_schedule(&request.schedules.wave_2),
        Wave::from_schedule(&request.schedules.wave_3),
    );
    let skills = SkillEncoder::build(&waves);
    let mut indices = IndexRegistry::new();

    let fo = first::run(&request, &waves, &skills, &mut indices, &state.solver).await?;
    let so = cost::run_second_optimization(&request, &fo, &waves, &skills, &mut indices, &state.solver).await?;

    let config = state.config.clone();
    let response = reconcile(
        &request,
        &waves,
        &indices,
        &so,
        &state.routing,
        |profile| config.routing_base_url(profile).to_string(),
        &state.config.version,
    )
    .await?;

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let config = crate::config::Config {
            version: "test".to_string(),
            vroouty_url: "http://solver.invalid".to_string(),
            osrm_jeju_url: "http://osrm.invalid".to_string(),
            atlan_wrapper_url: "http://atlan.invalid".to_string(),
        };
        AppState::new(config, reqwest::Client::new())
    }

    #[tokio::test]
    async fn version_endpoint_reports_configured_version() {
        let app = router(test_state());
        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/version")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn v2_routes_are_stubbed_as_not_implemented() {
        let app = router(test_state());
        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .method("POST")
                    .uri("/v2/auto_pilot")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    }
}

//! Health endpoints: basic, detailed, readiness and liveness

use crate::{health::reporter, AppState};
use axum::{extract::State, response::IntoResponse, Json};
use tracing::{info, warn};

/// Basic liveness info. Never runs a check cycle.
pub async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptimeSeconds": state.uptime_seconds(),
        "environment": state.environment,
    }))
}

pub async fn handle_detailed_health(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /health/detailed - Running dependency health checks");

    let report = state.health.check_all().await;
    let (status_code, body) = reporter::render_http(&report);

    if !report.is_healthy() {
        warn!("System health is {}", report.overall_status);
    }

    let body = body
        .with_uptime(state.uptime_seconds())
        .with_environment(&state.environment);

    (status_code, Json(body)).into_response()
}

pub async fn handle_readiness(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /health/ready - Readiness probe");

    let report = state.health.check_readiness().await;
    let (status_code, body) = reporter::render_readiness(&report);

    if let Some(error) = &body.error {
        warn!("Service not ready: {}", error);
    }

    (status_code, Json(body))
}

/// Answers even when every dependency is down.
pub async fn handle_liveness() -> impl IntoResponse {
    let (status_code, body) = reporter::render_liveness();
    (status_code, Json(body))
}

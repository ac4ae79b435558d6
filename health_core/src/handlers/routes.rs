//! Route table and the JSON fallback for unknown paths

use super::health::{handle_detailed_health, handle_health, handle_liveness, handle_readiness};
use crate::AppState;
use axum::{
    extract::State,
    http::{Method, StatusCode, Uri},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/health/detailed", get(handle_detailed_health))
        .route("/health/ready", get(handle_readiness))
        .route("/health/live", get(handle_liveness))
        .fallback(handle_not_found)
}

async fn handle_root(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "name": state.app_name,
        "version": state.version,
        "status": "running",
        "environment": state.environment,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn handle_not_found(method: Method, uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": "Not Found",
            "path": uri.path(),
            "method": method.as_str(),
        })),
    )
}

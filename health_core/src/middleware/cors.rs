//! CORS configuration for the health endpoints

use axum::http::{HeaderName, Method};
use tower_http::cors::{Any, CorsLayer};

/// Health endpoints are read-only and unauthenticated, so any origin may call them.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("accept"),
        ])
        .max_age(std::time::Duration::from_secs(3600))
}

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use health_core::{create_app, health::probe_fn, AppState, CheckError, CheckRegistry, Probe};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::ServiceExt;

fn healthy() -> Arc<dyn Probe> {
    probe_fn(|| async { Ok(()) })
}

fn refused() -> Arc<dyn Probe> {
    probe_fn(|| async { Err(CheckError::connection("connection refused")) })
}

fn hanging() -> Arc<dyn Probe> {
    probe_fn(|| async {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(())
    })
}

fn panicking() -> Arc<dyn Probe> {
    probe_fn(|| async {
        if true {
            panic!("probe bug");
        }
        Ok(())
    })
}

fn app(checks: Vec<(&str, Arc<dyn Probe>, bool)>) -> Router {
    let mut registry = CheckRegistry::new();
    for (name, probe, mandatory) in checks {
        registry
            .register(name, probe, Duration::from_millis(200), mandatory)
            .unwrap();
    }
    create_app(AppState::new(registry).with_environment("test"))
}

async fn get(app: Router, path: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap();
    (status, body)
}

#[tokio::test]
async fn test_all_healthy_returns_200() {
    let app = app(vec![("database", healthy(), true), ("cache", healthy(), false)]);

    let (status, body) = get(app, "/health/detailed").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["overallStatus"], "healthy");
    assert_eq!(body["environment"], "test");
    assert_eq!(body["checks"]["database"]["status"], "healthy");
    assert_eq!(body["checks"]["cache"]["status"], "healthy");
}

#[tokio::test]
async fn test_optional_cache_failure_is_degraded() {
    let app = app(vec![("database", healthy(), true), ("cache", refused(), false)]);

    let (status, body) = get(app, "/health/detailed").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["overallStatus"], "degraded");
    assert_eq!(body["checks"]["database"]["status"], "healthy");
    assert_eq!(body["checks"]["cache"]["status"], "unhealthy");
    assert_eq!(body["checks"]["cache"]["error"], "connection refused");
}

#[tokio::test]
async fn test_mandatory_cache_failure_is_unhealthy() {
    let app = app(vec![("database", healthy(), true), ("cache", refused(), true)]);

    let (status, body) = get(app, "/health/detailed").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["overallStatus"], "unhealthy");
}

#[tokio::test]
async fn test_timed_out_probe_reports_timeout() {
    let app = app(vec![("database", hanging(), true), ("cache", healthy(), false)]);

    let start = Instant::now();
    let (status, body) = get(app, "/health/detailed").await;

    assert!(start.elapsed() < Duration::from_secs(2));
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["checks"]["database"]["error"], "timeout");
    assert_eq!(body["checks"]["database"]["latencyMs"], 200);
    assert_eq!(body["checks"]["cache"]["status"], "healthy");
}

#[tokio::test]
async fn test_everything_down() {
    let app = app(vec![("database", refused(), true), ("cache", refused(), false)]);

    let (status, body) = get(app.clone(), "/health/detailed").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["overallStatus"], "unhealthy");

    let (status, body) = get(app.clone(), "/health/live").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "alive": true }));

    let (status, body) = get(app, "/health/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["ready"], false);
    assert_eq!(body["error"], "database: connection refused");
}

#[tokio::test]
async fn test_readiness_ignores_optional_checks() {
    let app = app(vec![("database", healthy(), true), ("cache", refused(), false)]);

    let (status, body) = get(app, "/health/ready").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "ready": true }));
}

#[tokio::test]
async fn test_liveness_survives_faulty_probe() {
    let app = app(vec![("database", panicking(), true)]);

    let (status, body) = get(app.clone(), "/health/live").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["alive"], true);

    let (status, body) = get(app, "/health/detailed").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["checks"]["database"]["error"], "probe panicked: probe bug");
}

#[tokio::test]
async fn test_basic_health_does_not_run_checks() {
    let app = app(vec![("database", hanging(), true)]);

    let start = Instant::now();
    let (status, body) = get(app, "/health").await;

    assert!(start.elapsed() < Duration::from_millis(150));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["environment"], "test");
    assert!(body["uptimeSeconds"].is_u64());
}

#[tokio::test]
async fn test_root_and_not_found() {
    let app = app(vec![]);

    let (status, body) = get(app.clone(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");

    let (status, body) = get(app, "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
    assert_eq!(body["path"], "/nope");
    assert_eq!(body["method"], "GET");
}

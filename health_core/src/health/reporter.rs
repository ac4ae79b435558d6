//! Renders an [`AggregateReport`] for HTTP callers and for the command line

use super::aggregator::{AggregateReport, HealthStatus};
use super::runner::{CheckResult, CheckStatus};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt::Write;

/// Anything but `Healthy` is a 503 at the HTTP boundary.
pub fn http_status(report: &AggregateReport) -> StatusCode {
    if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

pub fn exit_code(report: &AggregateReport) -> i32 {
    if report.is_healthy() {
        0
    } else {
        1
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedHealth<'a> {
    pub overall_status: HealthStatus,
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<&'a str>,
    pub checks: ChecksByName<'a>,
}

impl<'a> DetailedHealth<'a> {
    pub fn with_uptime(mut self, uptime_seconds: u64) -> Self {
        self.uptime_seconds = Some(uptime_seconds);
        self
    }

    pub fn with_environment(mut self, environment: &'a str) -> Self {
        self.environment = Some(environment);
        self
    }
}

/// Check name -> entry, serialized in registration order.
#[derive(Debug)]
pub struct ChecksByName<'a>(&'a [CheckResult]);

impl Serialize for ChecksByName<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for result in self.0 {
            map.serialize_entry(&result.name, &CheckEntry::from(result))?;
        }
        map.end()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckEntry<'a> {
    status: CheckStatus,
    latency_ms: u64,
    mandatory: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl<'a> From<&'a CheckResult> for CheckEntry<'a> {
    fn from(result: &'a CheckResult) -> Self {
        Self {
            status: result.status,
            latency_ms: result.latency.as_millis() as u64,
            mandatory: result.mandatory,
            error: result.error.as_deref(),
        }
    }
}

pub fn render_http(report: &AggregateReport) -> (StatusCode, DetailedHealth<'_>) {
    let body = DetailedHealth {
        overall_status: report.overall_status,
        generated_at: report.generated_at,
        uptime_seconds: None,
        environment: None,
        checks: ChecksByName(&report.results),
    };

    (http_status(report), body)
}

#[derive(Debug, Serialize)]
pub struct ReadinessBody {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Expects a report built from the mandatory checks only.
pub fn render_readiness(report: &AggregateReport) -> (StatusCode, ReadinessBody) {
    if report.is_healthy() {
        return (StatusCode::OK, ReadinessBody { ready: true, error: None });
    }

    let error = report
        .failures()
        .map(|result| {
            format!(
                "{}: {}",
                result.name,
                result.error.as_deref().unwrap_or("unhealthy")
            )
        })
        .collect::<Vec<_>>()
        .join(", ");

    (
        StatusCode::SERVICE_UNAVAILABLE,
        ReadinessBody {
            ready: false,
            error: Some(error),
        },
    )
}

#[derive(Debug, Serialize)]
pub struct LivenessBody {
    pub alive: bool,
}

pub fn render_liveness() -> (StatusCode, LivenessBody) {
    (StatusCode::OK, LivenessBody { alive: true })
}

pub fn render_text(report: &AggregateReport) -> String {
    let mut out = String::new();

    for result in &report.results {
        let icon = if result.is_healthy() { "✅" } else { "❌" };
        let latency_ms = result.latency.as_millis();
        let _ = match &result.error {
            Some(error) => writeln!(
                out,
                "{} {}: {} - {} ({}ms)",
                icon, result.name, result.status, error, latency_ms
            ),
            None => writeln!(out, "{} {}: {} ({}ms)", icon, result.name, result.status, latency_ms),
        };
    }

    let _ = writeln!(
        out,
        "\n📊 Health Check Summary: {}/{} checks healthy, overall {}",
        report.healthy_count(),
        report.results.len(),
        report.overall_status
    );

    if report.is_healthy() {
        out.push_str("\n✅ All services healthy\n");
    } else {
        out.push_str("\n⚠️  Some services are unhealthy\n");
    }

    out
}

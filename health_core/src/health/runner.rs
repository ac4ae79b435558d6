//! Concurrent execution of probes with per-probe timeouts

use super::probe::ProbeDefinition;
use crate::error::CheckError;
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::task::JoinError;
use tokio::time::{timeout, Instant};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Healthy,
    Unhealthy,
    Unknown,
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckStatus::Healthy => write!(f, "healthy"),
            CheckStatus::Unhealthy => write!(f, "unhealthy"),
            CheckStatus::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub mandatory: bool,
    pub status: CheckStatus,
    pub latency: Duration,
    pub error: Option<String>,
    pub observed_at: DateTime<Utc>,
}

impl CheckResult {
    pub fn healthy(definition: &ProbeDefinition, latency: Duration) -> Self {
        Self::new(definition, CheckStatus::Healthy, latency, None)
    }

    pub fn unhealthy(
        definition: &ProbeDefinition,
        latency: Duration,
        error: impl Into<String>,
    ) -> Self {
        Self::new(definition, CheckStatus::Unhealthy, latency, Some(error.into()))
    }

    pub fn unknown(
        definition: &ProbeDefinition,
        latency: Duration,
        error: impl Into<String>,
    ) -> Self {
        Self::new(definition, CheckStatus::Unknown, latency, Some(error.into()))
    }

    fn new(
        definition: &ProbeDefinition,
        status: CheckStatus,
        latency: Duration,
        error: Option<String>,
    ) -> Self {
        Self {
            name: definition.name.clone(),
            mandatory: definition.mandatory,
            status,
            latency,
            error,
            observed_at: Utc::now(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == CheckStatus::Healthy
    }
}

/// How a single probe run ended.
#[derive(Debug)]
enum Outcome {
    Completed(Result<(), CheckError>),
    TimedOut,
    Faulted(JoinError),
}

/// Runs every probe of a cycle concurrently.
///
/// Stateless: concurrent calls to [`CheckRunner::run_all`] share nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckRunner;

impl CheckRunner {
    pub fn new() -> Self {
        Self
    }

    /// Returns one result per definition, in the order given.
    pub async fn run_all(&self, definitions: &[ProbeDefinition]) -> Vec<CheckResult> {
        let cycle_id = Uuid::new_v4();
        let span = info_span!("check_cycle", %cycle_id, checks = definitions.len());

        async move {
            info!("Running {} health checks", definitions.len());

            // join_all yields in input order, whatever order the probes finish in.
            let results = join_all(definitions.iter().map(run_one)).await;

            let healthy = results.iter().filter(|result| result.is_healthy()).count();
            info!("Health check cycle finished: {}/{} healthy", healthy, results.len());

            results
        }
        .instrument(span)
        .await
    }
}

async fn run_one(definition: &ProbeDefinition) -> CheckResult {
    let probe = definition.probe.clone();
    let start = Instant::now();

    let mut handle = tokio::spawn(async move { probe.check().await });

    let outcome = match timeout(definition.timeout, &mut handle).await {
        Ok(Ok(result)) => Outcome::Completed(result),
        Ok(Err(join_error)) => Outcome::Faulted(join_error),
        Err(_) => {
            // Only our wait is cancelled; anything the probe already handed to a
            // client library may keep running in the background.
            handle.abort();
            Outcome::TimedOut
        }
    };

    let latency = start.elapsed();
    let result = match outcome {
        Outcome::Completed(Ok(())) => CheckResult::healthy(definition, latency),
        Outcome::Completed(Err(err)) => {
            CheckResult::unhealthy(definition, latency, err.to_string())
        }
        Outcome::TimedOut => CheckResult::unhealthy(
            definition,
            definition.timeout,
            CheckError::Timeout.to_string(),
        ),
        Outcome::Faulted(join_error) if join_error.is_panic() => {
            let message = panic_message(join_error.into_panic());
            CheckResult::unhealthy(definition, latency, format!("probe panicked: {}", message))
        }
        Outcome::Faulted(join_error) => CheckResult::unknown(
            definition,
            latency,
            format!("probe was not run to completion: {}", join_error),
        ),
    };

    match result.status {
        CheckStatus::Healthy => {
            info!("Health check '{}' passed in {:?}", result.name, result.latency);
        }
        CheckStatus::Unhealthy if result.mandatory => {
            error!(
                "Health check '{}' failed in {:?}: {}",
                result.name,
                result.latency,
                result.error.as_deref().unwrap_or_default()
            );
        }
        CheckStatus::Unhealthy | CheckStatus::Unknown => {
            warn!(
                "Health check '{}' did not pass in {:?}: {}",
                result.name,
                result.latency,
                result.error.as_deref().unwrap_or_default()
            );
        }
    }

    result
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

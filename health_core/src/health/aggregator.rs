//! Severity policy: reduces per-check results to one overall verdict

use super::runner::CheckResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Degraded => write!(f, "degraded"),
            HealthStatus::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateReport {
    pub overall_status: HealthStatus,
    pub results: Vec<CheckResult>,
    pub generated_at: DateTime<Utc>,
}

impl AggregateReport {
    pub fn is_healthy(&self) -> bool {
        self.overall_status == HealthStatus::Healthy
    }

    pub fn healthy_count(&self) -> usize {
        self.results.iter().filter(|result| result.is_healthy()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(|result| !result.is_healthy())
    }
}

/// Mandatory failure beats optional failure; anything short of
/// `Healthy` counts as a failure, `Unknown` included.
pub fn overall_status(results: &[CheckResult]) -> HealthStatus {
    let mut status = HealthStatus::Healthy;

    for result in results.iter().filter(|result| !result.is_healthy()) {
        if result.mandatory {
            return HealthStatus::Unhealthy;
        }
        status = HealthStatus::Degraded;
    }

    status
}

pub fn aggregate(results: Vec<CheckResult>) -> AggregateReport {
    AggregateReport {
        overall_status: overall_status(&results),
        results,
        generated_at: Utc::now(),
    }
}

//! registry -> runner -> aggregator, one fresh cycle per call

use super::aggregator::{aggregate, AggregateReport};
use super::registry::CheckRegistry;
use super::runner::CheckRunner;

#[derive(Debug, Clone)]
pub struct HealthPipeline {
    registry: CheckRegistry,
    runner: CheckRunner,
}

impl HealthPipeline {
    pub fn new(registry: CheckRegistry) -> Self {
        Self {
            registry,
            runner: CheckRunner::new(),
        }
    }

    pub fn registry(&self) -> &CheckRegistry {
        &self.registry
    }

    /// Every registered check.
    pub async fn check_all(&self) -> AggregateReport {
        let results = self.runner.run_all(self.registry.definitions()).await;
        aggregate(results)
    }

    /// Mandatory checks only.
    pub async fn check_readiness(&self) -> AggregateReport {
        let definitions = self.registry.mandatory_only();
        let results = self.runner.run_all(&definitions).await;
        aggregate(results)
    }
}

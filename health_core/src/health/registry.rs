//! Ordered, append-only set of probe definitions

use super::probe::{Probe, ProbeDefinition};
use crate::error::ConfigError;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct CheckRegistry {
    definitions: Vec<ProbeDefinition>,
}

impl CheckRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        probe: Arc<dyn Probe>,
        timeout: Duration,
        mandatory: bool,
    ) -> Result<&mut Self, ConfigError> {
        let name = name.into();

        if name.trim().is_empty() {
            return Err(ConfigError::InvalidCheck {
                name,
                reason: "name cannot be empty".to_string(),
            });
        }

        if timeout.is_zero() {
            return Err(ConfigError::InvalidCheck {
                name,
                reason: "timeout budget must be greater than 0".to_string(),
            });
        }

        if self.contains(&name) {
            return Err(ConfigError::DuplicateCheck(name));
        }

        tracing::debug!(check = %name, ?timeout, mandatory, "Registered health check");

        self.definitions.push(ProbeDefinition {
            name,
            timeout,
            mandatory,
            probe,
        });

        Ok(self)
    }

    /// Definitions in registration order.
    pub fn definitions(&self) -> &[ProbeDefinition] {
        &self.definitions
    }

    /// The mandatory subset, still in registration order.
    pub fn mandatory_only(&self) -> Vec<ProbeDefinition> {
        self.definitions
            .iter()
            .filter(|definition| definition.mandatory)
            .cloned()
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.iter().any(|definition| definition.name == name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

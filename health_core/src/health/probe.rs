//! Probe contract and the immutable definition the registry stores for each one

use crate::error::CheckError;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub type ProbeResult = std::result::Result<(), CheckError>;

/// A single dependency check.
///
/// Implementations own whatever handle they talk to (pool, client,
/// connection) so the runner never shares state between probes.
#[async_trait::async_trait]
pub trait Probe: Send + Sync {
    async fn check(&self) -> ProbeResult;
}

/// Adapter turning an async closure into a [`Probe`].
pub struct FnProbe<F> {
    check_fn: F,
}

#[async_trait::async_trait]
impl<F, Fut> Probe for FnProbe<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = ProbeResult> + Send + 'static,
{
    async fn check(&self) -> ProbeResult {
        (self.check_fn)().await
    }
}

pub fn probe_fn<F, Fut>(check_fn: F) -> Arc<dyn Probe>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ProbeResult> + Send + 'static,
{
    Arc::new(FnProbe { check_fn })
}

#[derive(Clone)]
pub struct ProbeDefinition {
    pub name: String,
    pub timeout: Duration,
    pub mandatory: bool,
    pub probe: Arc<dyn Probe>,
}

impl fmt::Debug for ProbeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeDefinition")
            .field("name", &self.name)
            .field("timeout", &self.timeout)
            .field("mandatory", &self.mandatory)
            .finish_non_exhaustive()
    }
}

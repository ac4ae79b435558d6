pub mod aggregator;
pub mod pipeline;
pub mod probe;
pub mod registry;
pub mod reporter;
pub mod runner;


pub use aggregator::{aggregate, AggregateReport, HealthStatus};
pub use pipeline::HealthPipeline;
pub use probe::{probe_fn, Probe, ProbeDefinition, ProbeResult};
pub use registry::CheckRegistry;
pub use runner::{CheckResult, CheckRunner, CheckStatus};

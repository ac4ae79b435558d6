//! Standalone health check: probes the database, the cache and the running
//! application once, prints a summary and exits non-zero if anything is unhealthy.

use anyhow::{Context, Result};
use health_core::{cli_registry, health::reporter, AppConfig, Dependencies, HealthPipeline};
use http_server::init_tracing;
use tracing::warn;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("warn");

    let config = AppConfig::load().context("Failed to load configuration")?;
    let deps = Dependencies::from_config(&config).context("Invalid dependency configuration")?;
    let registry = cli_registry(&config, &deps).context("Failed to register health checks")?;

    println!("🏥 Running health checks...\n");

    if let Err(e) = deps.cache.connect().await {
        warn!("Redis connection error: {}", e);
    }

    let report = HealthPipeline::new(registry).check_all().await;

    print!("{}", reporter::render_text(&report));

    deps.database.pool().close().await;

    std::process::exit(reporter::exit_code(&report));
}

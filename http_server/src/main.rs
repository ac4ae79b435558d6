//! Main entry point for the HTTP server binary

use anyhow::{Context, Result};
use health_core::{create_app, run_server, server_registry, AppConfig, AppState, Dependencies};
use http_server::{init_tracing, server_log_level};
use std::net::SocketAddr;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(server_log_level());

    let config = AppConfig::load().context("Failed to load configuration")?;

    info!("Configuration loaded successfully");
    info!("Server will bind to: {}", config.bind_address());
    info!("Environment: {}", config.environment);

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .with_context(|| format!("Invalid bind address: {}", config.bind_address()))?;

    let deps = Dependencies::from_config(&config).context("Invalid dependency configuration")?;
    let registry = server_registry(&config, &deps).context("Failed to register health checks")?;

    info!(
        checks = registry.len(),
        mandatory = registry.mandatory_only().len(),
        "Health checks registered"
    );

    // Startup does not wait for Redis; the cache check reports "Not connected" meanwhile.
    deps.cache.spawn_connect(config.cache.reconnect_interval());

    let state = AppState::new(registry).with_environment(config.environment.clone());
    info!("App: {} v{}", state.app_name, state.version);

    let app = create_app(state);

    run_server(app, addr).await?;

    info!("Server shutdown complete");
    Ok(())
}

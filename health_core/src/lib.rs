//! Dependency health checks for the service: probes, concurrent runner, severity
//! policy, and the HTTP and text renderings built on top of them.

pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod middleware;
pub mod probes;

pub use config::AppConfig;
pub use error::{AppError, CheckError, ConfigError, Result};
pub use handlers::routes::create_routes;
pub use health::{
    aggregate, AggregateReport, CheckRegistry, CheckResult, CheckRunner, CheckStatus,
    HealthPipeline, HealthStatus, Probe, ProbeDefinition,
};
pub use probes::{cli_registry, server_registry, Dependencies};

use axum::Router;
use std::{net::SocketAddr, sync::Arc, time::Instant};
use tokio::signal;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub app_name: String,
    pub version: String,
    pub environment: String,
    pub started_at: Instant,
    pub health: Arc<HealthPipeline>,
}

impl AppState {
    pub fn new(registry: CheckRegistry) -> Self {
        Self {
            app_name: "Dependency Health Service".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "development".to_string(),
            started_at: Instant::now(),
            health: Arc::new(HealthPipeline::new(registry)),
        }
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(create_routes())
        .layer(middleware::cors::cors_layer())
        .layer(middleware::logging::logging_layer())
        .with_state(state)
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<()> {
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}

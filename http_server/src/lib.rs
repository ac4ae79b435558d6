//! Process bootstrap shared by the `server` and `health-check` binaries

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// `RUST_LOG` wins over `default_level`. Logs go to stderr so the
/// health-check report owns stdout.
pub fn init_tracing(default_level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let crates = ["health_core", "http_server", "server", "health_check"]
            .map(|target| format!("{}={}", target, default_level))
            .join(",");
        format!("{},tower_http=info", crates).into()
    });

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    let is_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    if is_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .init();
    }
}

pub fn server_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

//! Observability: tracing init driven by the resolved `logLevel`.

use tracing_subscriber::{prelude::*, EnvFilter};

const CRATES: &[&str] = &["runenv", "runenv_core"];

/// Filter directive for the workspace crates at `log_level`.
/// Unknown or empty levels fall back to `info`.
pub fn filter_for(log_level: &str) -> String {
    let level = match log_level.trim().to_lowercase().as_str() {
        l @ ("trace" | "debug" | "info" | "warn" | "error") => l.to_string(),
        "warning" => "warn".to_string(),
        _ => "info".to_string(),
    };
    CRATES
        .iter()
        .map(|c| format!("{}={}", c, level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize tracing on stderr. `RUST_LOG` takes precedence over `log_level`.
/// Calling it again after a subscriber is installed does nothing.
pub fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_for(log_level)));

    let _ = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    };
}

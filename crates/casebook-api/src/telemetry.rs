//! # Tracing Setup
//!
//! Installs the global `tracing` subscriber. `RUST_LOG` wins when set;
//! otherwise development mode logs at `debug` and everything else at `info`.

use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, LogFormat};

/// Initialize the global subscriber. Call once, early in `main`.
pub fn init(config: &AppConfig) {
    let default_level = if config.environment.is_development() {
        "debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match config.log_format {
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}

//! # casebook-api — Binary Entry Point
//!
//! Loads the environment file, reads configuration, installs tracing and
//! the panic hook, then serves the gateway until Ctrl+C or SIGTERM.

use anyhow::Context;
use casebook_api::config::AppConfig;
use casebook_api::env::{load_env_file, EnvFile};
use casebook_api::routes::table::route_table;
use casebook_api::state::AppState;
use casebook_api::{app_with, supervisor, telemetry};
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Must run before anything reads the process environment.
    let (environment, env_file) = load_env_file()?;

    let config = AppConfig::from_env()?;
    telemetry::init(&config);
    supervisor::install_panic_hook();

    match &env_file {
        EnvFile::Loaded(path) => {
            tracing::info!(path = %path.display(), %environment, "environment file loaded");
        }
        EnvFile::Skipped { path, reason } => {
            tracing::warn!(path = %path.display(), %reason, "environment file not loaded");
        }
    }

    let table = route_table().map_err(|e| {
        tracing::error!("route table rejected: {e}");
        e
    })?;
    for mount in table.entries() {
        tracing::debug!(router = mount.name(), prefixes = ?mount.prefixes(), "mounted");
    }

    let addr = config.socket_addr();
    let state = AppState::with_config(config);
    let app = app_with(table, state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, %environment, "Casebook API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

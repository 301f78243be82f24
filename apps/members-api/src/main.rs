//! Samhandling members API server.
//!
//! Exposes county-scoped list, add and remove operations on Entra ID group
//! membership.

mod app;
mod config;
mod health;
mod logging;
mod openapi;

use samhandling_api::{CountyKeys, MembersState};
use samhandling_graph::GraphDirectory;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

use crate::config::{Config, CONFIG_VARS};
use crate::health::HealthState;

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.rust_log);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        cloud = ?config.cloud,
        "Starting members-api"
    );

    let graph_config = match config.graph_config() {
        Ok(graph_config) => graph_config,
        Err(e) => {
            error!(error = %e, "Invalid Graph configuration");
            std::process::exit(1);
        }
    };

    let directory = match GraphDirectory::connect(&graph_config, config.graph_credentials()) {
        Ok(directory) => directory,
        Err(e) => {
            error!(error = %e, "Failed to create Graph client");
            std::process::exit(1);
        }
    };

    let keys = CountyKeys::from_env_with_prefix(&config.county_key_prefix).excluding(CONFIG_VARS);
    if keys.is_empty() {
        warn!("No county keys configured, every members request will be rejected");
    } else {
        info!(count = keys.len(), "County keys loaded");
    }

    let state = MembersState::new(keys, Arc::new(directory));
    let app = app::build_router(state, Arc::new(HealthState::new()), &config.cors_origins);

    let addr: SocketAddr = match config.bind_addr().parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!(error = %e, bind_addr = %config.bind_addr(), "Invalid bind address");
            std::process::exit(1);
        }
    };

    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, %addr, "Failed to bind");
            std::process::exit(1);
        }
    };

    info!(%addr, "Server listening");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

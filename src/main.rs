//! Idea Vault (v1)
//!
//! A single-user, password-gated note-taking service built with Tokio and
//! Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────┐
//!                      │                   IDEA VAULT                      │
//!                      │                                                   │
//!  Client Request      │  ┌──────────┐   ┌─────────────┐   ┌──────────┐   │
//!  ────────────────────┼─▶│   http   │──▶│  security   │──▶│   api    │   │
//!                      │  │  server  │   │ interceptor │   │ handlers │   │
//!                      │  └──────────┘   └─────────────┘   └────┬─────┘   │
//!                      │                                        │         │
//!                      │                                        ▼         │
//!  Client Response     │  ┌──────────┐   ┌─────────────┐   ┌──────────┐   │
//!  ◀───────────────────┼──│ security │◀──│ rate_limit  │◀──│  store   │   │
//!                      │  │ headers  │   │  (writes)   │   │  (JSON)  │   │
//!                      │  └──────────┘   └─────────────┘   └──────────┘   │
//!                      │                                                   │
//!                      │  ┌─────────────────────────────────────────────┐ │
//!                      │  │           Cross-Cutting Concerns            │ │
//!                      │  │  ┌────────┐ ┌──────┐ ┌──────────┐ ┌──────┐  │ │
//!                      │  │  │ config │ │ auth │ │observa-  │ │life- │  │ │
//!                      │  │  │ reload │ │      │ │ bility   │ │cycle │  │ │
//!                      │  │  └────────┘ └──────┘ └──────────┘ └──────┘  │ │
//!                      │  └─────────────────────────────────────────────┘ │
//!                      └──────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod store;

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::loader::{apply_env_overrides, load_config};
use crate::config::watcher::ConfigWatcher;
use crate::config::VaultConfig;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;

#[derive(Parser)]
#[command(name = "idea-vault", about = "Password-gated idea vault service")]
struct Args {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "idea_vault=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("idea-vault v{} starting", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => {
            let mut config = VaultConfig::default();
            apply_env_overrides(&mut config);
            config
        }
    };

    tracing::info!(
        bind_address = %config.server.bind_address,
        environment = %config.environment,
        data_file = %config.store.data_file,
        "Configuration loaded"
    );

    // Initialize metrics server
    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            crate::observability::metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    // Bind TCP listener
    let listener = TcpListener::bind(&config.server.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    // Watch the config file for hot reloads when one was given. The unused
    // sender keeps the update channel open for the reload task otherwise.
    let mut _idle_tx = None;
    let (config_updates, _watcher_guard) = match &args.config {
        Some(path) => {
            let (guard, updates) = ConfigWatcher::new(path).start()?;
            (updates, Some(guard))
        }
        None => {
            let (tx, updates) = mpsc::unbounded_channel();
            _idle_tx = Some(tx);
            (updates, None)
        }
    };

    // Trigger graceful shutdown on Ctrl+C or SIGTERM
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.trigger();
    });

    // Create and run HTTP server
    let server = HttpServer::new(config)?;
    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}

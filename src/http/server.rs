//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, limits, request ID, interceptor)
//! - Bind server to listener
//! - Apply configuration reloads to the running snapshot
//! - Graceful shutdown via the lifecycle coordinator

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{middleware, Router};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::api;
use crate::config::VaultConfig;
use crate::http::request::RequestIdLayer;
use crate::security::interceptor;
use crate::security::rate_limit::FixedWindowLimiter;
use crate::store::IdeaStore;

/// Application state injected into handlers and the interceptor.
#[derive(Clone)]
pub struct AppState {
    /// Hot-reloadable configuration snapshot.
    pub config: Arc<ArcSwap<VaultConfig>>,
    pub store: IdeaStore,
    pub write_limiter: Arc<FixedWindowLimiter>,
    pub login_limiter: Arc<FixedWindowLimiter>,
    pub started_at: Instant,
}

/// HTTP server for the idea vault.
pub struct HttpServer {
    router: Router,
    state: AppState,
    sweep_interval: Duration,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Loads the idea table from the configured data file; limiter
    /// ceilings and the data file path are fixed for the process lifetime.
    pub fn new(config: VaultConfig) -> Result<Self, std::io::Error> {
        let store = if config.store.data_file.is_empty() {
            IdeaStore::new(None)
        } else {
            IdeaStore::load_from_file(std::path::Path::new(&config.store.data_file))?
        };

        let write_limiter = Arc::new(FixedWindowLimiter::new(
            config.rate_limit.write_ceiling,
            Duration::from_secs(config.rate_limit.write_window_secs),
        ));
        let login_limiter = Arc::new(FixedWindowLimiter::new(
            config.rate_limit.login_ceiling,
            Duration::from_secs(config.rate_limit.login_window_secs),
        ));

        let sweep_interval = Duration::from_secs(config.rate_limit.sweep_interval_secs);

        let state = AppState {
            config: Arc::new(ArcSwap::from_pointee(config.clone())),
            store,
            write_limiter,
            login_limiter,
            started_at: Instant::now(),
        };

        let router = Self::build_router(&config, state.clone());
        Ok(Self {
            router,
            state,
            sweep_interval,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &VaultConfig, state: AppState) -> Router {
        api::routes(state.clone())
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.server.request_timeout_secs,
            )))
            .layer(RequestBodyLimitLayer::new(config.server.max_body_size))
            .layer(middleware::from_fn_with_state(
                state,
                interceptor::intercept,
            ))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Configuration updates arriving on `config_updates` are swapped into
    /// the running snapshot; boot-time settings in a reload are ignored
    /// with a warning. The server drains once `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<VaultConfig>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        self.state.write_limiter.clone().spawn_sweeper(self.sweep_interval);
        self.state.login_limiter.clone().spawn_sweeper(self.sweep_interval);

        spawn_reload_task(self.state.config.clone(), config_updates);

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                crate::lifecycle::shutdown::wait(&mut shutdown).await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Apply configuration reloads to the running snapshot.
fn spawn_reload_task(
    config: Arc<ArcSwap<VaultConfig>>,
    mut updates: mpsc::UnboundedReceiver<VaultConfig>,
) {
    tokio::spawn(async move {
        while let Some(new_config) = updates.recv().await {
            let current = config.load();
            if new_config.server.bind_address != current.server.bind_address {
                tracing::warn!("bind_address changed on reload; restart required to apply");
            }
            if new_config.rate_limit != current.rate_limit {
                tracing::warn!("rate_limit changed on reload; restart required to apply");
            }
            if new_config.store.data_file != current.store.data_file {
                tracing::warn!("store.data_file changed on reload; restart required to apply");
            }
            config.store(Arc::new(new_config));
            tracing::info!("Configuration reloaded");
        }
    });
}

//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router with the proxy and favicon routes
//! - Wire up middleware (tracing, request timeout)
//! - Share the origin fetcher and config with handlers
//! - Serve with graceful shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::fetch::OriginFetcher;
use crate::proxy::{favicon_handler, proxy_handler};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub fetcher: OriginFetcher,
}

/// HTTP server for the image proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    #[allow(deprecated)]
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let fetcher = OriginFetcher::new(&config.fetch)?;
        let timeout = Duration::from_secs(config.listener.request_timeout_secs);
        let state = AppState {
            config: Arc::new(config),
            fetcher,
        };

        let router = Router::new()
            .route("/", get(proxy_handler))
            .route("/favicon.ico", get(favicon_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(timeout))
            .layer(TraceLayer::new_for_http());

        Ok(Self { router })
    }

    /// Run the server until the shutdown future resolves.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Wait for shutdown signal (Ctrl+C).
pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to install Ctrl+C handler");
        return;
    }
    tracing::info!("Shutdown signal received");
}

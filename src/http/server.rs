//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Wrap the registrar's router with the transport middleware
//!   (request id, tracing, timeout)
//! - Bind server to listener
//! - Stop gracefully on the shutdown broadcast or Ctrl+C

use axum::Router;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;

/// HTTP server for a registered router.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Layer `router` for serving under `config`.
    pub fn new(router: Router, config: &ServerConfig) -> Self {
        Self {
            router: Self::build_router(router, config),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(router: Router, config: &ServerConfig) -> Router {
        router
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until `shutdown` fires or Ctrl+C is received.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered router.
    pub fn router(&self) -> &Router {
        &self.router
    }
}

async fn shutdown_signal(mut shutdown: broadcast::Receiver<()>) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = shutdown.recv() => tracing::info!("Shutdown requested"),
        _ = ctrl_c => tracing::info!("Shutdown signal received"),
    }
}

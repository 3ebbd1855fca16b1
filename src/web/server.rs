use crate::config::server::ServerConfig;
use crate::utils::error::{LeadError, Result};
use crate::web::{router, AppState};
use axum::Router;
use tokio::net::TcpListener;

pub struct LeadServer {
    config: ServerConfig,
    state: AppState,
}

impl LeadServer {
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    pub fn build_router(&self) -> Router {
        router(self.state.clone())
    }

    /// Serve until `shutdown_signal` resolves.
    pub async fn serve_with_shutdown<F>(self, shutdown_signal: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_addr();
        let listener = TcpListener::bind(bind_addr)
            .await
            .map_err(|e| LeadError::ServerError {
                message: format!("Failed to bind to {}: {}", bind_addr, e),
            })?;

        tracing::info!("Lead server listening on http://{}", bind_addr);
        tracing::info!("Health check: http://{}/health", bind_addr);

        axum::serve(listener, self.build_router())
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| LeadError::ServerError {
                message: format!("Server error: {}", e),
            })?;

        tracing::info!("Lead server shut down gracefully");
        Ok(())
    }
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
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
            tracing::info!("Received Ctrl+C, shutting down...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        },
    }
}

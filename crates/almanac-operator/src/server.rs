//! Operator HTTP server lifecycle.
//!
//! [`start_server`] binds a TCP port and serves the operator router until
//! the supplied [`CancellationToken`] fires.

use std::net::SocketAddr;
use std::sync::Arc;

use almanac_core::AdminOps;
use almanac_core::config::OperatorConfig;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::router::build_router;

/// Bind address for the operator server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The host address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// The TCP port to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 8080,
        }
    }
}

impl From<&OperatorConfig> for ServerConfig {
    fn from(config: &OperatorConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
        }
    }
}

/// Serve the operator API until `shutdown` is cancelled.
///
/// In-flight requests are allowed to finish once shutdown starts.
///
/// # Errors
///
/// Returns an error if the address is invalid, the listener cannot bind,
/// or the server hits a fatal I/O error.
pub async fn start_server<T>(
    config: &ServerConfig,
    ops: Arc<T>,
    shutdown: CancellationToken,
) -> Result<(), ServerError>
where
    T: AdminOps + 'static,
{
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| ServerError::Bind(format!("invalid address: {e}")))?;

    let router = build_router(ops);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Bind(format!("bind failed on {addr}: {e}")))?;

    info!(%addr, "Operator server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| ServerError::Serve(format!("serve error: {e}")))?;

    info!("Operator server stopped");
    Ok(())
}

/// Errors that can occur when starting or running the operator server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The server encountered a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(String),
}

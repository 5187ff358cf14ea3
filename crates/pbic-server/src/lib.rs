//! HTTP compile service wrapping the pbic core.
//!
//! # Architecture
//!
//! The server consists of:
//! - **Routes**: HTTP handlers for health, compile and the demo pipeline
//! - **Bundle**: response-ZIP assembly with the status manifest
//! - **Diagnostics**: boot-time environment dump
//!
//! The core pipeline itself lives in `pbic-core`; this crate only decodes
//! requests into archive bytes and encodes results into response bundles.

pub mod bundle;
pub mod diagnostics;
pub mod error;
pub mod routes;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use pbic_core::ToolConfig;

pub use error::{ServerError, ServerResult};
pub use routes::{AppState, create_router};

/// Timeout for downloading an archive from a caller-supplied URL.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory holding the demo project served by `/compile/demo`.
    pub demo_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            demo_dir: PathBuf::from("compile-tests/pbit"),
        }
    }
}

/// Start the compile service.
///
/// Tool configuration is read from the environment once at startup; every
/// request then shares the same immutable [`AppState`].
pub async fn serve(config: ServerConfig) -> ServerResult<()> {
    let tool = ToolConfig::from_env();
    diagnostics::log_startup(&config, &tool);

    let http = reqwest::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .build()
        .map_err(|err| ServerError::Internal(format!("Failed to build HTTP client: {err}")))?;

    let state = Arc::new(AppState {
        tool,
        http,
        demo_dir: config.demo_dir.clone(),
    });

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|_| ServerError::Address(format!("{}:{}", config.host, config.port)))?;

    tracing::info!("Starting pbic server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Graceful shutdown on Ctrl+C.
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received shutdown signal");
            let _ = shutdown_tx.send(());
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

//! Diabetes prediction server
//!
//! Serves the prediction form and a JSON prediction endpoint backed by the
//! persisted scaler and classifier.

mod api;
mod error;
mod handlers;
mod state;
pub mod ui;

pub use api::create_router;
pub use error::ServerError;
pub use handlers::PredictionResponse;
pub use state::AppState;

use crate::export::{DEFAULT_MODEL_PATH, DEFAULT_SCALER_PATH};
use crate::inference::Predictor;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
    /// Allowed CORS origin; any origin when `None` or `"*"`
    pub cors_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            scaler_path: PathBuf::from(DEFAULT_SCALER_PATH),
            cors_origin: None,
        }
    }
}

impl ServerConfig {
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_artifacts(mut self, model_path: impl Into<PathBuf>, scaler_path: impl Into<PathBuf>) -> Self {
        self.model_path = model_path.into();
        self.scaler_path = scaler_path.into();
        self
    }

    pub fn with_cors_origin(mut self, origin: Option<String>) -> Self {
        self.cors_origin = origin;
        self
    }
}

/// Load the artifacts, then start the server with the given configuration.
///
/// Artifact failures abort startup before the listener binds.
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let start_time = chrono::Utc::now();
    info!(
        model = %config.model_path.display(),
        scaler = %config.scaler_path.display(),
        "Loading model artifacts"
    );

    let predictor = Predictor::load(&config.model_path, &config.scaler_path)?;

    let state = Arc::new(AppState::new(config.clone(), predictor));
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(
        host = %config.host,
        port = config.port,
        address = %addr,
        started_at = %start_time.to_rfc3339(),
        "Diabetes prediction server starting"
    );
    info!(url = %format!("http://{}", addr), "Prediction form available");
    info!(url = %format!("http://{}/health", addr), "Health endpoint available");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, pid = std::process::id(), "Server listening and ready to accept connections");

    // Graceful shutdown on ctrl+c
    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for ctrl+c, shutting down");
            return;
        }
        let stop_time = chrono::Utc::now();
        let uptime = stop_time.signed_duration_since(start_time);
        info!(
            stopped_at = %stop_time.to_rfc3339(),
            uptime_secs = uptime.num_seconds(),
            "Shutdown signal received, stopping server gracefully"
        );
    };

    info!("Server started successfully (press ctrl+c to stop)");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}

//! HTTP serving layer
//!
//! Thin façade over the inference engine: request validation, the
//! append-only log hookup, and the fire-and-forget drift trigger.

mod api;
mod error;
mod handlers;
mod state;

pub use api::create_router;
pub use error::ServerError;
pub use state::AppState;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use crate::artifacts::ArtifactLayout;
use crate::inference::InferenceEngine;
use crate::monitoring::init_exporter;

/// Server configuration, env-var driven with local defaults
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub artifact_dir: String,
    /// Prometheus exporter address; publishing is disabled when unset
    pub metrics_addr: Option<SocketAddr>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            artifact_dir: std::env::var("ARTIFACT_DIR")
                .unwrap_or_else(|_| "artifacts".to_string()),
            metrics_addr: std::env::var("METRICS_ADDR")
                .ok()
                .and_then(|a| a.parse().ok()),
        }
    }
}

/// Start the prediction service. Fails fast if the model or preprocessor
/// artifact is missing or corrupt: the service must not come up without
/// valid artifacts.
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let start_time = chrono::Utc::now();
    let layout = ArtifactLayout::new(&config.artifact_dir);
    layout.ensure_dirs()?;

    let engine = InferenceEngine::load(&layout)?;
    info!(
        artifact_dir = %config.artifact_dir,
        alpha = engine.model().alpha,
        l1_ratio = engine.model().l1_ratio,
        "Model and preprocessor loaded"
    );

    init_exporter(config.metrics_addr);

    let state = Arc::new(AppState::new(config.clone(), engine, layout));
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        address = %addr,
        started_at = %start_time.to_rfc3339(),
        pid = std::process::id(),
        "Wine quality service listening"
    );

    let shutdown_signal = async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
        let uptime = chrono::Utc::now().signed_duration_since(start_time);
        info!(
            uptime_secs = uptime.num_seconds(),
            "Shutdown signal received, stopping gracefully"
        );
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8080);
        assert!(config.metrics_addr.is_none());
    }
}

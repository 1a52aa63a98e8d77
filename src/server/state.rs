//! Shared application state
//!
//! The service context handed to every request handler: artifacts loaded
//! once, read-only thereafter. Only the inference log mutates, behind its
//! own writer lock.

use crate::artifacts::ArtifactLayout;
use crate::inference::{InferenceEngine, InferenceLog};

use super::ServerConfig;

/// State shared across handlers
pub struct AppState {
    pub config: ServerConfig,
    pub engine: InferenceEngine,
    pub log: InferenceLog,
    pub layout: ArtifactLayout,
}

impl AppState {
    pub fn new(config: ServerConfig, engine: InferenceEngine, layout: ArtifactLayout) -> Self {
        let log = InferenceLog::new(layout.inference_log());
        Self {
            config,
            engine,
            log,
            layout,
        }
    }
}

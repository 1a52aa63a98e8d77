//! vinoml - Wine quality regression, end to end
//!
//! Pipeline stages from raw CSV to a served model:
//! - [`data`] - ingestion, schema validation, profiling
//! - [`preprocessing`] - Yeo-Johnson + standardization, fitted once
//! - [`training`] - ElasticNet with cross-validated grid search
//! - [`evaluation`] - held-out metrics and local run tracking
//!
//! Serving loop:
//! - [`inference`] - loaded-once engine and the append-only inference log
//! - [`drift`] - reference-vs-traffic drift detection and reporting
//! - [`monitoring`] - latency metrics and the drift score gauge
//! - [`server`] - HTTP façade
//!
//! Shared:
//! - [`schema`] - the canonical 11-feature wine schema
//! - [`artifacts`] - artifact store layout
//! - [`error`] - crate error type

pub mod error;

pub mod artifacts;
pub mod schema;

// Pipeline stages
pub mod data;
pub mod evaluation;
pub mod preprocessing;
pub mod training;

// Serving
pub mod drift;
pub mod inference;
pub mod monitoring;
pub mod server;

// Services
pub mod cli;

pub use error::{Result, VinoError};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::artifacts::ArtifactLayout;
    pub use crate::data::{DataIngestion, DataValidation};
    pub use crate::drift::{DriftMonitor, DriftSummary};
    pub use crate::error::{Result, VinoError};
    pub use crate::evaluation::{ModelEvaluation, RegressionMetrics};
    pub use crate::inference::{InferenceEngine, InferenceLog};
    pub use crate::preprocessing::{DataTransformation, WinePreprocessor};
    pub use crate::schema::{WineFeatures, FEATURE_COLUMNS, TARGET_COLUMN};
    pub use crate::server::{create_router, AppState, ServerConfig};
    pub use crate::training::{ModelTrainer, TrainingConfig, WineModel};
}

//! Inference engine
//!
//! Holds the persisted model and preprocessor loaded once at startup and
//! shared read-only across all requests. Prediction is a pure transform:
//! same input and same artifacts always produce the identical output.

use std::sync::Arc;
use std::time::Instant;

use ndarray::Array1;
use polars::prelude::DataFrame;
use serde::Serialize;

use crate::artifacts::ArtifactLayout;
use crate::data::to_feature_matrix;
use crate::error::{Result, VinoError};
use crate::monitoring::{MetricsSummary, PerformanceMetrics};
use crate::preprocessing::WinePreprocessor;
use crate::schema::WineFeatures;
use crate::training::WineModel;

/// Inference statistics snapshot
#[derive(Debug, Clone, Serialize)]
pub struct InferenceStats {
    pub total_predictions: u64,
    pub error_count: u64,
    pub avg_latency_ms: f64,
    pub p50_latency_ms: f64,
    pub p95_latency_ms: f64,
    pub p99_latency_ms: f64,
    pub uptime_secs: f64,
}

impl From<MetricsSummary> for InferenceStats {
    fn from(s: MetricsSummary) -> Self {
        Self {
            total_predictions: s.total_requests,
            error_count: s.total_errors,
            avg_latency_ms: s.avg_latency_ms,
            p50_latency_ms: s.p50_latency_ms,
            p95_latency_ms: s.p95_latency_ms,
            p99_latency_ms: s.p99_latency_ms,
            uptime_secs: s.uptime_secs,
        }
    }
}

/// Loaded model + preprocessor, immutable after construction
pub struct InferenceEngine {
    model: Arc<WineModel>,
    preprocessor: Arc<WinePreprocessor>,
    metrics: Arc<PerformanceMetrics>,
}

impl std::fmt::Debug for InferenceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceEngine")
            .field("features", &self.model.feature_names.len())
            .field("alpha", &self.model.alpha)
            .field("l1_ratio", &self.model.l1_ratio)
            .finish()
    }
}

impl InferenceEngine {
    /// Build from already-loaded artifacts, verifying they agree on the
    /// feature schema.
    pub fn new(model: WineModel, preprocessor: WinePreprocessor) -> Result<Self> {
        if model.feature_names != preprocessor.columns() {
            return Err(VinoError::ArtifactError(format!(
                "Model and preprocessor disagree on the feature schema: {:?} vs {:?}",
                model.feature_names,
                preprocessor.columns()
            )));
        }
        Ok(Self {
            model: Arc::new(model),
            preprocessor: Arc::new(preprocessor),
            metrics: Arc::new(PerformanceMetrics::new(10_000)),
        })
    }

    /// Load both artifacts from the store. Missing or corrupt artifacts are
    /// fatal: the service must not start without them.
    pub fn load(layout: &ArtifactLayout) -> Result<Self> {
        let model = WineModel::load(&layout.model())?;
        let preprocessor = WinePreprocessor::load(&layout.preprocessor())?;
        Self::new(model, preprocessor)
    }

    /// Predict the quality score for one sample
    pub fn predict(&self, features: &WineFeatures) -> Result<f64> {
        let start = Instant::now();
        let result = self.predict_inner(features);
        match &result {
            Ok(_) => self
                .metrics
                .record_latency(start.elapsed().as_secs_f64() * 1000.0),
            Err(_) => self.metrics.record_error(),
        }
        result
    }

    fn predict_inner(&self, features: &WineFeatures) -> Result<f64> {
        let df = features.to_dataframe()?;
        let predictions = self.predict_frame(&df)?;
        predictions
            .first()
            .copied()
            .ok_or_else(|| VinoError::InferenceError("Empty prediction output".to_string()))
    }

    /// Predict for a whole frame in the canonical column order. The
    /// transform step preserves the column names, so the model sees the
    /// same schema it was trained on.
    pub fn predict_frame(&self, df: &DataFrame) -> Result<Array1<f64>> {
        let transformed = self.preprocessor.transform(df)?;
        let x = to_feature_matrix(&transformed)?;
        self.model.predict(&x)
    }

    pub fn stats(&self) -> InferenceStats {
        self.metrics.summary().into()
    }

    pub fn metrics(&self) -> &PerformanceMetrics {
        &self.metrics
    }

    pub fn model(&self) -> &WineModel {
        &self.model
    }
}

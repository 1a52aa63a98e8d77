//! Drift detection
//!
//! Two-sample distribution tests between the training-time reference data
//! and the features seen in production, plus the monitor that runs them
//! per feature and summarizes the share of drifted features.

mod data_drift;
mod monitor;
mod report;

pub use data_drift::{
    DetectorEnsemble, JensenShannonDivergence, KolmogorovSmirnovTest, PopulationStabilityIndex,
};
pub use monitor::{DriftMonitor, DriftSummary, FeatureDrift};
pub use report::render_drift_report;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Outcome of a single two-sample test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftResult {
    /// Whether drift was detected
    pub drift_detected: bool,
    /// Test statistic
    pub score: f64,
    /// Threshold the statistic was compared against
    pub threshold: f64,
}

impl DriftResult {
    pub fn no_drift(score: f64, threshold: f64) -> Self {
        Self {
            drift_detected: false,
            score,
            threshold,
        }
    }

    pub fn drift(score: f64, threshold: f64) -> Self {
        Self {
            drift_detected: true,
            score,
            threshold,
        }
    }
}

/// Two-sample drift test over one feature
pub trait DriftDetector: Send + Sync {
    /// Compare the reference distribution against the current one
    fn detect(&self, reference: &Array1<f64>, current: &Array1<f64>) -> Result<DriftResult>;

    /// Short name used for per-method score reporting
    fn name(&self) -> &'static str;
}

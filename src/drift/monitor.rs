//! Drift monitor
//!
//! Compares the reference training distribution against the inference log,
//! feature by feature, and publishes the share of drifted features. Runs
//! on demand from a background task; a missing log is a skip, not an error.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{render_drift_report, DetectorEnsemble};
use crate::artifacts::ArtifactLayout;
use crate::data::{to_target_array, DataIngestion};
use crate::error::{Result, VinoError};
use crate::monitoring::publish_drift_score;
use crate::schema::{feature_schema_matches, TARGET_COLUMN};

/// Drift outcome for a single feature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureDrift {
    pub name: String,
    pub drifted: bool,
    /// Per-method statistics keyed by detector name
    pub scores: HashMap<String, f64>,
}

/// One completed drift computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftSummary {
    /// Share of drifted features, in [0, 1]
    pub share: f64,
    pub n_features: usize,
    pub n_drifted: usize,
    pub features: Vec<FeatureDrift>,
    pub reference_rows: usize,
    pub current_rows: usize,
    pub computed_at: DateTime<Utc>,
}

impl DriftSummary {
    pub fn drifted_features(&self) -> Vec<&str> {
        self.features
            .iter()
            .filter(|f| f.drifted)
            .map(|f| f.name.as_str())
            .collect()
    }
}

/// On-demand drift computation over the artifact store
#[derive(Debug, Clone)]
pub struct DriftMonitor {
    layout: ArtifactLayout,
}

impl DriftMonitor {
    pub fn new(layout: ArtifactLayout) -> Self {
        Self { layout }
    }

    /// Run one drift check. `Ok(None)` means there is no inference traffic
    /// to compare yet. On success the score is published to the gauge and
    /// the HTML report artifact is rewritten.
    pub fn run(&self) -> Result<Option<DriftSummary>> {
        let log_path = self.layout.inference_log();
        if !log_path.exists() {
            info!("Drift check skipped: no inference log yet");
            return Ok(None);
        }

        let reference = self.load_reference()?;
        let current = self.load_current()?;

        let summary = self.compare(&reference, &current)?;

        publish_drift_score(summary.share);
        let report_path = self.layout.drift_report();
        std::fs::write(&report_path, render_drift_report(&summary))?;

        info!(
            share = summary.share,
            n_drifted = summary.n_drifted,
            n_features = summary.n_features,
            report = %report_path.display(),
            "Drift check completed"
        );
        Ok(Some(summary))
    }

    /// Reference feature distribution: the ingested dataset minus target
    fn load_reference(&self) -> Result<DataFrame> {
        let df = DataIngestion::load_csv(&self.layout.reference_data()).map_err(|e| {
            VinoError::ArtifactError(format!(
                "Cannot load reference dataset {}: {}",
                self.layout.reference_data().display(),
                e
            ))
        })?;
        Ok(df.drop(TARGET_COLUMN)?)
    }

    /// Current feature distribution: the inference log minus the
    /// prediction and timestamp columns
    fn load_current(&self) -> Result<DataFrame> {
        let df = DataIngestion::load_csv(&self.layout.inference_log())?;
        Ok(df.drop("prediction")?.drop("timestamp")?)
    }

    /// Per-feature ensemble voting over two schema-aligned frames
    fn compare(&self, reference: &DataFrame, current: &DataFrame) -> Result<DriftSummary> {
        for (side, df) in [("reference", reference), ("current", current)] {
            if !feature_schema_matches(df) {
                return Err(VinoError::SchemaMismatch {
                    expected: crate::schema::FEATURE_COLUMNS
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                    actual: df
                        .get_column_names()
                        .iter()
                        .map(|s| format!("{} ({})", s, side))
                        .collect(),
                });
            }
        }

        let ensemble = DetectorEnsemble::default();
        let mut features = Vec::with_capacity(reference.width());
        let mut n_drifted = 0;

        for name in reference.get_column_names() {
            let ref_col = to_target_array(reference, name.as_str())?;
            let cur_col = to_target_array(current, name.as_str())?;

            let (drifted, scores) = ensemble.detect(&ref_col, &cur_col)?;
            if drifted {
                n_drifted += 1;
            }
            features.push(FeatureDrift {
                name: name.to_string(),
                drifted,
                scores: scores
                    .into_iter()
                    .map(|(method, score)| (method.to_string(), score))
                    .collect(),
            });
        }

        let n_features = features.len();
        Ok(DriftSummary {
            share: n_drifted as f64 / n_features as f64,
            n_features,
            n_drifted,
            features,
            reference_rows: reference.height(),
            current_rows: current.height(),
            computed_at: Utc::now(),
        })
    }
}

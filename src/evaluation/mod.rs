//! Model evaluation stage
//!
//! Scores the persisted model on the held-out split, writes the metrics
//! artifact, and appends a run record to the local tracking store.

use std::path::Path;

use chrono::{DateTime, Utc};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::artifacts::ArtifactLayout;
use crate::data::{to_feature_matrix, to_target_array, DataIngestion};
use crate::error::{Result, VinoError};
use crate::schema::{FEATURE_COLUMNS, TARGET_COLUMN};
use crate::training::WineModel;

/// Regression quality metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
}

impl RegressionMetrics {
    pub fn compute(actual: &Array1<f64>, predicted: &Array1<f64>) -> Result<Self> {
        if actual.len() != predicted.len() {
            return Err(VinoError::ShapeError {
                expected: format!("{} predictions", actual.len()),
                actual: format!("{} predictions", predicted.len()),
            });
        }
        if actual.is_empty() {
            return Err(VinoError::ValidationError(
                "Cannot score an empty evaluation set".to_string(),
            ));
        }

        let n = actual.len() as f64;
        let residuals = predicted - actual;
        let mse = residuals.mapv(|v| v * v).sum() / n;
        let mae = residuals.mapv(|v| v.abs()).sum() / n;

        let mean = actual.mean().unwrap_or(0.0);
        let ss_tot = actual.mapv(|v| (v - mean).powi(2)).sum();
        let ss_res = residuals.mapv(|v| v * v).sum();
        let r2 = if ss_tot == 0.0 { 1.0 } else { 1.0 - ss_res / ss_tot };

        Ok(Self {
            rmse: mse.sqrt(),
            mae,
            r2,
        })
    }
}

/// One training/evaluation run, tracked locally
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub alpha: f64,
    pub l1_ratio: f64,
    pub metrics: RegressionMetrics,
}

/// Append-only JSON store of run records
#[derive(Debug, Clone)]
pub struct RunStore {
    path: std::path::PathBuf,
}

impl RunStore {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<Vec<RunRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let json = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn append(&self, record: RunRecord) -> Result<()> {
        let mut runs = self.load()?;
        runs.push(record);
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&runs)?)?;
        Ok(())
    }
}

/// Evaluation stage: score on the test split and record the run
#[derive(Debug, Clone)]
pub struct ModelEvaluation {
    layout: ArtifactLayout,
}

impl ModelEvaluation {
    pub fn new(layout: ArtifactLayout) -> Self {
        Self { layout }
    }

    pub fn evaluate(&self) -> Result<RegressionMetrics> {
        let model = WineModel::load(&self.layout.model())?;
        let test_df = DataIngestion::load_csv(&self.layout.test_data())?;

        let features = test_df.select(FEATURE_COLUMNS)?;
        let x = to_feature_matrix(&features)?;
        let y = to_target_array(&test_df, TARGET_COLUMN)?;

        let predicted = model.predict(&x)?;
        let metrics = RegressionMetrics::compute(&y, &predicted)?;

        self.layout.ensure_dirs()?;
        self.save_metrics(&metrics, &self.layout.evaluation_metrics())?;

        let record = RunRecord {
            id: Uuid::new_v4().to_string()[..8].to_string(),
            created_at: Utc::now(),
            alpha: model.alpha,
            l1_ratio: model.l1_ratio,
            metrics: metrics.clone(),
        };
        RunStore::new(self.layout.run_records()).append(record)?;

        info!(
            rmse = metrics.rmse,
            mae = metrics.mae,
            r2 = metrics.r2,
            "Model evaluated on held-out split"
        );
        Ok(metrics)
    }

    fn save_metrics(&self, metrics: &RegressionMetrics, path: &Path) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(metrics)?)?;
        Ok(())
    }
}

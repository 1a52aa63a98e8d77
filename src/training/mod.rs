//! Model training stage
//!
//! Trains an ElasticNet on the transformed train split, choosing alpha and
//! l1 ratio by cross-validated grid search, and persists the result as the
//! model artifact the serving stack loads.

mod cross_validation;
mod elastic_net;

pub use cross_validation::{grid_search_elastic_net, GridSearchResult, KFold};
pub use elastic_net::ElasticNet;

use std::path::Path;

use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::artifacts::ArtifactLayout;
use crate::data::{to_feature_matrix, to_target_array};
use crate::error::{Result, VinoError};
use crate::schema::{FEATURE_COLUMNS, TARGET_COLUMN};

/// Hyperparameter search space and CV settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub alphas: Vec<f64>,
    pub l1_ratios: Vec<f64>,
    pub cv_folds: usize,
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            alphas: vec![0.01, 0.1, 1.0, 10.0],
            l1_ratios: vec![0.1, 0.5, 0.7, 0.9, 0.95, 0.99, 1.0],
            cv_folds: 5,
            seed: 42,
        }
    }
}

/// Persisted trained model: immutable after load, shared read-only across
/// all concurrent prediction requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WineModel {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub alpha: f64,
    pub l1_ratio: f64,
    pub feature_names: Vec<String>,
    pub trained_at: DateTime<Utc>,
}

impl WineModel {
    /// Predict quality scores for a feature matrix in training column order
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if x.ncols() != self.coefficients.len() {
            return Err(VinoError::ShapeError {
                expected: format!("{} features", self.coefficients.len()),
                actual: format!("{} features", x.ncols()),
            });
        }
        let w = Array1::from_vec(self.coefficients.clone());
        Ok(x.dot(&w) + self.intercept)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            VinoError::ArtifactError(format!(
                "Cannot read model from {}: {}",
                path.display(),
                e
            ))
        })?;
        let model: Self = serde_json::from_str(&json).map_err(|e| {
            VinoError::ArtifactError(format!(
                "Corrupt model artifact at {}: {}",
                path.display(),
                e
            ))
        })?;
        if model.coefficients.len() != model.feature_names.len() {
            return Err(VinoError::ArtifactError(format!(
                "Model at {} has {} coefficients for {} features",
                path.display(),
                model.coefficients.len(),
                model.feature_names.len()
            )));
        }
        Ok(model)
    }
}

/// Trains on the transformed train split and persists the model artifact
#[derive(Debug, Clone)]
pub struct ModelTrainer {
    layout: ArtifactLayout,
    config: TrainingConfig,
}

impl ModelTrainer {
    pub fn new(layout: ArtifactLayout, config: TrainingConfig) -> Self {
        Self { layout, config }
    }

    /// Grid-search hyperparameters, refit on the full train split with the
    /// winners, and save the model artifact.
    pub fn train(&self) -> Result<(WineModel, GridSearchResult)> {
        let train_df = crate::data::DataIngestion::load_csv(&self.layout.train_data())?;
        let features = train_df.select(FEATURE_COLUMNS)?;
        let x = to_feature_matrix(&features)?;
        let y = to_target_array(&train_df, TARGET_COLUMN)?;

        let best = grid_search_elastic_net(
            &x,
            &y,
            &self.config.alphas,
            &self.config.l1_ratios,
            self.config.cv_folds,
            self.config.seed,
        )?;
        info!(
            alpha = best.alpha,
            l1_ratio = best.l1_ratio,
            mean_mse = best.mean_mse,
            "Grid search selected hyperparameters"
        );

        let mut net = ElasticNet::new(best.alpha, best.l1_ratio);
        net.fit(&x, &y)?;

        let model = WineModel {
            coefficients: net
                .coefficients
                .as_ref()
                .ok_or(VinoError::ModelNotFitted)?
                .to_vec(),
            intercept: net.intercept.unwrap_or(0.0),
            alpha: best.alpha,
            l1_ratio: best.l1_ratio,
            feature_names: FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
            trained_at: Utc::now(),
        };

        self.layout.ensure_dirs()?;
        model.save(&self.layout.model())?;
        info!(path = %self.layout.model().display(), "Model artifact saved");

        Ok((model, best))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn tiny_model() -> WineModel {
        WineModel {
            coefficients: vec![2.0, -1.0],
            intercept: 0.5,
            alpha: 0.1,
            l1_ratio: 0.5,
            feature_names: vec!["a".to_string(), "b".to_string()],
            trained_at: Utc::now(),
        }
    }

    #[test]
    fn test_predict_linear_combination() {
        let model = tiny_model();
        let x = array![[1.0, 1.0], [2.0, 0.0]];
        let p = model.predict(&x).unwrap();
        assert!((p[0] - 1.5).abs() < 1e-12);
        assert!((p[1] - 4.5).abs() < 1e-12);
    }

    #[test]
    fn test_predict_width_mismatch() {
        let model = tiny_model();
        let x = array![[1.0, 2.0, 3.0]];
        assert!(matches!(
            model.predict(&x),
            Err(VinoError::ShapeError { .. })
        ));
    }

    #[test]
    fn test_save_load_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("model.json");
        let model = tiny_model();
        model.save(&path).unwrap();

        let loaded = WineModel::load(&path).unwrap();
        assert_eq!(loaded.coefficients, model.coefficients);
        assert_eq!(loaded.intercept, model.intercept);
        assert_eq!(loaded.feature_names, model.feature_names);
    }

    #[test]
    fn test_load_corrupt_artifact() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("model.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            WineModel::load(&path),
            Err(VinoError::ArtifactError(_))
        ));
    }
}

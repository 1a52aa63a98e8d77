//! Artifact store layout
//!
//! Every stage reads and writes artifacts under one root directory. The
//! layout is stable across retrain/redeploy cycles: the serving stack and
//! the pipeline stages agree on these paths and nothing else.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Filesystem layout of all persisted artifacts
#[derive(Debug, Clone)]
pub struct ArtifactLayout {
    root: PathBuf,
}

impl Default for ArtifactLayout {
    fn default() -> Self {
        let root = std::env::var("ARTIFACT_DIR").unwrap_or_else(|_| "artifacts".to_string());
        Self::new(root)
    }
}

impl ArtifactLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Raw reference dataset (training distribution, target included)
    pub fn reference_data(&self) -> PathBuf {
        self.root.join("data_ingestion").join("data.csv")
    }

    pub fn train_data(&self) -> PathBuf {
        self.root.join("data_transformation").join("train.csv")
    }

    pub fn test_data(&self) -> PathBuf {
        self.root.join("data_transformation").join("test.csv")
    }

    /// Fitted preprocessor (power transform + scaler parameters)
    pub fn preprocessor(&self) -> PathBuf {
        self.root.join("data_transformation").join("preprocessor.json")
    }

    /// Trained model artifact
    pub fn model(&self) -> PathBuf {
        self.root.join("model_trainer").join("model.json")
    }

    pub fn evaluation_metrics(&self) -> PathBuf {
        self.root.join("model_evaluation").join("metrics.json")
    }

    pub fn validation_status(&self) -> PathBuf {
        self.root.join("data_validation").join("status.txt")
    }

    /// Rendered data-profiling report
    pub fn profiling_report(&self) -> PathBuf {
        self.root.join("data_validation").join("report.html")
    }

    /// Append-only inference log
    pub fn inference_log(&self) -> PathBuf {
        self.root.join("predictions").join("inference_log.csv")
    }

    /// Last rendered drift report
    pub fn drift_report(&self) -> PathBuf {
        self.root.join("predictions").join("drift_report.html")
    }

    /// Training run records
    pub fn run_records(&self) -> PathBuf {
        self.root.join("runs").join("runs.json")
    }

    /// Create every stage directory up front
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [
            "data_ingestion",
            "data_validation",
            "data_transformation",
            "model_trainer",
            "model_evaluation",
            "predictions",
            "runs",
        ] {
            std::fs::create_dir_all(self.root.join(dir))?;
        }
        Ok(())
    }
}

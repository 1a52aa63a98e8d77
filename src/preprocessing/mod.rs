//! Data transformation stage
//!
//! The fitted preprocessor applied before every prediction: a Yeo-Johnson
//! power transform followed by standardization, fitted on the training
//! split only. At serving time the preprocessor is transform-only: it is
//! never refitted, and its column schema must match the input exactly.

mod scaler;
mod transforms;

pub use scaler::StandardScaler;
pub use transforms::PowerTransform;

use std::path::Path;

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::artifacts::ArtifactLayout;
use crate::data::DataIngestion;
use crate::error::{Result, VinoError};
use crate::schema::{FEATURE_COLUMNS, TARGET_COLUMN};

/// Fitted power-transform + scaler pipeline over a fixed column schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WinePreprocessor {
    power: PowerTransform,
    scaler: StandardScaler,
    columns: Vec<String>,
    is_fitted: bool,
}

impl WinePreprocessor {
    /// Create an unfitted preprocessor for the given column schema
    pub fn new(columns: &[&str]) -> Self {
        Self {
            power: PowerTransform::new(),
            scaler: StandardScaler::new(),
            columns: columns.iter().map(|s| s.to_string()).collect(),
            is_fitted: false,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Fit both stages on the training split. The scaler is fitted on the
    /// power-transformed data, matching the order the stages run in at
    /// transform time.
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        self.check_schema(df)?;
        let cols: Vec<&str> = self.columns.iter().map(|s| s.as_str()).collect();

        let powered = self.power.fit_transform(df, &cols)?;
        self.scaler.fit(&powered, &cols)?;
        self.is_fitted = true;
        Ok(self)
    }

    /// Apply the fitted pipeline. Deterministic: no state is updated.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(VinoError::ModelNotFitted);
        }
        self.check_schema(df)?;

        let powered = self.power.transform(df)?;
        let scaled = self.scaler.transform(&powered)?;

        // Reselect so the output column order is the trained order
        let cols: Vec<&str> = self.columns.iter().map(|s| s.as_str()).collect();
        Ok(scaled.select(cols)?)
    }

    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Require the input to carry exactly the trained columns, in order
    fn check_schema(&self, df: &DataFrame) -> Result<()> {
        let actual: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        if actual != self.columns {
            return Err(VinoError::SchemaMismatch {
                expected: self.columns.clone(),
                actual,
            });
        }
        Ok(())
    }

    /// Persist the fitted parameters as JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a fitted preprocessor from JSON
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            VinoError::ArtifactError(format!(
                "Cannot read preprocessor from {}: {}",
                path.display(),
                e
            ))
        })?;
        let preprocessor: Self = serde_json::from_str(&json).map_err(|e| {
            VinoError::ArtifactError(format!(
                "Corrupt preprocessor artifact at {}: {}",
                path.display(),
                e
            ))
        })?;
        if !preprocessor.is_fitted {
            return Err(VinoError::ArtifactError(format!(
                "Preprocessor at {} was saved unfitted",
                path.display()
            )));
        }
        Ok(preprocessor)
    }
}

/// Transformation stage: split the raw dataset, fit the preprocessor on
/// the train side only, and persist the transformed splits plus the fitted
/// preprocessor artifact.
#[derive(Debug, Clone)]
pub struct DataTransformation {
    layout: ArtifactLayout,
    test_fraction: f64,
    seed: u64,
}

impl DataTransformation {
    pub fn new(layout: ArtifactLayout) -> Self {
        Self {
            layout,
            test_fraction: 0.2,
            seed: 42,
        }
    }

    pub fn with_split(mut self, test_fraction: f64, seed: u64) -> Self {
        self.test_fraction = test_fraction;
        self.seed = seed;
        self
    }

    pub fn run(&self, df: &DataFrame) -> Result<WinePreprocessor> {
        let (train, test) = DataIngestion::train_test_split(df, self.test_fraction, self.seed)?;

        let train_x = train.select(FEATURE_COLUMNS)?;
        let test_x = test.select(FEATURE_COLUMNS)?;

        let mut preprocessor = WinePreprocessor::new(&FEATURE_COLUMNS);
        let mut train_out = preprocessor.fit_transform(&train_x)?;
        let mut test_out = preprocessor.transform(&test_x)?;

        // Re-attach the untransformed target to both splits
        train_out.with_column(
            train
                .column(TARGET_COLUMN)?
                .as_materialized_series()
                .clone(),
        )?;
        test_out.with_column(test.column(TARGET_COLUMN)?.as_materialized_series().clone())?;

        self.layout.ensure_dirs()?;
        write_csv(&self.layout.train_data(), &mut train_out)?;
        write_csv(&self.layout.test_data(), &mut test_out)?;
        preprocessor.save(&self.layout.preprocessor())?;

        info!(
            train_rows = train_out.height(),
            test_rows = test_out.height(),
            preprocessor = %self.layout.preprocessor().display(),
            "Transformed splits and preprocessor saved"
        );
        Ok(preprocessor)
    }
}

fn write_csv(path: &std::path::Path, df: &mut DataFrame) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    CsvWriter::new(&mut file).finish(df)?;
    Ok(())
}

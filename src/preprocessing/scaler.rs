//! Standard (z-score) feature scaling

use crate::error::{Result, VinoError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parameters learned for one column
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScalerParams {
    mean: f64,
    std: f64,
}

/// Standard scaler: (x - mean) / std with training-time parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    params: HashMap<String, ScalerParams>,
    is_fitted: bool,
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardScaler {
    pub fn new() -> Self {
        Self {
            params: HashMap::new(),
            is_fitted: false,
        }
    }

    /// Fitted (mean, std) for a column, if any
    pub fn params(&self, column: &str) -> Option<(f64, f64)> {
        self.params.get(column).map(|p| (p.mean, p.std))
    }

    /// Compute per-column mean and standard deviation
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| VinoError::FeatureNotFound(col_name.to_string()))?;
            let series = column
                .as_materialized_series()
                .cast(&DataType::Float64)
                .map_err(|e| VinoError::DataError(e.to_string()))?;
            let ca = series.f64().map_err(|e| VinoError::DataError(e.to_string()))?;

            let mean = ca.mean().unwrap_or(0.0);
            let std = ca.std(1).unwrap_or(1.0);
            self.params.insert(
                col_name.to_string(),
                ScalerParams {
                    mean,
                    std: if std == 0.0 { 1.0 } else { std },
                },
            );
        }
        self.is_fitted = true;
        Ok(self)
    }

    /// Transform every fitted column present in `df`.
    /// Builds all replacement columns first, then applies them in one pass.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(VinoError::ModelNotFitted);
        }

        let replacements: Vec<Series> = self
            .params
            .iter()
            .filter_map(|(col_name, params)| {
                df.column(col_name).ok().map(|column| {
                    let series = column.as_materialized_series();
                    scale_series(series, params)
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut result = df.clone();
        for scaled in replacements {
            result
                .with_column(scaled)
                .map_err(|e| VinoError::DataError(e.to_string()))?;
        }
        Ok(result)
    }

    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }
}

fn scale_series(series: &Series, params: &ScalerParams) -> Result<Series> {
    let name = series.name().clone();
    let casted = series
        .cast(&DataType::Float64)
        .map_err(|e| VinoError::DataError(e.to_string()))?;
    let scaled: Float64Chunked = casted
        .f64()
        .map_err(|e| VinoError::DataError(e.to_string()))?
        .into_iter()
        .map(|opt| opt.map(|v| (v - params.mean) / params.std))
        .collect();
    Ok(scaled.with_name(name).into_series())
}

//! Yeo-Johnson power transform
//!
//! Fitted per column: the lambda maximizing the profile log-likelihood is
//! found by grid search over [-2, 2]. Transform is stateless after fit and
//! is applied with the exact lambdas learned at training time.

use crate::data::column_to_f64;
use crate::error::{Result, VinoError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Yeo-Johnson transform with per-column fitted lambdas
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerTransform {
    lambdas: HashMap<String, f64>,
    is_fitted: bool,
}

impl Default for PowerTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerTransform {
    pub fn new() -> Self {
        Self {
            lambdas: HashMap::new(),
            is_fitted: false,
        }
    }

    /// Fitted lambda for a column, if any
    pub fn lambda(&self, column: &str) -> Option<f64> {
        self.lambdas.get(column).copied()
    }

    /// Estimate lambdas for the given columns
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        for col_name in columns {
            let values = column_to_f64(df, col_name)?;
            if values.is_empty() {
                return Err(VinoError::PreprocessingError(format!(
                    "Cannot fit power transform on empty column '{}'",
                    col_name
                )));
            }
            let lambda = estimate_lambda(&values);
            self.lambdas.insert(col_name.to_string(), lambda);
        }
        self.is_fitted = true;
        Ok(self)
    }

    /// Apply the fitted transform to every fitted column present in `df`
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(VinoError::ModelNotFitted);
        }

        let replacements: Vec<Series> = self
            .lambdas
            .iter()
            .filter_map(|(col_name, &lambda)| {
                df.column(col_name).ok().map(|column| {
                    let series = column.as_materialized_series();
                    transform_series(series, lambda)
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut result = df.clone();
        for transformed in replacements {
            result
                .with_column(transformed)
                .map_err(|e| VinoError::DataError(e.to_string()))?;
        }
        Ok(result)
    }

    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }
}

fn transform_series(series: &Series, lambda: f64) -> Result<Series> {
    let name = series.name().clone();
    let casted = series
        .cast(&DataType::Float64)
        .map_err(|e| VinoError::DataError(e.to_string()))?;
    let values: Float64Chunked = casted
        .f64()
        .map_err(|e| VinoError::DataError(e.to_string()))?
        .into_iter()
        .map(|opt| opt.map(|x| transform_value(x, lambda)))
        .collect();
    Ok(values.with_name(name).into_series())
}

/// Yeo-Johnson transform for a single value
pub fn transform_value(x: f64, lambda: f64) -> f64 {
    if x >= 0.0 {
        if lambda.abs() < 1e-10 {
            (x + 1.0).ln()
        } else {
            ((x + 1.0).powf(lambda) - 1.0) / lambda
        }
    } else if (lambda - 2.0).abs() < 1e-10 {
        -((-x + 1.0).ln())
    } else {
        -(((-x + 1.0).powf(2.0 - lambda) - 1.0) / (2.0 - lambda))
    }
}

/// Grid-search the lambda maximizing the profile log-likelihood
fn estimate_lambda(values: &[f64]) -> f64 {
    let mut best_lambda = 1.0;
    let mut best_ll = f64::NEG_INFINITY;

    for lambda_int in -20..=20 {
        let lambda = lambda_int as f64 * 0.1;
        let ll = log_likelihood(values, lambda);
        if ll > best_ll {
            best_ll = ll;
            best_lambda = lambda;
        }
    }

    best_lambda
}

fn log_likelihood(values: &[f64], lambda: f64) -> f64 {
    let n = values.len() as f64;

    let transformed: Vec<f64> = values.iter().map(|&x| transform_value(x, lambda)).collect();

    let mean = transformed.iter().sum::<f64>() / n;
    let variance = transformed.iter().map(|&t| (t - mean).powi(2)).sum::<f64>() / n;
    if variance <= 0.0 {
        return f64::NEG_INFINITY;
    }

    let log_jacobian: f64 = values.iter().map(|&x| (x.abs() + 1.0).ln().copysign(x)).sum();

    -n / 2.0 * variance.ln() + (lambda - 1.0) * log_jacobian
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_at_lambda_one() {
        // lambda = 1 leaves non-negative values unchanged
        assert!((transform_value(3.0, 1.0) - 3.0).abs() < 1e-12);
        assert!((transform_value(0.0, 1.0) - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_log_branch_at_lambda_zero() {
        assert!((transform_value(1.0, 0.0) - 2.0_f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_negative_branch() {
        // lambda = 2 on negative input takes the log branch
        let y = transform_value(-1.0, 2.0);
        assert!((y + 2.0_f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_fit_reduces_skew() {
        // Heavily right-skewed data should get a lambda below 1
        let skewed: Vec<f64> = (1..=200).map(|i| (i as f64 / 10.0).exp()).collect();
        let df = DataFrame::new(vec![Series::new("x".into(), &skewed).into()]).unwrap();

        let mut pt = PowerTransform::new();
        pt.fit(&df, &["x"]).unwrap();
        assert!(pt.lambda("x").unwrap() < 1.0);
    }

    #[test]
    fn test_transform_requires_fit() {
        let df = DataFrame::new(vec![Series::new("x".into(), &[1.0, 2.0]).into()]).unwrap();
        let pt = PowerTransform::new();
        assert!(pt.transform(&df).is_err());
    }
}

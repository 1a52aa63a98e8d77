//! Data ingestion and validation stages, plus shared frame helpers

mod ingestion;
mod validation;

pub use ingestion::DataIngestion;
pub use validation::{ColumnProfile, DataValidation};

use ndarray::{Array1, Array2};
use polars::prelude::*;

use crate::error::{Result, VinoError};

/// Extract one column as f64 values, casting integer columns as needed
/// (CSV schema inference may type whole-numbered measurements as integers).
/// Nulls become NaN so row indices stay aligned.
pub fn column_to_f64(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .map_err(|_| VinoError::FeatureNotFound(name.to_string()))?;
    let series = column
        .as_materialized_series()
        .cast(&DataType::Float64)
        .map_err(|e| VinoError::DataError(e.to_string()))?;
    let values = series
        .f64()
        .map_err(|e| VinoError::DataError(e.to_string()))?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect();
    Ok(values)
}

/// Convert a DataFrame into a row-major matrix, column order preserved
pub fn to_feature_matrix(df: &DataFrame) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = df.width();
    let mut data = vec![0.0_f64; n_rows * n_cols];

    for (j, name) in df.get_column_names().iter().enumerate() {
        let values = column_to_f64(df, name.as_str())?;
        for (i, v) in values.into_iter().enumerate() {
            data[i * n_cols + j] = v;
        }
    }

    Array2::from_shape_vec((n_rows, n_cols), data).map_err(|e| {
        VinoError::ShapeError {
            expected: format!("{}x{}", n_rows, n_cols),
            actual: e.to_string(),
        }
    })
}

/// Extract one column as a 1-D array
pub fn to_target_array(df: &DataFrame, name: &str) -> Result<Array1<f64>> {
    Ok(Array1::from_vec(column_to_f64(df, name)?))
}

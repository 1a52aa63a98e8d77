//! ElasticNet regression via coordinate descent
//!
//! L1 + L2 regularized least squares. The solver centers the data when
//! fitting an intercept, cycles coordinates with soft-threshold updates,
//! and keeps the residual vector current incrementally.

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VinoError};

/// ElasticNet linear model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElasticNet {
    pub coefficients: Option<Array1<f64>>,
    pub intercept: Option<f64>,
    /// Overall regularization strength
    pub alpha: f64,
    /// Mix between L1 (1.0) and L2 (0.0)
    pub l1_ratio: f64,
    pub max_iter: usize,
    pub tol: f64,
    pub is_fitted: bool,
}

impl Default for ElasticNet {
    fn default() -> Self {
        Self::new(1.0, 0.5)
    }
}

impl ElasticNet {
    pub fn new(alpha: f64, l1_ratio: f64) -> Self {
        Self {
            coefficients: None,
            intercept: None,
            alpha,
            l1_ratio: l1_ratio.clamp(0.0, 1.0),
            max_iter: 1000,
            tol: 1e-6,
            is_fitted: false,
        }
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Soft-threshold operator for the L1 proximal step
    fn soft_threshold(val: f64, threshold: f64) -> f64 {
        if val > threshold {
            val - threshold
        } else if val < -threshold {
            val + threshold
        } else {
            0.0
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();
        if n_samples != y.len() {
            return Err(VinoError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(VinoError::TrainingError("Empty training set".to_string()));
        }

        // Center so the intercept drops out of the coordinate updates
        let x_mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| VinoError::TrainingError("Cannot compute feature means".to_string()))?;
        let y_mean = y.mean().unwrap_or(0.0);
        let x_c = x - &x_mean.clone().insert_axis(Axis(0));
        let y_c = y - y_mean;

        let col_norms: Vec<f64> = (0..n_features)
            .map(|j| x_c.column(j).mapv(|v| v * v).sum())
            .collect();

        let n = n_samples as f64;
        let l1_penalty = self.alpha * self.l1_ratio * n;
        let l2_penalty = self.alpha * (1.0 - self.l1_ratio) * n;

        let mut w: Array1<f64> = Array1::zeros(n_features);

        for _iter in 0..self.max_iter {
            let w_old = w.clone();

            // Residual kept current across coordinate updates
            let mut r = &y_c - &x_c.dot(&w);

            for j in 0..n_features {
                let denom = col_norms[j] + l2_penalty;
                if denom < 1e-15 {
                    w[j] = 0.0;
                    continue;
                }
                let rho = x_c.column(j).dot(&r) + col_norms[j] * w[j];
                let old_wj = w[j];
                w[j] = Self::soft_threshold(rho, l1_penalty) / denom;
                if (old_wj - w[j]).abs() > 0.0 {
                    r = r + &(&x_c.column(j) * (old_wj - w[j]));
                }
            }

            let diff = (&w - &w_old).mapv(|v| v.abs()).sum();
            if diff < self.tol {
                break;
            }
        }

        self.intercept = Some(y_mean - w.dot(&x_mean));
        self.coefficients = Some(w);
        self.is_fitted = true;
        Ok(self)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let w = self.coefficients.as_ref().ok_or(VinoError::ModelNotFitted)?;
        if x.ncols() != w.len() {
            return Err(VinoError::ShapeError {
                expected: format!("{} features", w.len()),
                actual: format!("{} features", x.ncols()),
            });
        }
        Ok(x.dot(w) + self.intercept.unwrap_or(0.0))
    }

    /// Coefficient of determination on the given data
    pub fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        let p = self.predict(x)?;
        let ym = y.mean().unwrap_or(0.0);
        let ss_res = (&p - y).mapv(|v| v * v).sum();
        let ss_tot = y.mapv(|v| (v - ym).powi(2)).sum();
        Ok(if ss_tot == 0.0 { 1.0 } else { 1.0 - ss_res / ss_tot })
    }
}

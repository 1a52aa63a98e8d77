//! K-fold cross validation and hyperparameter grid search

use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use super::elastic_net::ElasticNet;
use crate::error::{Result, VinoError};

/// Seeded k-fold index splitter
#[derive(Debug, Clone)]
pub struct KFold {
    pub n_splits: usize,
    pub seed: u64,
}

impl KFold {
    pub fn new(n_splits: usize, seed: u64) -> Self {
        Self {
            n_splits: n_splits.max(2),
            seed,
        }
    }

    /// Produce (train, validation) index pairs covering all samples
    pub fn split(&self, n_samples: usize) -> Result<Vec<(Vec<usize>, Vec<usize>)>> {
        if n_samples < self.n_splits {
            return Err(VinoError::TrainingError(format!(
                "Cannot split {} samples into {} folds",
                n_samples, self.n_splits
            )));
        }

        let mut indices: Vec<usize> = (0..n_samples).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        indices.shuffle(&mut rng);

        let fold_size = n_samples / self.n_splits;
        let remainder = n_samples % self.n_splits;

        let mut splits = Vec::with_capacity(self.n_splits);
        let mut start = 0;
        for fold in 0..self.n_splits {
            // Spread the remainder over the first folds
            let size = fold_size + usize::from(fold < remainder);
            let end = start + size;
            let validation: Vec<usize> = indices[start..end].to_vec();
            let train: Vec<usize> = indices[..start]
                .iter()
                .chain(indices[end..].iter())
                .copied()
                .collect();
            splits.push((train, validation));
            start = end;
        }
        Ok(splits)
    }
}

/// Winning hyperparameters of a grid search
#[derive(Debug, Clone, serde::Serialize)]
pub struct GridSearchResult {
    pub alpha: f64,
    pub l1_ratio: f64,
    pub mean_mse: f64,
}

fn take_rows(x: &Array2<f64>, indices: &[usize]) -> Array2<f64> {
    x.select(Axis(0), indices)
}

fn take_values(y: &Array1<f64>, indices: &[usize]) -> Array1<f64> {
    Array1::from_iter(indices.iter().map(|&i| y[i]))
}

/// Cross-validated grid search over alpha × l1_ratio, scored by mean
/// validation MSE. Grid cells evaluate in parallel; ties resolve to the
/// earliest grid cell so results are reproducible.
pub fn grid_search_elastic_net(
    x: &Array2<f64>,
    y: &Array1<f64>,
    alphas: &[f64],
    l1_ratios: &[f64],
    n_splits: usize,
    seed: u64,
) -> Result<GridSearchResult> {
    if alphas.is_empty() || l1_ratios.is_empty() {
        return Err(VinoError::TrainingError("Empty search grid".to_string()));
    }

    let folds = KFold::new(n_splits, seed).split(x.nrows())?;

    let grid: Vec<(f64, f64)> = alphas
        .iter()
        .flat_map(|&a| l1_ratios.iter().map(move |&l| (a, l)))
        .collect();

    let scored: Vec<Result<GridSearchResult>> = grid
        .par_iter()
        .map(|&(alpha, l1_ratio)| {
            let mut total = 0.0;
            for (train_idx, val_idx) in &folds {
                let x_train = take_rows(x, train_idx);
                let y_train = take_values(y, train_idx);
                let x_val = take_rows(x, val_idx);
                let y_val = take_values(y, val_idx);

                let mut model = ElasticNet::new(alpha, l1_ratio);
                model.fit(&x_train, &y_train)?;
                let pred = model.predict(&x_val)?;
                let mse = (&pred - &y_val).mapv(|v| v * v).sum() / y_val.len() as f64;
                total += mse;
            }
            Ok(GridSearchResult {
                alpha,
                l1_ratio,
                mean_mse: total / folds.len() as f64,
            })
        })
        .collect();

    let mut best: Option<GridSearchResult> = None;
    for result in scored {
        let result = result?;
        let better = match &best {
            Some(b) => result.mean_mse < b.mean_mse,
            None => true,
        };
        if better {
            best = Some(result);
        }
    }
    best.ok_or_else(|| VinoError::TrainingError("Grid search produced no result".to_string()))
}

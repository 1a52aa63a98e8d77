//! Two-sample data drift tests

use std::cmp::Ordering;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::{DriftDetector, DriftResult};
use crate::error::{Result, VinoError};

fn sort_values(data: &Array1<f64>) -> Vec<f64> {
    let mut sorted: Vec<f64> = data.iter().copied().collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}

/// Kolmogorov-Smirnov two-sample test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KolmogorovSmirnovTest {
    /// Significance level (alpha)
    alpha: f64,
}

impl KolmogorovSmirnovTest {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha: alpha.clamp(0.001, 0.5),
        }
    }

    /// Approximate critical value for the two-sample statistic
    fn critical_value(&self, n1: usize, n2: usize) -> f64 {
        let c_alpha = match self.alpha {
            a if a <= 0.01 => 1.63,
            a if a <= 0.05 => 1.36,
            a if a <= 0.10 => 1.22,
            _ => 1.07,
        };
        c_alpha * ((n1 + n2) as f64 / (n1 * n2) as f64).sqrt()
    }

    fn ecdf(sorted: &[f64], x: f64) -> f64 {
        let count = sorted.iter().filter(|&&v| v <= x).count();
        count as f64 / sorted.len() as f64
    }
}

impl Default for KolmogorovSmirnovTest {
    fn default() -> Self {
        Self::new(0.05)
    }
}

impl DriftDetector for KolmogorovSmirnovTest {
    fn detect(&self, reference: &Array1<f64>, current: &Array1<f64>) -> Result<DriftResult> {
        if reference.is_empty() || current.is_empty() {
            return Err(VinoError::ValidationError(
                "Empty sample passed to KS test".to_string(),
            ));
        }

        let ref_sorted = sort_values(reference);
        let cur_sorted = sort_values(current);

        let mut combined: Vec<f64> = ref_sorted
            .iter()
            .chain(cur_sorted.iter())
            .copied()
            .collect();
        combined.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        combined.dedup();

        // Maximum absolute gap between the two empirical CDFs
        let statistic = combined
            .iter()
            .map(|&x| (Self::ecdf(&ref_sorted, x) - Self::ecdf(&cur_sorted, x)).abs())
            .fold(0.0, f64::max);

        let threshold = self.critical_value(reference.len(), current.len());
        if statistic > threshold {
            Ok(DriftResult::drift(statistic, threshold))
        } else {
            Ok(DriftResult::no_drift(statistic, threshold))
        }
    }

    fn name(&self) -> &'static str {
        "ks"
    }
}

/// Population Stability Index over reference-derived quantile bins
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationStabilityIndex {
    n_bins: usize,
    threshold: f64,
}

impl PopulationStabilityIndex {
    pub fn new(n_bins: usize) -> Self {
        Self {
            n_bins: n_bins.max(5),
            threshold: 0.2,
        }
    }

    fn bin_edges(&self, sorted: &[f64]) -> Vec<f64> {
        let mut edges = Vec::with_capacity(self.n_bins + 1);
        edges.push(f64::NEG_INFINITY);
        for i in 1..self.n_bins {
            let idx = (i * sorted.len()) / self.n_bins;
            edges.push(sorted[idx]);
        }
        edges.push(f64::INFINITY);
        edges
    }

    fn proportions(&self, data: &[f64], edges: &[f64]) -> Vec<f64> {
        let n = data.len() as f64;
        let mut counts = vec![0usize; self.n_bins];
        for &value in data {
            for i in 0..self.n_bins {
                if value > edges[i] && value <= edges[i + 1] {
                    counts[i] += 1;
                    break;
                }
            }
        }
        // Floor at a small epsilon so the log term stays finite
        counts
            .iter()
            .map(|&c| (c as f64 / n).max(0.0001))
            .collect()
    }
}

impl Default for PopulationStabilityIndex {
    fn default() -> Self {
        Self::new(10)
    }
}

impl DriftDetector for PopulationStabilityIndex {
    fn detect(&self, reference: &Array1<f64>, current: &Array1<f64>) -> Result<DriftResult> {
        if reference.is_empty() || current.is_empty() {
            return Err(VinoError::ValidationError(
                "Empty sample passed to PSI".to_string(),
            ));
        }

        let ref_sorted = sort_values(reference);
        let cur_vec: Vec<f64> = current.iter().copied().collect();

        let edges = self.bin_edges(&ref_sorted);
        let ref_props = self.proportions(&ref_sorted, &edges);
        let cur_props = self.proportions(&cur_vec, &edges);

        let psi: f64 = ref_props
            .iter()
            .zip(cur_props.iter())
            .map(|(&p_ref, &p_cur)| (p_cur - p_ref) * (p_cur / p_ref).ln())
            .sum();

        if psi > self.threshold {
            Ok(DriftResult::drift(psi, self.threshold))
        } else {
            Ok(DriftResult::no_drift(psi, self.threshold))
        }
    }

    fn name(&self) -> &'static str {
        "psi"
    }
}

/// Jensen-Shannon divergence between histogram estimates, normalized to [0, 1]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JensenShannonDivergence {
    n_bins: usize,
    threshold: f64,
}

impl JensenShannonDivergence {
    pub fn new(threshold: f64) -> Self {
        Self {
            n_bins: 20,
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    fn histogram(&self, data: &[f64], min_val: f64, max_val: f64) -> Vec<f64> {
        let bin_width = (max_val - min_val) / self.n_bins as f64;
        let mut counts = vec![0usize; self.n_bins];
        let n = data.len() as f64;

        for &value in data {
            let bin = ((value - min_val) / bin_width).floor() as usize;
            counts[bin.min(self.n_bins - 1)] += 1;
        }

        let epsilon = 1e-10;
        counts.iter().map(|&c| (c as f64 / n) + epsilon).collect()
    }

    fn kl_divergence(p: &[f64], q: &[f64]) -> f64 {
        p.iter()
            .zip(q.iter())
            .map(|(&pi, &qi)| if pi > 0.0 { pi * (pi / qi).ln() } else { 0.0 })
            .sum()
    }
}

impl Default for JensenShannonDivergence {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl DriftDetector for JensenShannonDivergence {
    fn detect(&self, reference: &Array1<f64>, current: &Array1<f64>) -> Result<DriftResult> {
        if reference.is_empty() || current.is_empty() {
            return Err(VinoError::ValidationError(
                "Empty sample passed to JS divergence".to_string(),
            ));
        }

        let ref_min = reference.iter().cloned().fold(f64::INFINITY, f64::min);
        let ref_max = reference.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let cur_min = current.iter().cloned().fold(f64::INFINITY, f64::min);
        let cur_max = current.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        let min_val = ref_min.min(cur_min);
        let max_val = ref_max.max(cur_max);
        if (max_val - min_val).abs() < 1e-10 {
            return Ok(DriftResult::no_drift(0.0, self.threshold));
        }

        let ref_vec: Vec<f64> = reference.iter().copied().collect();
        let cur_vec: Vec<f64> = current.iter().copied().collect();
        let p = self.histogram(&ref_vec, min_val, max_val);
        let q = self.histogram(&cur_vec, min_val, max_val);

        let m: Vec<f64> = p
            .iter()
            .zip(q.iter())
            .map(|(&pi, &qi)| (pi + qi) / 2.0)
            .collect();
        let js = (Self::kl_divergence(&p, &m) + Self::kl_divergence(&q, &m)) / 2.0;
        let normalized = js / 2.0_f64.ln();

        if normalized > self.threshold {
            Ok(DriftResult::drift(normalized, self.threshold))
        } else {
            Ok(DriftResult::no_drift(normalized, self.threshold))
        }
    }

    fn name(&self) -> &'static str {
        "js"
    }
}

/// Majority-vote ensemble of the three tests. A feature is flagged when at
/// least two methods agree.
pub struct DetectorEnsemble {
    detectors: Vec<Box<dyn DriftDetector>>,
    min_votes: usize,
}

impl Default for DetectorEnsemble {
    fn default() -> Self {
        Self {
            detectors: vec![
                Box::new(KolmogorovSmirnovTest::default()),
                Box::new(PopulationStabilityIndex::default()),
                Box::new(JensenShannonDivergence::default()),
            ],
            min_votes: 2,
        }
    }
}

impl DetectorEnsemble {
    /// Run every method and vote. Returns the decision plus per-method
    /// scores keyed by detector name.
    pub fn detect(
        &self,
        reference: &Array1<f64>,
        current: &Array1<f64>,
    ) -> Result<(bool, Vec<(&'static str, f64)>)> {
        let mut votes = 0;
        let mut scores = Vec::with_capacity(self.detectors.len());
        for detector in &self.detectors {
            let result = detector.detect(reference, current)?;
            if result.drift_detected {
                votes += 1;
            }
            scores.push((detector.name(), result.score));
        }
        Ok((votes >= self.min_votes, scores))
    }
}

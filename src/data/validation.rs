//! Data validation: schema checking and the profiling report

use std::path::PathBuf;

use polars::prelude::*;
use tracing::{info, warn};

use crate::artifacts::ArtifactLayout;
use crate::data::column_to_f64;
use crate::error::Result;
use crate::schema::{FEATURE_COLUMNS, TARGET_COLUMN};

/// Summary statistics for one column of the raw dataset
#[derive(Debug, Clone, serde::Serialize)]
pub struct ColumnProfile {
    pub name: String,
    pub count: usize,
    pub n_missing: usize,
    pub n_distinct: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnProfile {
    fn from_values(name: &str, values: &[f64]) -> Self {
        let n_missing = values.iter().filter(|v| v.is_nan()).count();
        let mut clean: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        clean.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let n = clean.len();
        if n == 0 {
            return Self {
                name: name.to_string(),
                count: values.len(),
                n_missing,
                n_distinct: 0,
                mean: f64::NAN,
                std: f64::NAN,
                min: f64::NAN,
                q25: f64::NAN,
                median: f64::NAN,
                q75: f64::NAN,
                max: f64::NAN,
            };
        }

        let mean = clean.iter().sum::<f64>() / n as f64;
        let variance = clean.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / n as f64;

        let mut distinct = clean.clone();
        distinct.dedup();

        let quantile = |q: f64| clean[((q * (n - 1) as f64).round() as usize).min(n - 1)];

        Self {
            name: name.to_string(),
            count: values.len(),
            n_missing,
            n_distinct: distinct.len(),
            mean,
            std: variance.sqrt(),
            min: clean[0],
            q25: quantile(0.25),
            median: quantile(0.5),
            q75: quantile(0.75),
            max: clean[n - 1],
        }
    }
}

/// Schema validation plus profiling-report generation for the raw dataset
#[derive(Debug, Clone)]
pub struct DataValidation {
    layout: ArtifactLayout,
}

impl DataValidation {
    pub fn new(layout: ArtifactLayout) -> Self {
        Self { layout }
    }

    /// Check that the dataset carries exactly the expected columns
    /// (11 features + target). The outcome is written to the status file.
    pub fn validate_all_columns(&self, df: &DataFrame) -> Result<bool> {
        let expected: Vec<&str> = FEATURE_COLUMNS
            .iter()
            .copied()
            .chain(std::iter::once(TARGET_COLUMN))
            .collect();
        let actual: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let unknown: Vec<&String> = actual
            .iter()
            .filter(|c| !expected.contains(&c.as_str()))
            .collect();
        let missing: Vec<&&str> = expected
            .iter()
            .filter(|c| !actual.iter().any(|a| a == **c))
            .collect();

        let status = unknown.is_empty() && missing.is_empty();
        if !status {
            warn!(?unknown, ?missing, "Dataset schema validation failed");
        }

        self.layout.ensure_dirs()?;
        std::fs::write(
            self.layout.validation_status(),
            format!("Validation status: {}\n", status),
        )?;
        Ok(status)
    }

    /// Profile every column and render the HTML report artifact
    pub fn generate_profiling_report(&self, df: &DataFrame) -> Result<PathBuf> {
        let profiles = Self::profile(df)?;
        let html = render_profile_html(&profiles, df.height(), df.width());

        self.layout.ensure_dirs()?;
        let path = self.layout.profiling_report();
        std::fs::write(&path, html)?;
        info!(path = %path.display(), "Profiling report written");
        Ok(path)
    }

    /// Per-column summary statistics
    pub fn profile(df: &DataFrame) -> Result<Vec<ColumnProfile>> {
        df.get_column_names()
            .iter()
            .map(|name| {
                let values = column_to_f64(df, name.as_str())?;
                Ok(ColumnProfile::from_values(name.as_str(), &values))
            })
            .collect()
    }
}

fn render_profile_html(profiles: &[ColumnProfile], n_rows: usize, n_cols: usize) -> String {
    let mut rows = String::new();
    for p in profiles {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
             <td>{:.4}</td><td>{:.4}</td><td>{:.4}</td><td>{:.4}</td>\
             <td>{:.4}</td><td>{:.4}</td><td>{:.4}</td></tr>\n",
            p.name,
            p.count,
            p.n_missing,
            p.n_distinct,
            p.mean,
            p.std,
            p.min,
            p.q25,
            p.median,
            p.q75,
            p.max,
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>Data Profile</title>
<style>
body {{ font-family: system-ui, sans-serif; margin: 2rem; background: #fafafa; color: #222; }}
h1 {{ font-size: 1.4rem; }}
table {{ border-collapse: collapse; width: 100%; background: #fff; }}
th, td {{ border: 1px solid #ddd; padding: 6px 10px; text-align: right; font-size: 0.9rem; }}
th {{ background: #f0f0f0; }}
td:first-child, th:first-child {{ text-align: left; }}
.meta {{ color: #666; margin-bottom: 1rem; }}
</style>
</head>
<body>
<h1>Data Profile</h1>
<p class="meta">{} rows &times; {} columns &mdash; generated {}</p>
<table>
<tr><th>column</th><th>count</th><th>missing</th><th>distinct</th>
<th>mean</th><th>std</th><th>min</th><th>q25</th><th>median</th><th>q75</th><th>max</th></tr>
{}</table>
</body>
</html>
"#,
        n_rows,
        n_cols,
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        rows
    )
}

//! Append-only inference log
//!
//! One CSV row per prediction: the 11 input features, the prediction, and
//! a timestamp. The header is written when the file is created; rows are
//! only ever appended. All writers serialize through one mutex so rows
//! cannot interleave under concurrent requests.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::error::Result;
use crate::schema::{WineFeatures, FEATURE_COLUMNS};

/// Durable record store of every served prediction
#[derive(Debug)]
pub struct InferenceLog {
    path: PathBuf,
    writer: Mutex<()>,
}

impl InferenceLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record. Creates the file (and header) on first write.
    pub fn append(
        &self,
        features: &WineFeatures,
        prediction: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        let mut row = String::with_capacity(160);
        for value in features.values() {
            row.push_str(&format!("{},", value));
        }
        row.push_str(&format!(
            "{},{}\n",
            prediction,
            timestamp.format("%Y-%m-%d %H:%M:%S%.3f")
        ));

        let _guard = self.writer.lock();

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        if file.metadata()?.len() == 0 {
            let mut header = FEATURE_COLUMNS.join(",");
            header.push_str(",prediction,timestamp\n");
            file.write_all(header.as_bytes())?;
        }
        file.write_all(row.as_bytes())?;
        Ok(())
    }

    /// Number of records currently on disk (header excluded)
    pub fn record_count(&self) -> Result<usize> {
        if !self.path.exists() {
            return Ok(0);
        }
        let contents = std::fs::read_to_string(&self.path)?;
        Ok(contents.lines().count().saturating_sub(1))
    }
}

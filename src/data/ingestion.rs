//! Data ingestion: raw CSV loading and the seeded train/test split

use std::path::Path;

use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::artifacts::ArtifactLayout;
use crate::error::{Result, VinoError};

/// Loads the raw dataset and stages the reference copy for drift checks
#[derive(Debug, Clone)]
pub struct DataIngestion {
    layout: ArtifactLayout,
}

impl DataIngestion {
    pub fn new(layout: ArtifactLayout) -> Self {
        Self { layout }
    }

    /// Read a CSV with header and schema inference
    pub fn load_csv(path: &Path) -> Result<DataFrame> {
        let df = CsvReadOptions::default()
            .with_infer_schema_length(Some(1000))
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .map_err(|e| VinoError::DataError(e.to_string()))?
            .finish()?;
        Ok(df)
    }

    /// Copy the source dataset into the artifact store as the reference
    /// distribution, returning the loaded frame.
    pub fn ingest(&self, source: &Path) -> Result<DataFrame> {
        let df = Self::load_csv(source)?;
        self.layout.ensure_dirs()?;

        let dest = self.layout.reference_data();
        let mut file = std::fs::File::create(&dest)?;
        CsvWriter::new(&mut file).finish(&mut df.clone())?;

        info!(
            rows = df.height(),
            columns = df.width(),
            dest = %dest.display(),
            "Ingested reference dataset"
        );
        Ok(df)
    }

    /// Seeded shuffle split. `test_fraction` rows go to the second frame.
    pub fn train_test_split(
        df: &DataFrame,
        test_fraction: f64,
        seed: u64,
    ) -> Result<(DataFrame, DataFrame)> {
        if !(0.0..1.0).contains(&test_fraction) {
            return Err(VinoError::ConfigError(format!(
                "test_fraction must be in [0, 1), got {}",
                test_fraction
            )));
        }
        let n = df.height();
        let n_test = ((n as f64) * test_fraction).round() as usize;
        if n_test == 0 || n_test >= n {
            return Err(VinoError::DataError(format!(
                "Split of {} rows with test_fraction {} leaves an empty side",
                n, test_fraction
            )));
        }

        let mut indices: Vec<u32> = (0..n as u32).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let test_idx = IdxCa::from_vec("idx".into(), indices[..n_test].to_vec());
        let train_idx = IdxCa::from_vec("idx".into(), indices[n_test..].to_vec());

        let test = df.take(&test_idx)?;
        let train = df.take(&train_idx)?;
        Ok((train, test))
    }
}

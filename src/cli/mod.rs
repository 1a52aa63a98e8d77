//! Command-line interface for the pipeline stages and the server

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use colored::*;

use crate::artifacts::ArtifactLayout;
use crate::data::{DataIngestion, DataValidation};
use crate::evaluation::ModelEvaluation;
use crate::inference::InferenceEngine;
use crate::preprocessing::DataTransformation;
use crate::schema::WineFeatures;
use crate::server::{run_server, ServerConfig};
use crate::training::{ModelTrainer, TrainingConfig};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString {
    s.truecolor(100, 100, 100)
}

fn ok(s: &str) -> ColoredString {
    s.truecolor(100, 210, 120)
}

fn accent(s: &str) -> ColoredString {
    s.truecolor(120, 170, 255)
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "vinoml")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Wine quality regression: pipeline stages and prediction API")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Stage the raw dataset as the reference distribution
    Ingest {
        /// Path to the raw wine quality CSV
        #[arg(short, long)]
        data: PathBuf,
    },
    /// Validate the reference schema and render the profiling report
    Validate,
    /// Split, fit the preprocessor, and write the transformed splits
    Transform {
        /// Held-out fraction
        #[arg(long, default_value_t = 0.2)]
        test_fraction: f64,
        /// Shuffle seed
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Grid-search and train the ElasticNet model
    Train,
    /// Score the model on the held-out split and record the run
    Evaluate,
    /// Predict one sample from a JSON file of named features
    Predict {
        /// Path to a JSON file with the 11 named feature values
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Run every pipeline stage in order
    RunPipeline {
        /// Path to the raw wine quality CSV
        #[arg(short, long)]
        data: PathBuf,
    },
    /// Start the prediction service
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        #[arg(short, long, default_value_t = 8080)]
        port: u16,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_ingest(data: &PathBuf, layout: &ArtifactLayout) -> anyhow::Result<()> {
    section("Ingest");
    step_run("Loading raw dataset");
    let start = Instant::now();
    let df = DataIngestion::new(layout.clone()).ingest(data)?;
    step_done(&format!(
        "{} rows, {} columns in {:.1?}",
        df.height(),
        df.width(),
        start.elapsed()
    ));
    Ok(())
}

pub fn cmd_validate(layout: &ArtifactLayout) -> anyhow::Result<()> {
    section("Validate");
    let df = DataIngestion::load_csv(&layout.reference_data())?;
    let validation = DataValidation::new(layout.clone());

    let status = validation.validate_all_columns(&df)?;
    if status {
        step_ok("Schema matches the expected columns");
    } else {
        anyhow::bail!("Schema validation failed, see {}", layout.validation_status().display());
    }

    step_run("Rendering profiling report");
    let path = validation.generate_profiling_report(&df)?;
    step_done(&path.display().to_string());
    Ok(())
}

pub fn cmd_transform(layout: &ArtifactLayout, test_fraction: f64, seed: u64) -> anyhow::Result<()> {
    section("Transform");
    let df = DataIngestion::load_csv(&layout.reference_data())?;

    step_run("Fitting preprocessor and writing splits");
    let start = Instant::now();
    DataTransformation::new(layout.clone())
        .with_split(test_fraction, seed)
        .run(&df)?;
    step_done(&format!("in {:.1?}", start.elapsed()));
    Ok(())
}

pub fn cmd_train(layout: &ArtifactLayout) -> anyhow::Result<()> {
    section("Train");
    step_run("Cross-validated grid search");
    let start = Instant::now();
    let (model, best) = ModelTrainer::new(layout.clone(), TrainingConfig::default()).train()?;
    step_done(&format!("in {:.1?}", start.elapsed()));
    step_ok(&format!(
        "alpha = {}, l1_ratio = {}, cv mse = {:.4}",
        model.alpha, model.l1_ratio, best.mean_mse
    ));
    Ok(())
}

pub fn cmd_evaluate(layout: &ArtifactLayout) -> anyhow::Result<()> {
    section("Evaluate");
    let metrics = ModelEvaluation::new(layout.clone()).evaluate()?;
    step_ok(&format!(
        "rmse = {:.4}, mae = {:.4}, r2 = {:.4}",
        metrics.rmse, metrics.mae, metrics.r2
    ));
    Ok(())
}

pub fn cmd_predict(input: &PathBuf, layout: &ArtifactLayout) -> anyhow::Result<()> {
    section("Predict");
    let json = std::fs::read_to_string(input)?;
    let features: WineFeatures = serde_json::from_str(&json)?;

    let engine = InferenceEngine::load(layout)?;
    let prediction = engine.predict(&features)?;
    step_ok(&format!("predicted quality = {:.3}", prediction));
    Ok(())
}

pub fn cmd_run_pipeline(data: &PathBuf, layout: &ArtifactLayout) -> anyhow::Result<()> {
    cmd_ingest(data, layout)?;
    cmd_validate(layout)?;
    cmd_transform(layout, 0.2, 42)?;
    cmd_train(layout)?;
    cmd_evaluate(layout)?;
    println!();
    step_ok("Pipeline complete");
    Ok(())
}

pub async fn cmd_serve(host: &str, port: u16) -> anyhow::Result<()> {
    let config = ServerConfig {
        host: host.to_string(),
        port,
        ..ServerConfig::default()
    };
    run_server(config).await
}

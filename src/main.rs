//! vinoml - Main Entry Point

use clap::Parser;
use vinoml::artifacts::ArtifactLayout;
use vinoml::cli::{
    cmd_evaluate, cmd_ingest, cmd_predict, cmd_run_pipeline, cmd_serve, cmd_train, cmd_transform,
    cmd_validate, Cli, Commands,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vinoml=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let layout = ArtifactLayout::default();

    match cli.command {
        Commands::Ingest { data } => cmd_ingest(&data, &layout)?,
        Commands::Validate => cmd_validate(&layout)?,
        Commands::Transform {
            test_fraction,
            seed,
        } => cmd_transform(&layout, test_fraction, seed)?,
        Commands::Train => cmd_train(&layout)?,
        Commands::Evaluate => cmd_evaluate(&layout)?,
        Commands::Predict { input } => cmd_predict(&input, &layout)?,
        Commands::RunPipeline { data } => cmd_run_pipeline(&data, &layout)?,
        Commands::Serve { host, port } => cmd_serve(&host, port).await?,
    }

    Ok(())
}

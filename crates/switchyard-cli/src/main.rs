use anyhow::Result;
use clap::Parser;
use tracing_subscriber::filter::LevelFilter;

use switchyard_cli::cli::{Cli, Commands, LogLevel};
use switchyard_cli::commands;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = LevelFilter::from(cli.log_level.unwrap_or(LogLevel::Info));
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(level.to_string()))
        .init();

    match cli.command {
        Commands::Run { config } => commands::run::execute(&config).await?,
        Commands::Manual => commands::manual::execute().await?,
    }

    Ok(())
}

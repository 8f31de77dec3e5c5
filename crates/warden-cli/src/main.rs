//! # Warden CLI
//!
//! Operator tool for the identity cache: connectivity checks, inspection,
//! and manual eviction.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use warden_config::ConfigLoader;
use warden_core::telemetry::init_tracing;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut loader = ConfigLoader::new(cli.config_dir.clone());
    if let Some(environment) = cli.environment {
        loader = loader.with_environment(environment);
    }
    let config = loader.load()?;
    init_tracing(&config.observability)?;

    commands::execute(&cli.command, &config).await
}

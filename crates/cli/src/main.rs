//! # Hedge Search CLI
//!
//! Command-line entry point.
//!
//! Provides:
//! - Configuration loading and validation
//! - Hedged search sessions over simulated backends
//! - Graceful shutdown handling

mod cli;
mod commands;
mod session;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_info, run_search, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Logs go to stderr; the search command starts its own exporter.
    observability::init_with_config(cli.observability_config())?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Hedge Search CLI starting"
    );

    let result = match &cli.command {
        Commands::Search(args) => run_search(args).await,
        Commands::Validate(args) => run_validate(args),
        Commands::Info(args) => run_info(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

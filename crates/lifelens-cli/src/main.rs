//! Lifelens CLI - life-tracking pipeline inspector
//!
//! Usage:
//!   lifelens snapshot                 Aggregate and print the snapshot
//!   lifelens insights                 Generate ranked insights
//!   lifelens correlations             Run the correlation sweep
//!   lifelens analyze --dim-a A --dim-b B   Analyze one dimension pair
//!   lifelens --data data.json status  Inspect a dataset file

mod cli;
mod commands;
mod demo;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let (store, default_user) = commands::open_store(cli.data.as_deref())?;
    let user_id = cli.user.unwrap_or(default_user);
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Snapshot => commands::cmd_snapshot(store, user_id, config).await,
        Commands::Insights { limit, json } => {
            commands::cmd_insights(store, user_id, config, limit, json).await
        }
        Commands::Correlations => commands::cmd_correlations(store, user_id, config).await,
        Commands::Analyze { dim_a, dim_b } => {
            commands::cmd_analyze(store, user_id, config, &dim_a, &dim_b).await
        }
        Commands::Status => commands::cmd_status(store, user_id).await,
    }
}

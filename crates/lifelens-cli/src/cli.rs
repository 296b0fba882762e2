//! CLI argument definitions using clap
//!
//! This module contains the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Lifelens - aggregate life-tracking data into insights
#[derive(Parser)]
#[command(name = "lifelens")]
#[command(about = "Snapshot, correlation, and insight pipeline over a dataset", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Dataset file (JSON). Without it, a built-in demo dataset is used.
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// Engine configuration file (TOML); defaults apply when omitted
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// User to run the pipeline for (defaults to the dataset's first user)
    #[arg(long, global = true)]
    pub user: Option<i64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Aggregate the user's data and print the snapshot
    Snapshot,

    /// Generate ranked insights from a fresh snapshot
    Insights {
        /// Print at most this many insights
        #[arg(short, long, default_value = "10")]
        limit: usize,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Run the correlation sweep across all reference dimension pairs
    Correlations,

    /// Analyze one dimension pair
    Analyze {
        /// First dimension, e.g. emotion.score
        #[arg(long = "dim-a")]
        dim_a: String,

        /// Second dimension, e.g. financial.spending
        #[arg(long = "dim-b")]
        dim_b: String,
    },

    /// Show what the dataset contains
    Status,
}

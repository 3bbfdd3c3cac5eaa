//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Joinsight: check whether two tables will join cleanly
#[derive(Parser)]
#[command(name = "joinsight")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Verify candidate join mappings between two data files
    Check {
        /// Left data file (CSV/TSV)
        #[arg(value_name = "LEFT")]
        left: PathBuf,

        /// Right data file (CSV/TSV)
        #[arg(value_name = "RIGHT")]
        right: PathBuf,

        /// Mapping JSON: one suggestion document or an array of them
        #[arg(short, long, value_name = "JSON")]
        mapping: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Advisor configuration JSON
        #[arg(short, long, value_name = "JSON")]
        config: Option<PathBuf>,
    },

    /// Print a dataset profile as JSON
    Profile {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Sample values per column
        #[arg(long, default_value = "5")]
        sample_rows: usize,
    },

    /// Normalize a date column to monthly periods
    Normalize {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Column to normalize
        #[arg(value_name = "COLUMN")]
        column: String,
    },
}

//! Joinsight CLI - join compatibility checks for tabular files.

mod cli;
mod commands;
mod logging;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Check {
            left,
            right,
            mapping,
            json,
            config,
        } => commands::check::run(left, right, mapping, json, config),

        Commands::Profile { file, sample_rows } => commands::profile::run(file, sample_rows),

        Commands::Normalize { file, column } => commands::normalize::run(file, column),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

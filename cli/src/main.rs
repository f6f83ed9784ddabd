//! DriftPool CLI - replay trade scenarios against a drifting-weight pool
//!
//! A pool is described by a TOML file (tokens, decimals, weights, fees) and
//! a scenario by a list of operations in native token units.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod replay;
mod report;

#[derive(Parser)]
#[command(name = "driftpool")]
#[command(about = "Replay swaps, joins and exits against a drifting-weight pool", long_about = None)]
#[command(version)]
struct Cli {
    /// Debug logging from the pool engine
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every operation of a scenario and print the results
    Replay {
        /// Pool configuration (TOML)
        pool: PathBuf,

        /// Scenario file (TOML)
        scenario: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Record failed operations and carry on instead of stopping
        #[arg(long)]
        keep_going: bool,
    },

    /// Quote a swap against the pool left by a scenario, without executing it
    Quote {
        /// Pool configuration (TOML)
        pool: PathBuf,

        /// Scenario that sets up the pool
        scenario: PathBuf,

        /// Symbol paid in
        #[arg(long)]
        token_in: String,

        /// Symbol received
        #[arg(long)]
        token_out: String,

        /// Amount in native units; paid in, or received with --exact-out
        #[arg(long)]
        amount: String,

        /// Treat the amount as the exact output
        #[arg(long)]
        exact_out: bool,

        /// Print the quote as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    match cli.command {
        Commands::Replay { pool, scenario, json, keep_going } => {
            let report = replay::run_files(&pool, &scenario, keep_going)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                report::print_report(&report);
            }
        }
        Commands::Quote { pool, scenario, token_in, token_out, amount, exact_out, json } => {
            let quote = replay::quote_files(&pool, &scenario, &token_in, &token_out, &amount, exact_out)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&quote)?);
            } else {
                report::print_quote(&quote);
            }
        }
    }

    Ok(())
}

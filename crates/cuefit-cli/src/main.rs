//! cuefit - model comparison for multi-cue retrieval.
//!
//! # Configuration
//!
//! Settings come from an optional config file (`--config`, TOML, JSON or
//! YAML), then `CUEFIT_*` environment variables (a `.env` file is loaded
//! first), then command-line flags.
//!
//! - `CUEFIT_TRANSITION_TABLE` - input CSV
//! - `CUEFIT_REPRESENTATIONS` - comma-separated representation names
//! - `CUEFIT_LEDGER` - run ledger CSV
//!
//! Logs go to stderr; the LaTeX table is printed to stdout.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "cuefit", about = "Fit multi-cue retrieval models to choice sequences")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit every representation subset and compare it with the baseline
    Fit(commands::fit::FitArgs),
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Fit(args) => commands::fit::run(args),
    }
}

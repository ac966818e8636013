use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use cuefit_core::report::{
    render_console, render_latex, write_comparison_file, write_fits_file, LedgerEntry, RunLedger,
};
use cuefit_core::{Condition, Driver, ProbeConfig, RunConfig, TransitionTable};
use tracing::info;

/// Participant derivation, as accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ConditionArg {
    /// One participant per (id, list) pair
    All,
    /// One participant per id, all lists merged
    Collapse,
    /// One participant per id, first list only
    First,
}

impl From<ConditionArg> for Condition {
    fn from(arg: ConditionArg) -> Self {
        match arg {
            ConditionArg::All => Condition::All,
            ConditionArg::Collapse => Condition::Collapse,
            ConditionArg::First => Condition::First,
        }
    }
}

#[derive(Args)]
pub struct FitArgs {
    /// Which dataset to run the model comparison for
    #[arg(value_enum)]
    pub condition: ConditionArg,

    /// Config file (TOML, JSON or YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Transition table CSV
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Write the comparison table to this CSV
    #[arg(long)]
    pub results: Option<PathBuf>,

    /// Write per-participant fits to this CSV
    #[arg(long)]
    pub fits: Option<PathBuf>,

    /// Write the LaTeX table to this file as well as stdout
    #[arg(long)]
    pub latex: Option<PathBuf>,

    /// Append a summary of the run to this ledger CSV
    #[arg(long)]
    pub ledger: Option<PathBuf>,

    /// Fit participants in parallel
    #[arg(long)]
    pub parallel: bool,
}

fn load_config(args: &FitArgs) -> Result<RunConfig> {
    let mut config = match &args.config {
        Some(path) => RunConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => RunConfig::default(),
    };
    config.apply_env();

    config.condition = args.condition.into();
    if let Some(input) = &args.input {
        config.transition_table = input.clone();
    }
    if args.parallel {
        config.parallel = true;
    }
    let output = &mut config.output;
    for (flag, slot) in [
        (&args.results, &mut output.results_csv),
        (&args.fits, &mut output.fits_csv),
        (&args.latex, &mut output.latex),
        (&args.ledger, &mut output.ledger),
    ] {
        if let Some(path) = flag {
            *slot = Some(path.clone());
        }
    }

    config.validate()?;
    Ok(config)
}

pub fn run(args: FitArgs) -> Result<()> {
    let config = load_config(&args)?;

    let probes = ProbeConfig::for_representations(&config.representations);
    let table = TransitionTable::from_path(&config.transition_table, &probes)
        .with_context(|| {
            format!(
                "Failed to read transition table {}",
                config.transition_table.display()
            )
        })?
        .with_condition(config.condition);

    info!(
        condition = %config.condition,
        rows = table.len(),
        "Number of participants: {}",
        table.unique_ids()
    );

    let driver = Driver::new(config.clone())?;
    let outcome = driver.run(&table)?;
    let comparison = &outcome.comparison;

    info!("Final model comparison\n{}", render_console(comparison));

    let mut artifacts = Vec::new();
    if let Some(path) = &config.output.results_csv {
        write_comparison_file(path, comparison)?;
        artifacts.push(path.clone());
    }
    if let Some(path) = &config.output.fits_csv {
        let mut fits = outcome.baseline.clone();
        fits.extend(outcome.fits.iter().cloned());
        write_fits_file(path, &fits, &config.representations)?;
        artifacts.push(path.clone());
    }

    let latex = render_latex(comparison);
    if let Some(path) = &config.output.latex {
        std::fs::write(path, &latex)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        artifacts.push(path.clone());
    }
    print!("{}", latex);

    if let Some(path) = &config.output.ledger {
        let entry = LedgerEntry::for_run(&config, comparison, &artifacts)?;
        RunLedger::new(path).append(&entry)?;
        info!("Run recorded in {}", path.display());
    }

    Ok(())
}

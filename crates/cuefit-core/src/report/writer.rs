//! CSV outputs: the comparison table and the per-participant fits.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::Writer;

use crate::error::CueFitResult;
use crate::types::{FitResult, ModelComparison};

const COMPARISON_COLUMNS: [&str; 12] = [
    "model",
    "k",
    "loss",
    "log_likelihood",
    "aic",
    "bic",
    "baseline_aic",
    "baseline_bic",
    "aic_improvement",
    "bic_improvement",
    "baseline_loss",
    "non_converged",
];

const FIT_COLUMNS: [&str; 6] = ["model", "participant", "k", "loss", "converged", "nrows"];

/// Write the comparison table. Each representation gets a `mean (ci)`
/// column, blank where the model does not use it.
pub fn write_comparison<W: Write>(writer: W, comparison: &ModelComparison) -> CueFitResult<()> {
    let mut wtr = Writer::from_writer(writer);

    let mut header: Vec<&str> = COMPARISON_COLUMNS.to_vec();
    header.extend(comparison.representations.iter().map(String::as_str));
    wtr.write_record(&header)?;

    for row in &comparison.rows {
        let mut record = vec![
            row.model.clone(),
            row.k.to_string(),
            row.loss.to_string(),
            row.log_likelihood.to_string(),
            row.aic.to_string(),
            row.bic.to_string(),
            row.baseline_aic.to_string(),
            row.baseline_bic.to_string(),
            row.aic_improvement.to_string(),
            row.bic_improvement.to_string(),
            row.baseline_loss.to_string(),
            row.non_converged.to_string(),
        ];
        record.extend(
            comparison
                .representations
                .iter()
                .map(|r| row.weight(r).map(ToString::to_string).unwrap_or_default()),
        );
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_comparison_file(path: impl AsRef<Path>, comparison: &ModelComparison) -> CueFitResult<()> {
    write_comparison(File::create(path.as_ref())?, comparison)?;
    tracing::debug!("Wrote model comparison to {}", path.as_ref().display());
    Ok(())
}

/// Write one row per participant fit, with a weight column per
/// representation (blank when the model does not use it).
pub fn write_fits<W: Write>(
    writer: W,
    fits: &[FitResult],
    representations: &[String],
) -> CueFitResult<()> {
    let mut wtr = Writer::from_writer(writer);

    let mut header: Vec<&str> = FIT_COLUMNS.to_vec();
    header.extend(representations.iter().map(String::as_str));
    wtr.write_record(&header)?;

    for fit in fits {
        let mut record = vec![
            fit.model.clone(),
            fit.participant.clone(),
            fit.k.to_string(),
            fit.loss.to_string(),
            fit.converged.to_string(),
            fit.nrows.to_string(),
        ];
        record.extend(
            representations
                .iter()
                .map(|r| fit.weight(r).map(|w| w.to_string()).unwrap_or_default()),
        );
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_fits_file(
    path: impl AsRef<Path>,
    fits: &[FitResult],
    representations: &[String],
) -> CueFitResult<()> {
    write_fits(File::create(path.as_ref())?, fits, representations)?;
    tracing::debug!("Wrote participant fits to {}", path.as_ref().display());
    Ok(())
}

//! Aggregates per-participant fits into the model comparison table.

use ordered_float::OrderedFloat;
use tracing::warn;

use super::baseline::BASELINE_MODEL;
use super::driver::ModelVariant;
use super::stats::{aic, bic, mean, mean_confidence_interval};
use crate::error::{CueFitError, CueFitResult};
use crate::types::{FitResult, ModelComparison, ModelComparisonRow, WeightSummary};

/// Summed loss, row count and convergence over one model's fits.
struct Totals {
    loss: f64,
    nrows: usize,
    participants: usize,
    non_converged: usize,
}

impl Totals {
    fn of<'a>(fits: impl IntoIterator<Item = &'a FitResult>) -> Self {
        let mut totals = Totals {
            loss: 0.0,
            nrows: 0,
            participants: 0,
            non_converged: 0,
        };
        for fit in fits {
            totals.loss += fit.loss;
            totals.nrows += fit.nrows;
            totals.participants += 1;
            if !fit.converged {
                totals.non_converged += 1;
            }
        }
        totals
    }

    fn log_likelihood(&self) -> f64 {
        -self.loss
    }
}

/// Relative improvement of `baseline` over `model`, in percent of `model`.
fn improvement(baseline: f64, model: f64) -> f64 {
    (baseline - model) / model * 100.0
}

fn weight_summaries(
    representations: &[String],
    variant: &ModelVariant,
    fits: &[&FitResult],
    confidence: f64,
) -> Vec<(String, Option<WeightSummary>)> {
    representations
        .iter()
        .map(|rep| {
            let summary = if variant.contains(rep) {
                let values: Vec<f64> = fits.iter().filter_map(|f| f.weight(rep)).collect();
                mean(&values).map(|m| WeightSummary {
                    mean: m,
                    ci: mean_confidence_interval(&values, confidence),
                })
            } else {
                None
            };
            (rep.clone(), summary)
        })
        .collect()
}

/// Build the comparison table.
///
/// The baseline row comes first with `k = 0`; each variant with at least
/// one fit follows. Rows are sorted by `k` and then by `bic_improvement`,
/// both ascending.
pub fn summarise(
    representations: &[String],
    variants: &[ModelVariant],
    baseline: &[FitResult],
    fits: &[FitResult],
    confidence: f64,
) -> CueFitResult<ModelComparison> {
    if baseline.is_empty() {
        return Err(CueFitError::empty("No baseline fits to compare against"));
    }

    let base = Totals::of(baseline);
    let base_ll = base.log_likelihood();
    let baseline_aic = aic(base_ll, 0);
    let baseline_bic = bic(base_ll, base.nrows, 0);

    let row = |model: String,
               k: usize,
               totals: &Totals,
               weights: Vec<(String, Option<WeightSummary>)>| {
        let ll = totals.log_likelihood();
        let model_aic = aic(ll, k);
        let model_bic = bic(ll, totals.nrows, k);
        ModelComparisonRow {
            model,
            k,
            loss: totals.loss,
            log_likelihood: ll,
            nrows: totals.nrows,
            participants: totals.participants,
            non_converged: totals.non_converged,
            aic: model_aic,
            bic: model_bic,
            baseline_aic,
            baseline_bic,
            aic_improvement: improvement(baseline_aic, model_aic),
            bic_improvement: improvement(baseline_bic, model_bic),
            baseline_loss: base.loss,
            weights,
        }
    };

    let mut rows = Vec::with_capacity(variants.len() + 1);
    rows.push(row(
        BASELINE_MODEL.to_string(),
        0,
        &base,
        representations.iter().map(|r| (r.clone(), None)).collect(),
    ));

    for variant in variants {
        let label = variant.label();
        let variant_fits: Vec<&FitResult> = fits.iter().filter(|f| f.model == label).collect();
        if variant_fits.is_empty() {
            warn!(model = %label, "No fits for model, leaving it out of the comparison");
            continue;
        }

        let totals = Totals::of(variant_fits.iter().copied());
        if totals.non_converged > 0 {
            warn!(
                model = %label,
                non_converged = totals.non_converged,
                "Some participant fits did not converge"
            );
        }
        let weights = weight_summaries(representations, variant, &variant_fits, confidence);
        rows.push(row(label, variant.k(), &totals, weights));
    }

    rows.sort_by_key(|r| (r.k, OrderedFloat(r.bic_improvement)));

    Ok(ModelComparison {
        representations: representations.to_vec(),
        rows,
    })
}

//! Multi-cue retrieval strengths.
//!
//! Each representation contributes its similarity raised to an attention
//! weight, and contributions combine multiplicatively. The strength of the
//! observed choice at a step is its combined cue divided by the summed
//! combined cues of every item still available at that step.

use crate::error::{CueFitError, CueFitResult};
use crate::model::loss::sanitize_probability;
use crate::types::CueSet;

/// Default offset added to every similarity so zero cues stay usable.
pub const DEFAULT_JITTER: f64 = 1.0e-7;

/// Attention-weighted product of one item's similarities across probes.
///
/// `similarity(r)` returns the item's similarity under probe `r`.
fn weighted_product(weights: &[f64], jitter: f64, similarity: impl Fn(usize) -> f64) -> f64 {
    weights
        .iter()
        .enumerate()
        .map(|(r, w)| (similarity(r) + jitter).powf(*w))
        .product()
}

/// Per-step combined cue of the observed choice.
fn numerators(cues: &CueSet, weights: &[f64], jitter: f64) -> Vec<f64> {
    let probes = cues.probes();
    (0..cues.steps())
        .map(|t| weighted_product(weights, jitter, |r| probes[r].current[t]))
        .collect()
}

/// Per-step sum of combined cues over the remaining items. Zero for an
/// empty list.
fn denominators(cues: &CueSet, weights: &[f64], jitter: f64) -> Vec<f64> {
    let probes = cues.probes();
    (0..cues.steps())
        .map(|t| {
            (0..cues.competitors(t))
                .map(|c| weighted_product(weights, jitter, |r| probes[r].remaining[t][c]))
                .sum()
        })
        .collect()
}

/// Predicted probability of each observed choice.
///
/// `weights` must hold one entry per probe in `cues`, otherwise a
/// `ConfigurationMismatch` is returned. Non-finite ratios are sanitized so
/// that a step with no competitors yields 1.0 and a 0/0 step yields 0.0.
pub fn retrieval_strengths(
    cues: &CueSet,
    weights: &[f64],
    jitter: f64,
) -> CueFitResult<Vec<f64>> {
    if weights.len() != cues.num_probes() {
        return Err(CueFitError::weight_mismatch(cues.num_probes(), weights.len()));
    }

    Ok(numerators(cues, weights, jitter)
        .into_iter()
        .zip(denominators(cues, weights, jitter))
        .map(|(num, den)| sanitize_probability(num / den))
        .collect())
}

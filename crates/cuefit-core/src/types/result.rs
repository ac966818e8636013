//! Fit results and model comparison rows.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The outcome of fitting one model variant to one participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub participant: String,
    /// Variant label, e.g. `cooc + w2v`.
    pub model: String,
    /// Number of free parameters.
    pub k: usize,
    /// Total negative log-likelihood.
    pub loss: f64,
    /// Fitted (or fixed) attention weight per representation, in probe order.
    pub weights: Vec<(String, f64)>,
    pub converged: bool,
    /// Decision rows that contributed to the fit.
    pub nrows: usize,
}

impl FitResult {
    /// Weight of a representation, if it took part in this fit.
    pub fn weight(&self, representation: &str) -> Option<f64> {
        self.weights
            .iter()
            .find(|(name, _)| name == representation)
            .map(|(_, w)| *w)
    }
}

/// Mean attention weight across participants with its confidence interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightSummary {
    pub mean: f64,
    /// Half-width of the interval. `None` with fewer than two participants.
    pub ci: Option<f64>,
}

impl fmt::Display for WeightSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ci {
            Some(ci) => write!(f, "{:.3} ({:.3})", self.mean, ci),
            None => write!(f, "{:.3}", self.mean),
        }
    }
}

/// Aggregated statistics for one model variant across all participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelComparisonRow {
    pub model: String,
    pub k: usize,
    /// Summed negative log-likelihood.
    pub loss: f64,
    /// `-loss`.
    pub log_likelihood: f64,
    /// Summed decision rows (the `n` in BIC).
    pub nrows: usize,
    pub participants: usize,
    /// Participant fits that did not converge. They are still included.
    pub non_converged: usize,
    pub aic: f64,
    pub bic: f64,
    pub baseline_aic: f64,
    pub baseline_bic: f64,
    pub aic_improvement: f64,
    pub bic_improvement: f64,
    /// Summed negative log-likelihood of the baseline model.
    pub baseline_loss: f64,
    /// One entry per reported representation; `None` when the variant does
    /// not include it.
    pub weights: Vec<(String, Option<WeightSummary>)>,
}

impl ModelComparisonRow {
    pub fn weight(&self, representation: &str) -> Option<&WeightSummary> {
        self.weights
            .iter()
            .find(|(name, _)| name == representation)
            .and_then(|(_, w)| w.as_ref())
    }

    pub fn is_baseline(&self) -> bool {
        self.k == 0
    }
}

/// The full model comparison table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelComparison {
    /// Representations with a weight column, in reporting order.
    pub representations: Vec<String>,
    /// Sorted by `k`, then `bic_improvement`, both ascending.
    pub rows: Vec<ModelComparisonRow>,
}

impl ModelComparison {
    pub fn row(&self, model: &str) -> Option<&ModelComparisonRow> {
        self.rows.iter().find(|r| r.model == model)
    }

    pub fn baseline(&self) -> Option<&ModelComparisonRow> {
        self.rows.iter().find(|r| r.is_baseline())
    }

    /// Rows for models with at least one free parameter.
    pub fn fitted_rows(&self) -> impl Iterator<Item = &ModelComparisonRow> {
        self.rows.iter().filter(|r| !r.is_baseline())
    }
}

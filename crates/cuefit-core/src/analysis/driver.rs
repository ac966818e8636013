//! Fits every model variant to every participant.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::baseline::{baseline_probes, baseline_table, BASELINE_MODEL};
use super::comparison::summarise;
use crate::config::{FitErrorPolicy, RunConfig};
use crate::data::{Participant, TransitionTable};
use crate::error::{CueFitError, CueFitResult};
use crate::model::{Minimiser, NelderMeadMinimiser, RetrievalModel, WeightMode};
use crate::types::{FitResult, ModelComparison, ProbeConfig};

/// One subset of representations fitted together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelVariant {
    representations: Vec<String>,
}

impl ModelVariant {
    pub fn new<I, S>(representations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            representations: representations.into_iter().map(Into::into).collect(),
        }
    }

    pub fn representations(&self) -> &[String] {
        &self.representations
    }

    pub fn contains(&self, representation: &str) -> bool {
        self.representations.iter().any(|r| r == representation)
    }

    /// Free parameters: one weight per representation.
    pub fn k(&self) -> usize {
        self.representations.len()
    }

    /// Display label, e.g. `cooc + hier`.
    pub fn label(&self) -> String {
        self.representations.join(" + ")
    }

    pub fn probes(&self) -> Vec<ProbeConfig> {
        ProbeConfig::for_representations(&self.representations)
    }
}

/// Every non-empty subset of `representations`, by size and then in the
/// given order.
///
/// ```
/// use cuefit_core::analysis::enumerate_variants;
///
/// let labels: Vec<String> = enumerate_variants(&["cooc", "w2v", "hier"])
///     .iter()
///     .map(|v| v.label())
///     .collect();
/// assert_eq!(labels[3], "cooc + w2v");
/// assert_eq!(labels.len(), 7);
/// ```
pub fn enumerate_variants<S: AsRef<str>>(representations: &[S]) -> Vec<ModelVariant> {
    let names: Vec<&str> = representations.iter().map(AsRef::as_ref).collect();
    let mut variants = Vec::new();
    for size in 1..=names.len() {
        let mut chosen = Vec::with_capacity(size);
        combinations(&names, size, 0, &mut chosen, &mut variants);
    }
    variants
}

fn combinations(
    names: &[&str],
    size: usize,
    start: usize,
    chosen: &mut Vec<usize>,
    out: &mut Vec<ModelVariant>,
) {
    if chosen.len() == size {
        out.push(ModelVariant::new(chosen.iter().map(|&i| names[i])));
        return;
    }
    for i in start..names.len() {
        chosen.push(i);
        combinations(names, size, i + 1, chosen, out);
        chosen.pop();
    }
}

/// Everything produced by a full run.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub variants: Vec<ModelVariant>,
    /// Baseline fits, reported with `k = 0`.
    pub baseline: Vec<FitResult>,
    /// Per-participant fits of every variant, in variant order.
    pub fits: Vec<FitResult>,
    pub comparison: ModelComparison,
}

/// Runs the model comparison for one configuration.
pub struct Driver {
    config: RunConfig,
    minimiser: Arc<dyn Minimiser>,
}

impl Driver {
    /// Create a driver with a Nelder-Mead minimiser built from the config.
    pub fn new(config: RunConfig) -> CueFitResult<Self> {
        config.validate()?;
        let minimiser = Arc::new(NelderMeadMinimiser::new(config.optimiser.clone()));
        Ok(Self { config, minimiser })
    }

    /// Replace the minimiser.
    pub fn with_minimiser(mut self, minimiser: Arc<dyn Minimiser>) -> Self {
        self.minimiser = minimiser;
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn variants(&self) -> Vec<ModelVariant> {
        enumerate_variants(&self.config.representations)
    }

    /// Fit one variant to every participant of `table`.
    pub fn fit_variant(
        &self,
        table: &TransitionTable,
        variant: &ModelVariant,
    ) -> CueFitResult<Vec<FitResult>> {
        info!(model = %variant.label(), "Fitting model");
        self.fit_participants(table, &variant.label(), variant.k(), variant.probes())
    }

    /// Fit the uniform baseline. Its single weight has no effect on the
    /// loss, so the fits are reported with `k = 0`.
    pub fn fit_baseline(&self, table: &TransitionTable) -> CueFitResult<Vec<FitResult>> {
        info!(reference = %self.config.baseline_reference, "Fitting baseline model");
        let baseline = baseline_table(table, &self.config.baseline_reference)?;
        self.fit_participants(&baseline, BASELINE_MODEL, 0, baseline_probes())
    }

    fn fit_participants(
        &self,
        table: &TransitionTable,
        label: &str,
        k: usize,
        probes: Vec<ProbeConfig>,
    ) -> CueFitResult<Vec<FitResult>> {
        let model = RetrievalModel::new(
            probes,
            self.config.fit.clone(),
            WeightMode::Learn,
            Arc::clone(&self.minimiser),
        )?;
        let participants = table.participants();

        let fit_one = |participant: &Participant<'_>| -> CueFitResult<FitResult> {
            let cues = participant.cue_set(model.probes())?;
            let outcome = model.fit(&cues)?;
            debug!(
                model = label,
                participant = participant.key,
                loss = outcome.loss,
                converged = outcome.converged,
                "Fitted participant"
            );
            Ok(FitResult {
                participant: participant.key.to_string(),
                model: label.to_string(),
                k,
                loss: outcome.loss,
                weights: model
                    .probes()
                    .iter()
                    .map(|p| p.name().to_string())
                    .zip(outcome.weights)
                    .collect(),
                converged: outcome.converged,
                nrows: participant.len(),
            })
        };

        let outcomes: Vec<CueFitResult<FitResult>> = if self.config.parallel {
            participants.par_iter().map(fit_one).collect()
        } else {
            participants.iter().map(fit_one).collect()
        };

        let mut fits = Vec::with_capacity(outcomes.len());
        for (participant, outcome) in participants.iter().zip(outcomes) {
            match outcome {
                Ok(fit) => fits.push(fit),
                Err(e) => match self.config.on_fit_error {
                    FitErrorPolicy::Abort => return Err(e),
                    FitErrorPolicy::Skip => {
                        warn!(
                            model = label,
                            participant = participant.key,
                            error = %e,
                            "Skipping failed fit"
                        );
                    }
                },
            }
        }
        Ok(fits)
    }

    /// Fit the baseline and every variant, then build the comparison.
    pub fn run(&self, table: &TransitionTable) -> CueFitResult<AnalysisOutcome> {
        if table.is_empty() {
            return Err(CueFitError::empty("Transition table has no rows"));
        }

        let baseline = self.fit_baseline(table)?;
        let variants = self.variants();
        let mut fits = Vec::new();
        for variant in &variants {
            fits.extend(self.fit_variant(table, variant)?);
        }

        let comparison = summarise(
            &self.config.representations,
            &variants,
            &baseline,
            &fits,
            self.config.confidence,
        )?;
        info!(rows = comparison.rows.len(), "Model comparison complete");

        Ok(AnalysisOutcome {
            variants,
            baseline,
            fits,
            comparison,
        })
    }
}

//! Maximum-likelihood fitting of attention weights.

use std::fmt;
use std::sync::Arc;

use crate::config::FitConfig;
use crate::error::{CueFitError, CueFitResult};
use crate::model::loss::negative_log_likelihood;
use crate::model::optimise::{Bound, Minimiser, NelderMeadMinimiser};
use crate::model::retrieval::retrieval_strengths;
use crate::types::{CueSet, ProbeConfig};

/// How attention weights are obtained for a fit.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum WeightMode {
    /// Estimate weights by minimising the loss.
    #[default]
    Learn,
    /// Use these weights as given, one per probe.
    Fixed(Vec<f64>),
}

/// Loss and weights produced by a single fit.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOutcome {
    /// Total negative log-likelihood at `weights`.
    pub loss: f64,
    /// One weight per probe, in probe order.
    pub weights: Vec<f64>,
    pub converged: bool,
}

/// Retrieval model over a fixed set of probes.
pub struct RetrievalModel {
    probes: Vec<ProbeConfig>,
    config: FitConfig,
    weight_mode: WeightMode,
    minimiser: Arc<dyn Minimiser>,
}

impl fmt::Debug for RetrievalModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetrievalModel")
            .field("probes", &self.probes)
            .field("config", &self.config)
            .field("weight_mode", &self.weight_mode)
            .finish_non_exhaustive()
    }
}

impl RetrievalModel {
    /// Create a model. Fails when fixed weights do not match the probe
    /// count or the numeric configuration is invalid.
    pub fn new(
        probes: Vec<ProbeConfig>,
        config: FitConfig,
        weight_mode: WeightMode,
        minimiser: Arc<dyn Minimiser>,
    ) -> CueFitResult<Self> {
        config.validate().map_err(CueFitError::configuration)?;
        if probes.is_empty() {
            return Err(CueFitError::configuration(
                "A retrieval model needs at least one probe",
            ));
        }
        if let WeightMode::Fixed(weights) = &weight_mode {
            if weights.len() != probes.len() {
                return Err(CueFitError::weight_mismatch(probes.len(), weights.len()));
            }
        }

        Ok(Self {
            probes,
            config,
            weight_mode,
            minimiser,
        })
    }

    /// Model with learned weights and a default Nelder-Mead minimiser.
    pub fn learned(probes: Vec<ProbeConfig>, config: FitConfig) -> CueFitResult<Self> {
        Self::new(
            probes,
            config,
            WeightMode::Learn,
            Arc::new(NelderMeadMinimiser::default()),
        )
    }

    /// Model evaluated at fixed weights.
    pub fn fixed(
        probes: Vec<ProbeConfig>,
        config: FitConfig,
        weights: Vec<f64>,
    ) -> CueFitResult<Self> {
        Self::new(
            probes,
            config,
            WeightMode::Fixed(weights),
            Arc::new(NelderMeadMinimiser::default()),
        )
    }

    pub fn probes(&self) -> &[ProbeConfig] {
        &self.probes
    }

    pub fn weight_mode(&self) -> &WeightMode {
        &self.weight_mode
    }

    /// Number of free parameters.
    pub fn k(&self) -> usize {
        match self.weight_mode {
            WeightMode::Learn => self.probes.len(),
            WeightMode::Fixed(_) => 0,
        }
    }

    fn check_cues(&self, cues: &CueSet) -> CueFitResult<()> {
        if cues.num_probes() != self.probes.len() {
            return Err(CueFitError::weight_mismatch(
                self.probes.len(),
                cues.num_probes(),
            ));
        }
        Ok(())
    }

    /// Loss of `cues` under the given weights.
    pub fn evaluate(&self, cues: &CueSet, weights: &[f64]) -> CueFitResult<f64> {
        self.check_cues(cues)?;
        let strengths = retrieval_strengths(cues, weights, self.config.jitter)?;
        negative_log_likelihood(&strengths, self.config.zero_floor)
    }

    /// Fit the model to one participant's cues.
    pub fn fit(&self, cues: &CueSet) -> CueFitResult<FitOutcome> {
        self.check_cues(cues)?;

        match &self.weight_mode {
            WeightMode::Fixed(weights) => Ok(FitOutcome {
                loss: self.evaluate(cues, weights)?,
                weights: weights.clone(),
                converged: true,
            }),
            WeightMode::Learn => {
                let jitter = self.config.jitter;
                let zero_floor = self.config.zero_floor;
                let objective = |w: &[f64]| -> CueFitResult<f64> {
                    negative_log_likelihood(&retrieval_strengths(cues, w, jitter)?, zero_floor)
                };

                let x0 = vec![0.0; self.probes.len()];
                let bounds = vec![Bound::at_least(self.config.weight_lower_bound); x0.len()];
                let minimum = self.minimiser.minimise(&objective, &x0, &bounds)?;

                if !minimum.converged {
                    tracing::warn!(
                        iterations = minimum.iterations,
                        loss = minimum.fun,
                        "Weight optimisation did not converge"
                    );
                }

                Ok(FitOutcome {
                    loss: minimum.fun,
                    weights: minimum.x,
                    converged: minimum.converged,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::optimise::{Minimum, Objective};
    use crate::types::ProbeSeries;

    fn probes(names: &[&str]) -> Vec<ProbeConfig> {
        ProbeConfig::for_representations(names)
    }

    /// A participant whose choices always follow the strongest cue.
    fn informative_cues() -> CueSet {
        let series = ProbeSeries::new(
            vec![0.9, 0.8, 0.7],
            vec![
                vec![0.9, 0.2, 0.1, 0.3],
                vec![0.8, 0.1, 0.3],
                vec![0.7, 0.2],
            ],
        );
        CueSet::new(vec![series]).unwrap()
    }

    struct Fixed(Vec<f64>);

    impl Minimiser for Fixed {
        fn minimise(
            &self,
            objective: &Objective<'_>,
            _x0: &[f64],
            _bounds: &[Bound],
        ) -> CueFitResult<Minimum> {
            Ok(Minimum {
                fun: objective(&self.0)?,
                x: self.0.clone(),
                converged: false,
                iterations: 7,
            })
        }
    }

    #[test]
    fn test_fixed_weight_mismatch() {
        let err = RetrievalModel::fixed(probes(&["cooc", "hier"]), FitConfig::default(), vec![1.0])
            .unwrap_err();
        assert!(matches!(
            err,
            CueFitError::ConfigurationMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_fixed_scenario() {
        let cues = CueSet::new(vec![ProbeSeries::new(vec![0.8], vec![vec![0.8, 0.2]])]).unwrap();
        let model = RetrievalModel::fixed(probes(&["cooc"]), FitConfig::default(), vec![1.0]).unwrap();
        let outcome = model.fit(&cues).unwrap();
        assert!(outcome.converged);
        assert_eq!(outcome.weights, vec![1.0]);
        assert!((outcome.loss - 0.223).abs() < 1e-3);
        assert_eq!(model.k(), 0);
    }

    #[test]
    fn test_learning_beats_zero_weights() {
        let cues = informative_cues();
        let model = RetrievalModel::learned(probes(&["cooc"]), FitConfig::default()).unwrap();
        let outcome = model.fit(&cues).unwrap();
        let uniform = model.evaluate(&cues, &[0.0]).unwrap();

        assert!(outcome.loss < uniform);
        assert!(outcome.weights[0] > 0.0);
        assert_eq!(model.k(), 1);
    }

    #[test]
    fn test_learned_weights_respect_lower_bound() {
        // Choices always go to the least similar item, so the best
        // unconstrained weight would be negative.
        let series = ProbeSeries::new(
            vec![0.1, 0.2],
            vec![vec![0.1, 0.9, 0.8], vec![0.2, 0.7]],
        );
        let cues = CueSet::new(vec![series]).unwrap();
        let model = RetrievalModel::learned(probes(&["cooc"]), FitConfig::default()).unwrap();
        let outcome = model.fit(&cues).unwrap();
        assert!(outcome.weights[0] >= 0.0);
        assert!(outcome.weights[0] < 1e-3);
    }

    #[test]
    fn test_small_positive_weight_is_found() {
        // Best weight is about 0.23 and the loss at 0.5 exceeds the loss
        // at 0, so the optimum lies between the bound and the first step.
        let series = ProbeSeries::new(
            vec![0.9, 0.1, 0.5, 0.6, 0.8],
            vec![
                vec![0.9, 0.1, 0.2],
                vec![0.1, 0.9, 0.8],
                vec![0.5, 0.4, 0.6],
                vec![0.6, 0.2, 0.9],
                vec![0.8, 0.3, 0.5],
            ],
        );
        let cues = CueSet::new(vec![series]).unwrap();
        let model = RetrievalModel::learned(probes(&["cooc"]), FitConfig::default()).unwrap();

        let (grid_weight, grid_loss) = (0..=2000)
            .map(|i| i as f64 / 1000.0)
            .map(|w| (w, model.evaluate(&cues, &[w]).unwrap()))
            .fold((0.0, f64::INFINITY), |best, cur| if cur.1 < best.1 { cur } else { best });
        assert!(grid_weight > 0.1 && grid_weight < 0.5);
        assert!(model.evaluate(&cues, &[0.5]).unwrap() > model.evaluate(&cues, &[0.0]).unwrap());

        let outcome = model.fit(&cues).unwrap();
        assert!(outcome.converged);
        assert!(
            (outcome.weights[0] - grid_weight).abs() < 1e-2,
            "fitted {} vs grid {}",
            outcome.weights[0],
            grid_weight
        );
        assert!(outcome.loss <= grid_loss + 1e-6);
    }

    #[test]
    fn test_probe_count_mismatch() {
        let model = RetrievalModel::learned(probes(&["cooc", "w2v"]), FitConfig::default()).unwrap();
        let err = model.fit(&informative_cues()).unwrap_err();
        assert!(matches!(err, CueFitError::ConfigurationMismatch { .. }));
    }

    #[test]
    fn test_non_convergence_is_reported() {
        let model = RetrievalModel::new(
            probes(&["cooc"]),
            FitConfig::default(),
            WeightMode::Learn,
            Arc::new(Fixed(vec![1.0])),
        )
        .unwrap();
        let outcome = model.fit(&informative_cues()).unwrap();
        assert!(!outcome.converged);
        assert_eq!(outcome.weights, vec![1.0]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = FitConfig::default().with_jitter(-1.0);
        assert!(RetrievalModel::learned(probes(&["cooc"]), config).is_err());
    }
}

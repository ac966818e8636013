//! Similarity cues for one participant's decision sequence.

use serde::{Deserialize, Serialize};

use crate::error::{CueFitError, CueFitResult};

/// Similarities of every item still available at a decision step.
pub type SimilarityList = Vec<f64>;

/// The cue values of one representation at one decision step.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Cue {
    /// Similarity between the previous choice and the item chosen now.
    pub current: f64,
    /// Similarity between the previous choice and each item not yet chosen.
    pub remaining: SimilarityList,
}

impl Cue {
    pub fn new(current: f64, remaining: impl Into<SimilarityList>) -> Self {
        Self {
            current,
            remaining: remaining.into(),
        }
    }
}

/// One representation's cues over a whole decision sequence.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProbeSeries {
    /// One value per step.
    pub current: Vec<f64>,
    /// One list per step.
    pub remaining: Vec<SimilarityList>,
}

impl ProbeSeries {
    pub fn new(current: Vec<f64>, remaining: Vec<SimilarityList>) -> Self {
        Self { current, remaining }
    }

    /// Build a series from per-step cues.
    pub fn from_cues<'a>(cues: impl IntoIterator<Item = &'a Cue>) -> Self {
        let (current, remaining) = cues
            .into_iter()
            .map(|c| (c.current, c.remaining.clone()))
            .unzip();
        Self { current, remaining }
    }

    pub fn steps(&self) -> usize {
        self.current.len()
    }
}

/// Column-oriented cues for a set of probes over one decision sequence.
///
/// Construction guarantees that all probes cover the same number of steps
/// and agree on the number of competitors at every step, so the retrieval
/// computation can index them freely.
#[derive(Debug, Clone, PartialEq)]
pub struct CueSet {
    probes: Vec<ProbeSeries>,
    steps: usize,
}

impl CueSet {
    /// Validate and wrap probe series.
    pub fn new(probes: Vec<ProbeSeries>) -> CueFitResult<Self> {
        let Some(first) = probes.first() else {
            return Err(CueFitError::empty("A cue set needs at least one probe"));
        };
        let steps = first.steps();

        for (p, probe) in probes.iter().enumerate() {
            if probe.current.len() != probe.remaining.len() {
                return Err(CueFitError::misaligned(format!(
                    "Probe {} has {} current values but {} remaining lists",
                    p,
                    probe.current.len(),
                    probe.remaining.len()
                )));
            }
            if probe.steps() != steps {
                return Err(CueFitError::misaligned(format!(
                    "Probe {} covers {} steps, expected {}",
                    p,
                    probe.steps(),
                    steps
                )));
            }
        }

        for step in 0..steps {
            let competitors = first.remaining[step].len();
            if let Some(p) = probes
                .iter()
                .position(|probe| probe.remaining[step].len() != competitors)
            {
                return Err(CueFitError::misaligned(format!(
                    "Step {}: probe {} lists {} remaining items, probe 0 lists {}",
                    step,
                    p,
                    probes[p].remaining[step].len(),
                    competitors
                )));
            }
        }

        Ok(Self { probes, steps })
    }

    pub fn probes(&self) -> &[ProbeSeries] {
        &self.probes
    }

    pub fn num_probes(&self) -> usize {
        self.probes.len()
    }

    /// Number of decision steps.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Number of remaining items at a step.
    pub fn competitors(&self, step: usize) -> usize {
        self.probes[0].remaining[step].len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cues() {
        let cues = vec![Cue::new(0.8, vec![0.8, 0.2]), Cue::new(0.2, vec![0.2])];
        let series = ProbeSeries::from_cues(&cues);
        assert_eq!(series.current, vec![0.8, 0.2]);
        assert_eq!(series.remaining, vec![vec![0.8, 0.2], vec![0.2]]);
        assert_eq!(series.steps(), 2);
    }

    #[test]
    fn test_valid_cue_set() {
        let a = ProbeSeries::new(vec![0.5, 0.1], vec![vec![0.5, 0.3], vec![]]);
        let b = ProbeSeries::new(vec![0.9, 0.4], vec![vec![0.9, 0.1], vec![]]);
        let set = CueSet::new(vec![a, b]).unwrap();
        assert_eq!(set.num_probes(), 2);
        assert_eq!(set.steps(), 2);
        assert_eq!(set.competitors(0), 2);
        assert_eq!(set.competitors(1), 0);
    }

    #[test]
    fn test_empty_probe_list_rejected() {
        assert!(CueSet::new(vec![]).is_err());
    }

    #[test]
    fn test_step_count_mismatch_rejected() {
        let a = ProbeSeries::new(vec![0.5], vec![vec![0.5]]);
        let b = ProbeSeries::new(vec![0.5, 0.2], vec![vec![0.5], vec![0.2]]);
        let err = CueSet::new(vec![a, b]).unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::DataMisaligned);
    }

    #[test]
    fn test_competitor_mismatch_rejected() {
        let a = ProbeSeries::new(vec![0.5], vec![vec![0.5, 0.1]]);
        let b = ProbeSeries::new(vec![0.5], vec![vec![0.5]]);
        assert!(CueSet::new(vec![a, b]).is_err());
    }

    #[test]
    fn test_ragged_series_rejected() {
        let a = ProbeSeries::new(vec![0.5, 0.4], vec![vec![0.5]]);
        assert!(CueSet::new(vec![a]).is_err());
    }
}

//! Core types for cuefit.

mod cue;
mod probe;
mod result;

pub use cue::{Cue, CueSet, ProbeSeries, SimilarityList};
pub use probe::ProbeConfig;
pub use result::{FitResult, ModelComparison, ModelComparisonRow, WeightSummary};

//! Model comparison across representation subsets.
//!
//! The [`Driver`] fits the uniform baseline and every non-empty subset of
//! the configured representations to each participant, then
//! [`summarise`] turns the fits into a [`ModelComparison`] ranked by
//! parameter count and BIC improvement over the baseline.
//!
//! [`ModelComparison`]: crate::types::ModelComparison

mod baseline;
mod comparison;
mod driver;
pub mod stats;

pub use baseline::{baseline_probes, baseline_table, BASELINE_MODEL, BASELINE_REPRESENTATION};
pub use comparison::summarise;
pub use driver::{enumerate_variants, AnalysisOutcome, Driver, ModelVariant};

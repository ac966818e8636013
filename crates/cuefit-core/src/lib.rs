//! cuefit-core - Core library for cuefit.
//!
//! Fits a multi-cue retrieval model to sequences of choices and compares
//! how well different similarity representations explain them.
//!
//! The retrieval strength of an observed choice is the attention-weighted
//! product of its similarities to the previous choice, divided by the sum
//! of the same product over every item still available. Attention weights
//! are fitted per participant by maximum likelihood, and every subset of
//! representations is compared against a uniform-choice baseline using
//! AIC and BIC.
//!
//! # Example
//!
//! ```no_run
//! use cuefit_core::{Driver, RunConfig, TransitionTable};
//! use cuefit_core::types::ProbeConfig;
//!
//! let config = RunConfig::default();
//! let probes = ProbeConfig::for_representations(&config.representations);
//! let table = TransitionTable::from_path(&config.transition_table, &probes)?
//!     .with_condition(config.condition);
//!
//! let outcome = Driver::new(config)?.run(&table)?;
//! println!("{}", cuefit_core::report::render_console(&outcome.comparison));
//! # Ok::<(), cuefit_core::CueFitError>(())
//! ```

pub mod analysis;
pub mod config;
pub mod data;
pub mod error;
pub mod model;
pub mod report;
pub mod types;

// Re-export commonly used types
pub use analysis::{AnalysisOutcome, Driver, ModelVariant};
pub use config::{Condition, FitConfig, FitErrorPolicy, OptimiserConfig, OutputConfig, RunConfig};
pub use data::{TransitionRecord, TransitionTable};
pub use error::{CueFitError, CueFitResult, ErrorCode};
pub use model::{
    negative_log_likelihood, retrieval_strengths, FitOutcome, Minimiser, NelderMeadMinimiser,
    RetrievalModel, WeightMode,
};
pub use types::{Cue, CueSet, FitResult, ModelComparison, ModelComparisonRow, ProbeConfig};

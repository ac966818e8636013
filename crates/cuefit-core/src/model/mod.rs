//! The retrieval model: strengths, loss, and weight fitting.

mod fitter;
mod loss;
mod optimise;
mod retrieval;

pub use fitter::{FitOutcome, RetrievalModel, WeightMode};
pub use loss::{negative_log_likelihood, sanitize_probability, DEFAULT_ZERO_FLOOR};
pub use optimise::{project, Bound, Minimiser, Minimum, NelderMeadMinimiser, Objective};
pub use retrieval::{retrieval_strengths, DEFAULT_JITTER};

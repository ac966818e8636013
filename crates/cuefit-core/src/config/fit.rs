//! Numeric configuration for the retrieval model and its optimiser.

use serde::{Deserialize, Serialize};

/// Configuration for the retrieval-strength computation and loss.
///
/// These replace what would otherwise be scattered default arguments:
/// every numeric guard used by the model lives here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Constant added to every similarity before exponentiation, so that a
    /// similarity of 0 never produces `0^w`.
    ///
    /// Must be >= 0. Set to 0 to disable. Default: 1e-7
    pub jitter: f64,

    /// Floor applied to retrieval strengths before taking the log.
    ///
    /// Strengths <= this value are replaced by it. Must be >= 0; 0 disables
    /// the floor. Default: 1e-8
    pub zero_floor: f64,

    /// Lower bound on every learned attention weight. No upper bound.
    /// Default: 0.0
    pub weight_lower_bound: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            jitter: 1.0e-7,
            zero_floor: 1.0e-8,
            weight_lower_bound: 0.0,
        }
    }
}

impl FitConfig {
    /// Create a new FitConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the jitter constant.
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter;
        self
    }

    /// Set the zero floor used by the loss.
    pub fn with_zero_floor(mut self, zero_floor: f64) -> Self {
        self.zero_floor = zero_floor;
        self
    }

    /// Set the lower bound on learned weights.
    pub fn with_weight_lower_bound(mut self, bound: f64) -> Self {
        self.weight_lower_bound = bound;
        self
    }

    /// Validate configuration values are in valid ranges.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !(self.jitter >= 0.0 && self.jitter.is_finite()) {
            return Err("jitter must be a finite value >= 0");
        }
        if !(self.zero_floor >= 0.0 && self.zero_floor < 1.0) {
            return Err("zero_floor must be in [0, 1)");
        }
        if !self.weight_lower_bound.is_finite() {
            return Err("weight_lower_bound must be finite");
        }
        Ok(())
    }
}

/// Configuration for the Nelder-Mead minimiser.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimiserConfig {
    /// Iteration budget. Reaching it is reported as non-convergence.
    /// Default: 500
    pub max_iters: u64,

    /// Stop once the standard deviation of the simplex costs drops below
    /// this value. Default: 1e-10
    pub sd_tolerance: f64,

    /// Offset along each axis used to build the initial simplex around the
    /// starting point. Default: 0.5
    pub initial_step: f64,
}

impl Default for OptimiserConfig {
    fn default() -> Self {
        Self {
            max_iters: 500,
            sd_tolerance: 1.0e-10,
            initial_step: 0.5,
        }
    }
}

impl OptimiserConfig {
    /// Config for quick exploratory runs (looser tolerance, fewer iterations).
    pub fn quick() -> Self {
        Self {
            max_iters: 150,
            sd_tolerance: 1.0e-6,
            initial_step: 0.5,
        }
    }

    /// Config for final runs (tight tolerance, generous budget).
    pub fn thorough() -> Self {
        Self {
            max_iters: 2000,
            sd_tolerance: 1.0e-12,
            initial_step: 1.0,
        }
    }

    /// Validate configuration values are in valid ranges.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.max_iters == 0 {
            return Err("max_iters must be at least 1");
        }
        if !(self.sd_tolerance > 0.0) {
            return Err("sd_tolerance must be positive");
        }
        if !(self.initial_step > 0.0 && self.initial_step.is_finite()) {
            return Err("initial_step must be a positive finite value");
        }
        Ok(())
    }
}

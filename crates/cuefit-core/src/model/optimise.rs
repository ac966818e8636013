//! Bounded minimisation of a scalar objective.
//!
//! The fitter only depends on the [`Minimiser`] trait. The shipped
//! implementation runs `argmin`'s Nelder-Mead simplex. A trial point
//! outside the box is evaluated at its projection plus a quadratic penalty
//! on the distance moved, so the cost keeps rising away from the box and
//! the simplex cannot collapse onto a flat region past a bound.

use argmin::core::{CostFunction, Error as ArgminError, Executor, State, TerminationReason};
use argmin::solver::neldermead::NelderMead;

use crate::config::OptimiserConfig;
use crate::error::{CueFitError, CueFitResult};

/// Objective handed to a minimiser.
pub type Objective<'a> = dyn Fn(&[f64]) -> CueFitResult<f64> + Sync + 'a;

/// Box constraint for one coordinate. `None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bound {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl Bound {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn at_least(lower: f64) -> Self {
        Self {
            lower: Some(lower),
            upper: None,
        }
    }

    pub fn project(&self, value: f64) -> f64 {
        let value = match self.lower {
            Some(lo) if value < lo => lo,
            _ => value,
        };
        match self.upper {
            Some(hi) if value > hi => hi,
            _ => value,
        }
    }
}

/// Project a point into a set of per-coordinate bounds.
///
/// Coordinates without a matching bound are left as they are.
pub fn project(x: &[f64], bounds: &[Bound]) -> Vec<f64> {
    x.iter()
        .enumerate()
        .map(|(i, v)| bounds.get(i).map_or(*v, |b| b.project(*v)))
        .collect()
}

/// Result of a minimisation.
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    /// Best point found, inside the bounds.
    pub x: Vec<f64>,
    /// Objective value at `x`.
    pub fun: f64,
    pub converged: bool,
    pub iterations: u64,
}

/// Minimises a scalar objective subject to box bounds.
pub trait Minimiser: Send + Sync {
    /// Errors returned by `objective` abort the run and are returned as-is.
    fn minimise(
        &self,
        objective: &Objective<'_>,
        x0: &[f64],
        bounds: &[Bound],
    ) -> CueFitResult<Minimum>;
}

/// Nelder-Mead simplex search.
#[derive(Debug, Clone, Default)]
pub struct NelderMeadMinimiser {
    config: OptimiserConfig,
}

impl NelderMeadMinimiser {
    pub fn new(config: OptimiserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OptimiserConfig {
        &self.config
    }

    /// `x0` plus one vertex per coordinate, offset by the initial step.
    fn initial_simplex(&self, x0: &[f64]) -> Vec<Vec<f64>> {
        let mut simplex = Vec::with_capacity(x0.len() + 1);
        simplex.push(x0.to_vec());
        for i in 0..x0.len() {
            let mut vertex = x0.to_vec();
            vertex[i] += self.config.initial_step;
            simplex.push(vertex);
        }
        simplex
    }
}

/// Adapter exposing a bounded objective to argmin.
///
/// Points inside the box cost exactly the objective. Points outside cost
/// the objective at the projection plus `d² · (1 + |f|)`, where `d` is the
/// distance to the projection, which is strictly more than any in-box cost
/// at that projection.
struct Penalised<'a, 'b> {
    objective: &'a Objective<'b>,
    bounds: &'a [Bound],
}

impl Penalised<'_, '_> {
    fn evaluate(&self, param: &[f64]) -> CueFitResult<f64> {
        let x = project(param, self.bounds);
        let fun = (self.objective)(&x)?;
        let distance_sq: f64 = param
            .iter()
            .zip(&x)
            .map(|(p, q)| (p - q).powi(2))
            .sum();
        if distance_sq == 0.0 {
            return Ok(fun);
        }
        Ok(fun + distance_sq * (1.0 + fun.abs()))
    }
}

impl CostFunction for Penalised<'_, '_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> Result<Self::Output, ArgminError> {
        self.evaluate(param).map_err(ArgminError::new)
    }
}

impl Minimiser for NelderMeadMinimiser {
    fn minimise(
        &self,
        objective: &Objective<'_>,
        x0: &[f64],
        bounds: &[Bound],
    ) -> CueFitResult<Minimum> {
        if x0.is_empty() {
            let fun = objective(x0)?;
            return Ok(Minimum {
                x: Vec::new(),
                fun,
                converged: true,
                iterations: 0,
            });
        }

        let start = project(x0, bounds);
        let solver = NelderMead::new(self.initial_simplex(&start))
            .with_sd_tolerance(self.config.sd_tolerance)
            .map_err(|e| CueFitError::optimiser(e.to_string()))?;

        let problem = Penalised { objective, bounds };
        let max_iters = self.config.max_iters;
        let result = Executor::new(problem, solver)
            .configure(|state| state.max_iters(max_iters))
            .run()
            .map_err(|e| match e.downcast::<CueFitError>() {
                Ok(inner) => inner,
                Err(other) => CueFitError::optimiser(other.to_string()),
            })?;

        let state = result.state();
        let best = state
            .get_best_param()
            .cloned()
            .ok_or_else(|| CueFitError::optimiser("Nelder-Mead returned no parameters"))?;
        let converged = matches!(
            state.get_termination_reason(),
            Some(TerminationReason::SolverConverged | TerminationReason::TargetCostReached)
        );

        // The best vertex may sit just past a bound, where its cost
        // includes the penalty.
        let x = project(&best, bounds);
        let fun = if x == best {
            state.get_best_cost()
        } else {
            objective(&x)?
        };

        Ok(Minimum {
            x,
            fun,
            converged,
            iterations: state.get_iter(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quadratic(x: &[f64]) -> CueFitResult<f64> {
        Ok((x[0] - 1.5).powi(2) + (x[1] + 0.5).powi(2))
    }

    #[test]
    fn test_bound_projection() {
        let b = Bound::at_least(0.0);
        assert_eq!(b.project(-2.0), 0.0);
        assert_eq!(b.project(3.0), 3.0);

        let boxed = Bound {
            lower: Some(-1.0),
            upper: Some(1.0),
        };
        assert_eq!(boxed.project(5.0), 1.0);
        assert_eq!(Bound::unbounded().project(-7.0), -7.0);
    }

    #[test]
    fn test_initial_simplex() {
        let nm = NelderMeadMinimiser::new(OptimiserConfig::default());
        let simplex = nm.initial_simplex(&[0.0, 1.0]);
        assert_eq!(simplex, vec![vec![0.0, 1.0], vec![0.5, 1.0], vec![0.0, 1.5]]);
    }

    #[test]
    fn test_unbounded_quadratic() {
        let nm = NelderMeadMinimiser::default();
        let min = nm
            .minimise(&quadratic, &[0.0, 0.0], &[Bound::unbounded(); 2])
            .unwrap();
        assert!((min.x[0] - 1.5).abs() < 1e-3);
        assert!((min.x[1] + 0.5).abs() < 1e-3);
        assert!(min.fun < 1e-6);
    }

    #[test]
    fn test_lower_bound_respected() {
        let nm = NelderMeadMinimiser::default();
        let min = nm
            .minimise(&quadratic, &[0.0, 0.0], &[Bound::at_least(0.0); 2])
            .unwrap();
        assert!(min.x.iter().all(|v| *v >= 0.0));
        assert!((min.x[0] - 1.5).abs() < 1e-3);
        assert!(min.x[1].abs() < 1e-3);
    }

    #[test]
    fn test_penalty_only_outside_bounds() {
        let shallow = |x: &[f64]| -> CueFitResult<f64> { Ok((x[0] - 0.2).powi(2)) };
        let bounds = [Bound::at_least(0.0)];
        let penalised = Penalised {
            objective: &shallow,
            bounds: &bounds,
        };
        let at_bound = penalised.evaluate(&[0.0]).unwrap();
        assert!((at_bound - 0.04).abs() < 1e-12);
        assert!(penalised.evaluate(&[-0.25]).unwrap() > at_bound);
        assert!(penalised.evaluate(&[-0.5]).unwrap() > penalised.evaluate(&[-0.25]).unwrap());
    }

    #[test]
    fn test_interior_optimum_near_lower_bound() {
        // f(0) < f(0.5), so the first reflection leaves the box.
        let shallow = |x: &[f64]| -> CueFitResult<f64> { Ok((x[0] - 0.2).powi(2)) };
        let nm = NelderMeadMinimiser::default();
        let min = nm
            .minimise(&shallow, &[0.0], &[Bound::at_least(0.0)])
            .unwrap();
        assert!(min.converged);
        assert!((min.x[0] - 0.2).abs() < 1e-3, "stopped at {}", min.x[0]);
        assert!(min.fun < 1e-6);
    }

    #[test]
    fn test_iteration_cap_is_not_convergence() {
        let config = OptimiserConfig {
            max_iters: 2,
            ..OptimiserConfig::default()
        };
        let nm = NelderMeadMinimiser::new(config);
        let min = nm
            .minimise(&quadratic, &[10.0, 10.0], &[Bound::unbounded(); 2])
            .unwrap();
        assert!(!min.converged);
        assert!(min.iterations <= 2);
    }

    #[test]
    fn test_objective_error_surfaces() {
        let failing = |_: &[f64]| -> CueFitResult<f64> {
            Err(CueFitError::probability_range(vec![2.0]))
        };
        let nm = NelderMeadMinimiser::default();
        let err = nm
            .minimise(&failing, &[0.0], &[Bound::at_least(0.0)])
            .unwrap_err();
        assert_eq!(err.offending_values(), Some(&[2.0][..]));
    }
}

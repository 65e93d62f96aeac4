//! Nelder-Mead minimization shared by the fitted models.
//!
//! Wraps the `argmin` simplex solver. Objectives are plain closures over
//! `&[f64]`; non-finite values are mapped to a large finite penalty so the
//! simplex ordering stays well defined.

use argmin::core::{CostFunction, Error, Executor, State, TerminationReason};
use argmin::solver::neldermead::NelderMead;

use crate::error::{ForecastError, Result};

/// Cost assigned to parameter vectors where the objective is not finite.
pub(crate) const PENALTY: f64 = 1e100;

/// Solver settings.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SimplexConfig {
    /// Offset of the initial simplex vertices along each axis
    pub initial_step: f64,
    /// Stop once the standard deviation of vertex costs drops below this
    pub sd_tolerance: f64,
    /// Iteration cap; reaching it counts as failure to converge
    pub max_iters: u64,
}

impl Default for SimplexConfig {
    fn default() -> Self {
        Self {
            initial_step: 0.1,
            sd_tolerance: 1e-10,
            max_iters: 5000,
        }
    }
}

/// Result of a converged minimization.
#[derive(Debug, Clone)]
pub(crate) struct Minimum {
    pub point: Vec<f64>,
    pub value: f64,
    pub iterations: u64,
}

struct Objective<F> {
    f: F,
}

impl<F> CostFunction for Objective<F>
where
    F: Fn(&[f64]) -> f64,
{
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> std::result::Result<Self::Output, Error> {
        let value = (self.f)(param);
        Ok(if value.is_finite() { value } else { PENALTY })
    }
}

/// Minimize `objective` starting from `initial`.
///
/// # Errors
/// [`ForecastError::Convergence`] if the solver errors, hits the iteration
/// cap, or only finds penalized points.
pub(crate) fn minimize<F>(objective: F, initial: &[f64], config: SimplexConfig) -> Result<Minimum>
where
    F: Fn(&[f64]) -> f64,
{
    if initial.is_empty() {
        return Err(ForecastError::InvalidInput(
            "Cannot minimize over zero parameters".to_string(),
        ));
    }

    let mut simplex = Vec::with_capacity(initial.len() + 1);
    simplex.push(initial.to_vec());
    for i in 0..initial.len() {
        let mut vertex = initial.to_vec();
        vertex[i] += config.initial_step;
        simplex.push(vertex);
    }

    let solver = NelderMead::new(simplex)
        .with_sd_tolerance(config.sd_tolerance)
        .map_err(|e| ForecastError::Convergence(format!("Invalid solver settings: {}", e)))?;

    let result = Executor::new(Objective { f: objective }, solver)
        .configure(|state| state.max_iters(config.max_iters))
        .run()
        .map_err(|e| ForecastError::Convergence(format!("Optimizer failed: {}", e)))?;

    let state = result.state();
    let iterations = state.get_iter();
    if !matches!(
        state.get_termination_reason(),
        Some(TerminationReason::SolverConverged)
    ) {
        return Err(ForecastError::Convergence(format!(
            "Nelder-Mead did not converge within {} iterations",
            iterations
        )));
    }

    let value = state.get_best_cost();
    let point = state
        .get_best_param()
        .cloned()
        .ok_or_else(|| ForecastError::Convergence("Optimizer returned no solution".to_string()))?;
    if value >= PENALTY {
        return Err(ForecastError::Convergence(
            "Objective is not finite anywhere on the search path".to_string(),
        ));
    }

    Ok(Minimum {
        point,
        value,
        iterations,
    })
}

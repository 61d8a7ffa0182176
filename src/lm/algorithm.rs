//! Implementation of the Levenberg-Marquardt algorithm.
//!
//! This module contains the core damped Gauss-Newton iteration used by the
//! Gaussian fit. The damped normal equations
//! `(JᵀJ + λ·diag(JᵀJ)) δ = -Jᵀr` are solved with nalgebra.

use nalgebra::{DMatrix, DVector};
use ndarray::Array1;
use serde::Serialize;
use std::fmt;

use crate::error::{PeakFitError, Result};
use crate::problem::Problem;
use crate::utils::finite_difference;
use crate::utils::matrix_convert::{
    nalgebra_vec_to_ndarray, ndarray_to_nalgebra, ndarray_vec_to_nalgebra,
};

use super::config::{DecompositionMethod, DiffMethod, LmConfig};
use super::convergence::{ConvergenceCriteria, ConvergenceStatus};

/// Result of the Levenberg-Marquardt optimization.
#[derive(Debug, Clone, Serialize)]
pub struct LmResult {
    /// Optimized parameter values
    pub params: Array1<f64>,

    /// Residuals at the solution
    pub residuals: Array1<f64>,

    /// Sum of squared residuals
    pub cost: f64,

    /// Number of iterations performed
    pub iterations: usize,

    /// Number of function evaluations
    pub func_evals: usize,

    /// Whether the termination state is in the accepted success set
    pub success: bool,

    /// Termination state reported by the optimizer
    pub status: ConvergenceStatus,

    /// A message describing the result
    pub message: String,
}

impl fmt::Display for LmResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Optimization Result:")?;
        writeln!(f, "  Success: {}", self.success)?;
        writeln!(f, "  Message: {}", self.message)?;
        writeln!(f, "  Cost: {:.6e}", self.cost)?;
        writeln!(f, "  Iterations: {}", self.iterations)?;
        writeln!(f, "  Function evaluations: {}", self.func_evals)?;
        writeln!(f, "  Parameters: {:?}", self.params)?;
        Ok(())
    }
}

/// The Levenberg-Marquardt optimizer.
#[derive(Debug, Clone, Default)]
pub struct LevenbergMarquardt {
    /// Configuration options
    config: LmConfig,
}

impl LevenbergMarquardt {
    /// Create a new Levenberg-Marquardt optimizer with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new Levenberg-Marquardt optimizer with the given configuration.
    pub fn with_config(config: LmConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &LmConfig {
        &self.config
    }

    /// Set the maximum number of iterations.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    /// Set the tolerance for relative reduction of the cost.
    pub fn with_ftol(mut self, ftol: f64) -> Self {
        self.config.ftol = ftol;
        self
    }

    /// Set the tolerance for the relative step length.
    pub fn with_xtol(mut self, xtol: f64) -> Self {
        self.config.xtol = xtol;
        self
    }

    /// Set the tolerance for the scaled gradient.
    pub fn with_gtol(mut self, gtol: f64) -> Self {
        self.config.gtol = gtol;
        self
    }

    /// Set the initial value for the damping parameter.
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.config.initial_lambda = lambda;
        self
    }

    /// Set the method used for calculating the Jacobian.
    pub fn with_differentiation_method(mut self, method: DiffMethod) -> Self {
        self.config.diff_method = method;
        self
    }

    /// Set the method used for solving the linear system.
    pub fn with_decomposition_method(mut self, method: DecompositionMethod) -> Self {
        self.config.decomposition_method = method;
        self
    }

    /// Minimize the sum of squared residuals for the given problem.
    ///
    /// Failing to converge is not an error: the returned [`LmResult`] carries
    /// `success = false` and the terminating [`ConvergenceStatus`]. Errors are
    /// reserved for invalid input (wrong parameter count, non-finite initial
    /// residuals) and failures inside the problem itself.
    ///
    /// # Arguments
    ///
    /// * `problem` - The problem to solve
    /// * `initial_params` - Initial guess for the parameter values
    ///
    /// # Returns
    ///
    /// * `Result<LmResult>` - The result of the optimization
    pub fn minimize<P: Problem>(
        &self,
        problem: &P,
        initial_params: Array1<f64>,
    ) -> Result<LmResult> {
        let n_params = problem.parameter_count();
        if initial_params.len() != n_params {
            return Err(PeakFitError::DimensionMismatch(format!(
                "Expected {} parameters, got {}",
                n_params,
                initial_params.len()
            )));
        }

        let criteria = ConvergenceCriteria::from(&self.config);
        let mut params = initial_params;
        let mut residuals = problem.eval(&params)?;
        let mut func_evals = 1;
        let mut cost = sum_of_squares(&residuals);
        if !cost.is_finite() {
            return Err(PeakFitError::InvalidInput(
                "Residuals at the initial parameters are not finite".to_string(),
            ));
        }

        let mut lambda = self.config.initial_lambda;
        let mut iterations = 0;

        let status = loop {
            if iterations >= self.config.max_iterations {
                break ConvergenceStatus::MaxIterationsReached;
            }

            let jac = self.jacobian(problem, &params)?;
            func_evals += if self.uses_problem_jacobian(problem) { 0 } else { n_params };
            let j = ndarray_to_nalgebra(&jac)?;
            let r = ndarray_vec_to_nalgebra(&residuals)?;
            let jt = j.transpose();
            let jtj = &jt * &j;
            let g = &jt * &r;

            if !g.iter().all(|v| v.is_finite()) {
                break ConvergenceStatus::NumericalError;
            }
            if criteria.gradient_converged(scaled_gradient_norm(&j, &g, cost)) {
                break ConvergenceStatus::GradientConvergence;
            }

            iterations += 1;
            let param_norm = params.iter().map(|p| p * p).sum::<f64>().sqrt();

            // Inner loop: raise the damping until a step reduces the cost.
            let step_status = loop {
                let step = match self.solve_damped(&jtj, &g, lambda) {
                    Some(step) => step,
                    None => {
                        lambda *= self.config.lambda_up_factor;
                        if lambda > self.config.max_lambda {
                            break ConvergenceStatus::DampingExhausted;
                        }
                        continue;
                    }
                };

                let step_norm = step.norm();
                let predicted = predicted_reduction(&j, &r, &step, cost);
                let trial = &params + &nalgebra_vec_to_ndarray(&step)?;
                let trial_residuals = problem.eval(&trial)?;
                func_evals += 1;
                let trial_cost = sum_of_squares(&trial_residuals);
                let actual = if cost > 0.0 && trial_cost.is_finite() {
                    1.0 - trial_cost / cost
                } else if trial_cost.is_finite() {
                    0.0
                } else {
                    -1.0
                };

                log::trace!(
                    "lm iteration {}: lambda = {:.3e}, cost = {:.6e}, trial cost = {:.6e}",
                    iterations,
                    lambda,
                    cost,
                    trial_cost
                );

                if trial_cost.is_finite() && trial_cost < cost {
                    let status = criteria.check(param_norm, step_norm, actual, predicted);
                    params = trial;
                    residuals = trial_residuals;
                    cost = trial_cost;
                    lambda = (lambda * self.config.lambda_down_factor).max(self.config.min_lambda);
                    break status;
                }

                // Rejected step: the current point may already be optimal.
                if criteria.cost_converged(actual, predicted) {
                    break ConvergenceStatus::FunctionValueConvergence;
                }
                if criteria.step_converged(param_norm, step_norm) {
                    break ConvergenceStatus::ParameterConvergence;
                }

                lambda *= self.config.lambda_up_factor;
                if lambda > self.config.max_lambda {
                    break ConvergenceStatus::DampingExhausted;
                }
            };

            if step_status.is_terminated() {
                break step_status;
            }
        };

        log::debug!(
            "lm finished after {} iterations ({} evaluations): {}",
            iterations,
            func_evals,
            status.description()
        );

        Ok(LmResult {
            params,
            residuals,
            cost,
            iterations,
            func_evals,
            success: status.is_converged(),
            status,
            message: status.description(),
        })
    }

    fn uses_problem_jacobian<P: Problem>(&self, problem: &P) -> bool {
        self.config.diff_method == DiffMethod::Analytical && problem.has_custom_jacobian()
    }

    fn jacobian<P: Problem>(&self, problem: &P, params: &Array1<f64>) -> Result<ndarray::Array2<f64>> {
        if self.uses_problem_jacobian(problem) {
            problem.jacobian(params)
        } else {
            finite_difference::jacobian(problem, params, None)
        }
    }

    /// Solve `(JᵀJ + λ·diag(JᵀJ)) δ = -Jᵀr`.
    ///
    /// # Arguments
    ///
    /// * `jtj` - The approximate Hessian `JᵀJ`
    /// * `g` - The gradient `Jᵀr`
    /// * `lambda` - The damping parameter
    ///
    /// # Returns
    ///
    /// * `Option<DVector<f64>>` - The step, or None if the system cannot be
    ///   solved with the configured decomposition
    fn solve_damped(&self, jtj: &DMatrix<f64>, g: &DVector<f64>, lambda: f64) -> Option<DVector<f64>> {
        let mut a = jtj.clone();
        for i in 0..a.nrows() {
            a[(i, i)] += lambda * jtj[(i, i)].max(1e-12);
        }
        let rhs = -g;

        let step = match self.config.decomposition_method {
            DecompositionMethod::Cholesky => a.cholesky().map(|c| c.solve(&rhs)),
            DecompositionMethod::Svd => a.svd(true, true).solve(&rhs, 1e-14).ok(),
            DecompositionMethod::Auto => match a.clone().cholesky() {
                Some(c) => Some(c.solve(&rhs)),
                None => a.svd(true, true).solve(&rhs, 1e-14).ok(),
            },
        }?;

        if step.iter().all(|v| v.is_finite()) {
            Some(step)
        } else {
            None
        }
    }
}

fn sum_of_squares(residuals: &Array1<f64>) -> f64 {
    residuals.iter().map(|r| r * r).sum()
}

/// Largest cosine between the residual vector and a Jacobian column.
fn scaled_gradient_norm(j: &DMatrix<f64>, g: &DVector<f64>, cost: f64) -> f64 {
    if cost == 0.0 {
        return 0.0;
    }
    let r_norm = cost.sqrt();
    j.column_iter()
        .zip(g.iter())
        .map(|(col, gi)| {
            let col_norm = col.norm();
            if col_norm == 0.0 {
                0.0
            } else {
                (gi / (col_norm * r_norm)).abs()
            }
        })
        .fold(0.0, f64::max)
}

/// Relative cost reduction predicted by the linearized model.
fn predicted_reduction(j: &DMatrix<f64>, r: &DVector<f64>, step: &DVector<f64>, cost: f64) -> f64 {
    if cost == 0.0 {
        return 0.0;
    }
    let linearized = r + j * step;
    1.0 - linearized.norm_squared() / cost
}

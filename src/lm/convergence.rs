//! Convergence criteria for the Levenberg-Marquardt iteration.
//!
//! This module defines the criteria used to determine when the optimizer has
//! converged and the set of termination states that count as success.

use super::config::LmConfig;
use serde::{Deserialize, Serialize};

/// Possible convergence states for the optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConvergenceStatus {
    /// The algorithm is still running.
    Running,

    /// The algorithm has converged due to a small parameter change.
    ParameterConvergence,

    /// The algorithm has converged due to a small function value change.
    FunctionValueConvergence,

    /// The algorithm has converged due to a small gradient.
    GradientConvergence,

    /// The algorithm has terminated due to reaching the maximum number of iterations.
    MaxIterationsReached,

    /// The damping parameter grew past its maximum without reducing the cost.
    DampingExhausted,

    /// The algorithm has terminated due to a numerical error.
    NumericalError,
}

impl ConvergenceStatus {
    /// Returns true if the optimization has terminated (either converged or failed).
    pub fn is_terminated(&self) -> bool {
        !matches!(self, ConvergenceStatus::Running)
    }

    /// Returns true if the status belongs to the accepted success set.
    pub fn is_converged(&self) -> bool {
        matches!(
            self,
            ConvergenceStatus::ParameterConvergence
                | ConvergenceStatus::FunctionValueConvergence
                | ConvergenceStatus::GradientConvergence
        )
    }

    /// Returns a description of the convergence status.
    pub fn description(&self) -> String {
        match self {
            ConvergenceStatus::Running => "Optimization is still running".to_string(),
            ConvergenceStatus::ParameterConvergence => {
                "Converged: small parameter change".to_string()
            }
            ConvergenceStatus::FunctionValueConvergence => {
                "Converged: small function value change".to_string()
            }
            ConvergenceStatus::GradientConvergence => "Converged: small gradient".to_string(),
            ConvergenceStatus::MaxIterationsReached => {
                "Terminated: maximum iterations reached".to_string()
            }
            ConvergenceStatus::DampingExhausted => {
                "Terminated: damping reached maximum without reducing the cost".to_string()
            }
            ConvergenceStatus::NumericalError => "Terminated: numerical error".to_string(),
        }
    }
}

/// Criteria for determining when the optimizer has converged.
#[derive(Debug, Clone)]
pub struct ConvergenceCriteria {
    /// Tolerance for the relative step length.
    pub xtol: f64,

    /// Tolerance for relative reduction of the cost.
    pub ftol: f64,

    /// Tolerance for the scaled gradient.
    pub gtol: f64,
}

impl Default for ConvergenceCriteria {
    fn default() -> Self {
        Self::from(&LmConfig::default())
    }
}

impl From<&LmConfig> for ConvergenceCriteria {
    fn from(config: &LmConfig) -> Self {
        Self {
            xtol: config.xtol,
            ftol: config.ftol,
            gtol: config.gtol,
        }
    }
}

impl ConvergenceCriteria {
    /// Creates a new set of convergence criteria with the given tolerances.
    pub fn new(xtol: f64, ftol: f64, gtol: f64) -> Self {
        Self { xtol, ftol, gtol }
    }

    /// Gradient test on the cosine-scaled gradient norm.
    pub fn gradient_converged(&self, scaled_gradient: f64) -> bool {
        scaled_gradient <= self.gtol
    }

    /// Step-length test: `||step|| <= xtol * (||params|| + xtol)`.
    pub fn step_converged(&self, param_norm: f64, step_norm: f64) -> bool {
        step_norm <= self.xtol * (param_norm + self.xtol)
    }

    /// Cost test on the actual and predicted relative reductions.
    ///
    /// Both reductions are relative to the current cost, so an exact fit
    /// (zero cost) converges immediately.
    pub fn cost_converged(&self, actual_reduction: f64, predicted_reduction: f64) -> bool {
        actual_reduction.abs() <= self.ftol && predicted_reduction <= self.ftol
    }

    /// Combine the step and cost tests for a completed trial step.
    pub fn check(
        &self,
        param_norm: f64,
        step_norm: f64,
        actual_reduction: f64,
        predicted_reduction: f64,
    ) -> ConvergenceStatus {
        if self.cost_converged(actual_reduction, predicted_reduction) {
            return ConvergenceStatus::FunctionValueConvergence;
        }
        if self.step_converged(param_norm, step_norm) {
            return ConvergenceStatus::ParameterConvergence;
        }
        ConvergenceStatus::Running
    }
}

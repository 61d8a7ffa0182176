//! Configuration options for the Levenberg-Marquardt algorithm.

use serde::{Deserialize, Serialize};

/// Method for calculating the Jacobian matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DiffMethod {
    /// Always use forward finite differences
    FiniteDifference,

    /// Use the problem's own Jacobian (finite differences if it has none)
    #[default]
    Analytical,
}

/// Method for solving the damped normal equations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DecompositionMethod {
    /// Cholesky decomposition (fastest, requires a positive definite system)
    Cholesky,

    /// SVD (slowest, handles rank-deficient systems)
    Svd,

    /// Cholesky first, SVD if the system is not positive definite
    #[default]
    Auto,
}

/// Configuration options for the Levenberg-Marquardt algorithm.
///
/// The tolerances follow MINPACK conventions: `ftol` bounds the relative
/// reduction of the sum of squares, `xtol` the relative step length and
/// `gtol` the cosine between the residual vector and the Jacobian columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LmConfig {
    /// Maximum number of iterations. Default: 200
    pub max_iterations: usize,

    /// Relative tolerance for reduction of the sum of squares. Default: 1.49e-8
    pub ftol: f64,

    /// Relative tolerance for the step length. Default: 1.49e-8
    pub xtol: f64,

    /// Tolerance for the scaled gradient. Default: 1e-10
    pub gtol: f64,

    /// Initial value for the damping parameter. Default: 1e-3
    pub initial_lambda: f64,

    /// Factor by which to increase lambda. Default: 10.0
    pub lambda_up_factor: f64,

    /// Factor by which to decrease lambda. Default: 0.1
    pub lambda_down_factor: f64,

    /// Minimum value for lambda. Default: 1e-12
    pub min_lambda: f64,

    /// Maximum value for lambda. Default: 1e12
    pub max_lambda: f64,

    /// Method to use for calculating the Jacobian. Default: Analytical
    pub diff_method: DiffMethod,

    /// Method to use for solving the linear system. Default: Auto
    pub decomposition_method: DecompositionMethod,
}

impl Default for LmConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            ftol: 1.49e-8,
            xtol: 1.49e-8,
            gtol: 1e-10,
            initial_lambda: 1e-3,
            lambda_up_factor: 10.0,
            lambda_down_factor: 0.1,
            min_lambda: 1e-12,
            max_lambda: 1e12,
            diff_method: DiffMethod::default(),
            decomposition_method: DecompositionMethod::default(),
        }
    }
}

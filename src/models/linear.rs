//! Ordinary least-squares line fit.
//!
//! The fit is closed-form, so there is no convergence failure mode. The
//! reported statistics match the usual linear-regression conventions: Pearson
//! r², a two-sided p-value for the hypothesis that the slope is zero
//! (Student-t with `n - 2` degrees of freedom) and the standard errors of the
//! slope and intercept.

use super::{FitModel, FitOutcome, FitResult};
use crate::error::{PeakFitError, Result};
use crate::utils::special::student_t_two_sided;
use ndarray::{ArrayView1, AsArray};
use serde::Serialize;

/// Guards `1 - r²` against division by zero for perfect fits.
const TINY: f64 = 1.0e-20;

/// Result of a linear regression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFitResult {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub p_value: f64,

    /// Standard error of the slope
    pub std_err: f64,

    /// Standard error of the intercept
    pub intercept_std_err: f64,
}

impl LinearFitResult {
    /// Value of the fitted line at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// Signed Pearson correlation coefficient.
    pub fn r_value(&self) -> f64 {
        self.r_squared.sqrt().copysign(self.slope)
    }
}

/// Fit `y = slope * x + intercept` by ordinary least squares.
///
/// # Arguments
///
/// * `x` - Independent variable
/// * `y` - Dependent variable
///
/// # Returns
///
/// * `Result<LinearFitResult>` - Slope, intercept and regression statistics
///
/// # Errors
///
/// * `MismatchedLengths` if `x` and `y` differ in length
/// * `InsufficientData` with fewer than two samples
/// * `InvalidInput` if all `x` values are identical
pub fn fit_linear<'a, 'b, X, Y>(x: X, y: Y) -> Result<LinearFitResult>
where
    X: AsArray<'a, f64>,
    Y: AsArray<'b, f64>,
{
    let x: ArrayView1<f64> = x.into();
    let y: ArrayView1<f64> = y.into();
    PeakFitError::check_lengths(x.len(), y.len())?;
    PeakFitError::check_min_len(x.len(), 2)?;

    let n = x.len() as f64;
    let x_mean = x.sum() / n;
    let y_mean = y.sum() / n;

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    if sxx == 0.0 {
        return Err(PeakFitError::InvalidInput(
            "cannot fit a line when all x values are identical".to_string(),
        ));
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;
    let r = if syy == 0.0 {
        0.0
    } else {
        (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
    };

    let (p_value, std_err, intercept_std_err) = if x.len() == 2 {
        // Two points define the line exactly
        let p = if y[0] == y[1] { 1.0 } else { 0.0 };
        (p, 0.0, 0.0)
    } else {
        let df = n - 2.0;
        let t = r * (df / ((1.0 - r) * (1.0 + r) + TINY)).sqrt();
        let p = student_t_two_sided(t, df);
        let slope_se = ((1.0 - r * r) * syy / sxx / df).max(0.0).sqrt();
        let intercept_se = slope_se * (sxx / n + x_mean * x_mean).sqrt();
        (p, slope_se, intercept_se)
    };

    Ok(LinearFitResult {
        slope,
        intercept,
        r_squared: r * r,
        p_value,
        std_err,
        intercept_std_err,
    })
}

/// [`FitModel`] wrapper around [`fit_linear`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearModel;

impl FitModel for LinearModel {
    fn name(&self) -> &str {
        "linear"
    }

    fn fit(&self, x: ArrayView1<f64>, y: ArrayView1<f64>) -> FitOutcome<FitResult> {
        fit_linear(x, y).map(FitResult::Linear).into()
    }
}

//! Gaussian peak model.
//!
//! The Gaussian function is defined as:
//! f(x) = amplitude * exp(-(x - mean)² / (2 * sigma²)) + y_offset
//!
//! The Full Width at Half Maximum (FWHM) is related to sigma by:
//! FWHM = 2 * sqrt(2 * ln(2)) * sigma ≈ 2.3548 * sigma
//!
//! Fits are driven by [`LevenbergMarquardt`] with an analytic Jacobian.
//! Parameters the caller does not supply are estimated from the data.

use super::{FitModel, FitOutcome, FitResult};
use crate::error::{PeakFitError, Result};
use crate::lm::{ConvergenceStatus, LevenbergMarquardt};
use crate::problem::Problem;
use crate::utils::search::argmax;
use ndarray::{array, Array1, Array2, ArrayView1, AsArray};
use serde::{Deserialize, Serialize};

/// `2 * sqrt(2 * ln 2)`
pub const FWHM_FACTOR: f64 = 2.354_820_045_030_949_3;

/// Number of points in the resampled fit curve.
pub const CURVE_POINTS: usize = 2000;

/// Minimum number of samples for a Gaussian fit.
const MIN_SAMPLES: usize = 4;

/// Optional starting values for a Gaussian fit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GaussianGuess {
    pub amplitude: Option<f64>,
    pub mean: Option<f64>,
    pub sigma: Option<f64>,
    pub y_offset: Option<f64>,
}

impl GaussianGuess {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = Some(amplitude);
        self
    }

    pub fn with_mean(mut self, mean: f64) -> Self {
        self.mean = Some(mean);
        self
    }

    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = Some(sigma);
        self
    }

    pub fn with_y_offset(mut self, y_offset: f64) -> Self {
        self.y_offset = Some(y_offset);
        self
    }
}

/// Parameters of a Gaussian with a constant offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaussianParams {
    pub amplitude: f64,
    pub mean: f64,
    pub sigma: f64,
    pub y_offset: f64,
}

impl GaussianParams {
    pub fn eval(&self, x: f64) -> f64 {
        let arg = (x - self.mean) / self.sigma;
        self.amplitude * (-0.5 * arg * arg).exp() + self.y_offset
    }

    pub fn fwhm(&self) -> f64 {
        FWHM_FACTOR * self.sigma.abs()
    }

    /// Fill in whatever `guess` leaves open with estimates from the data.
    ///
    /// - `amplitude`: maximum of `y`
    /// - `mean`: `x` weighted by `max(y - mean(y), 0)`, or `x` at the maximum
    ///   if no sample lies above the mean
    /// - `y_offset`: `y` at the end of the `x` range farther from `mean`
    /// - `sigma`: square root of the `|y|`-weighted variance of `x` about `mean`
    pub fn guess(x: ArrayView1<f64>, y: ArrayView1<f64>, guess: &GaussianGuess) -> Result<Self> {
        PeakFitError::check_lengths(x.len(), y.len())?;
        PeakFitError::check_min_len(x.len(), 1)?;
        let peak = argmax(y).ok_or_else(|| {
            PeakFitError::InvalidInput("y contains no finite values".to_string())
        })?;

        let amplitude = guess.amplitude.unwrap_or(y[peak]);

        let mean = guess.mean.unwrap_or_else(|| {
            let y_mean = y.mean().unwrap_or(0.0);
            let (weighted, total) = x.iter().zip(y.iter()).fold((0.0, 0.0), |(wx, w), (&xi, &yi)| {
                let weight = (yi - y_mean).max(0.0);
                (wx + weight * xi, w + weight)
            });
            if total > 0.0 {
                weighted / total
            } else {
                x[peak]
            }
        });

        let first = 0;
        let last = x.len() - 1;
        let y_offset = guess.y_offset.unwrap_or_else(|| {
            if (x[first] - mean).abs() > (x[last] - mean).abs() {
                y[first]
            } else {
                y[last]
            }
        });

        let sigma = guess.sigma.unwrap_or_else(|| {
            let (weighted, total) = x.iter().zip(y.iter()).fold((0.0, 0.0), |(wv, w), (&xi, &yi)| {
                (wv + yi.abs() * (xi - mean).powi(2), w + yi.abs())
            });
            let sigma = (weighted / total).sqrt();
            if sigma.is_finite() && sigma > 0.0 {
                sigma
            } else {
                let range = (x[last] - x[first]).abs() / 4.0;
                if range > 0.0 {
                    range
                } else {
                    1.0
                }
            }
        });

        Ok(Self {
            amplitude,
            mean,
            sigma,
            y_offset,
        })
    }

    fn to_array(self) -> Array1<f64> {
        array![self.amplitude, self.mean, self.sigma, self.y_offset]
    }

    fn from_array(params: &Array1<f64>) -> Self {
        Self {
            amplitude: params[0],
            mean: params[1],
            sigma: params[2],
            y_offset: params[3],
        }
    }
}

/// Least-squares problem of a Gaussian over borrowed samples.
///
/// Parameters are ordered `[amplitude, mean, sigma, y_offset]`.
pub struct GaussianProblem<'a> {
    x: ArrayView1<'a, f64>,
    y: ArrayView1<'a, f64>,
}

impl<'a> GaussianProblem<'a> {
    pub fn new(x: ArrayView1<'a, f64>, y: ArrayView1<'a, f64>) -> Result<Self> {
        PeakFitError::check_lengths(x.len(), y.len())?;
        Ok(Self { x, y })
    }
}

impl<'a> Problem for GaussianProblem<'a> {
    fn eval(&self, params: &Array1<f64>) -> Result<Array1<f64>> {
        if params.len() != 4 {
            return Err(PeakFitError::DimensionMismatch(format!(
                "Expected 4 parameters, got {}",
                params.len()
            )));
        }
        let gaussian = GaussianParams::from_array(params);
        Ok(self
            .x
            .iter()
            .zip(self.y.iter())
            .map(|(&x, &y)| gaussian.eval(x) - y)
            .collect())
    }

    fn parameter_count(&self) -> usize {
        4
    }

    fn residual_count(&self) -> usize {
        self.x.len()
    }

    fn jacobian(&self, params: &Array1<f64>) -> Result<Array2<f64>> {
        let (amplitude, mean, sigma) = (params[0], params[1], params[2]);
        let mut jac = Array2::zeros((self.x.len(), 4));

        for (i, &x) in self.x.iter().enumerate() {
            let dx = x - mean;
            let e = (-0.5 * (dx / sigma).powi(2)).exp();
            jac[[i, 0]] = e;
            jac[[i, 1]] = amplitude * e * dx / sigma.powi(2);
            jac[[i, 2]] = amplitude * e * dx.powi(2) / sigma.powi(3);
            jac[[i, 3]] = 1.0;
        }

        Ok(jac)
    }

    fn has_custom_jacobian(&self) -> bool {
        true
    }
}

/// A converged Gaussian fit.
#[derive(Debug, Clone, Serialize)]
pub struct GaussianFitResult {
    pub amplitude: f64,
    pub mean: f64,

    /// Always reported as a positive width
    pub sigma: f64,
    pub y_offset: f64,

    /// Resampled `x` of the fitted curve
    pub curve_x: Array1<f64>,

    /// Fitted curve evaluated at `curve_x`
    pub curve_y: Array1<f64>,

    /// Sum of squared residuals at the solution
    pub cost: f64,
    pub r_squared: f64,
    pub iterations: usize,
    pub status: ConvergenceStatus,
}

impl GaussianFitResult {
    pub fn params(&self) -> GaussianParams {
        GaussianParams {
            amplitude: self.amplitude,
            mean: self.mean,
            sigma: self.sigma,
            y_offset: self.y_offset,
        }
    }

    pub fn fwhm(&self) -> f64 {
        FWHM_FACTOR * self.sigma.abs()
    }

    pub fn eval(&self, x: f64) -> f64 {
        self.params().eval(x)
    }
}

/// Fit a Gaussian with the default optimizer settings.
///
/// See [`fit_gaussian_with`].
pub fn fit_gaussian<'a, 'b, X, Y>(
    x: X,
    y: Y,
    guess: &GaussianGuess,
) -> FitOutcome<GaussianFitResult>
where
    X: AsArray<'a, f64>,
    Y: AsArray<'b, f64>,
{
    fit_gaussian_with(x, y, guess, &LevenbergMarquardt::new())
}

/// Fit `amplitude * exp(-(x - mean)² / (2 sigma²)) + y_offset` to the samples.
///
/// The fit only succeeds if the optimizer reports parameter, cost or gradient
/// convergence. Otherwise the outcome is a `ConvergenceFailure` carrying the
/// optimizer's message and last parameters.
///
/// # Arguments
///
/// * `x` - Sample positions
/// * `y` - Sample values
/// * `guess` - Starting values; open fields are estimated from the data
/// * `optimizer` - The optimizer and its configuration
///
/// # Returns
///
/// * `FitOutcome<GaussianFitResult>` - The fitted peak, or the failure reason
///
/// # Failures
///
/// * `MismatchedLengths` if `x` and `y` differ in length
/// * `InsufficientData` with fewer than four samples
/// * `ConvergenceFailure` if the optimizer does not converge
pub fn fit_gaussian_with<'a, 'b, X, Y>(
    x: X,
    y: Y,
    guess: &GaussianGuess,
    optimizer: &LevenbergMarquardt,
) -> FitOutcome<GaussianFitResult>
where
    X: AsArray<'a, f64>,
    Y: AsArray<'b, f64>,
{
    let x: ArrayView1<'a, f64> = x.into();
    let y: ArrayView1<'b, f64> = y.into();
    run_fit(x, y, guess, optimizer).into()
}

fn run_fit(
    x: ArrayView1<'_, f64>,
    y: ArrayView1<'_, f64>,
    guess: &GaussianGuess,
    optimizer: &LevenbergMarquardt,
) -> Result<GaussianFitResult> {
    PeakFitError::check_lengths(x.len(), y.len())?;
    PeakFitError::check_min_len(x.len(), MIN_SAMPLES)?;

    let initial = GaussianParams::guess(x, y, guess)?;
    log::debug!("gaussian fit: initial guess {:?}", initial);

    let problem = GaussianProblem::new(x.view(), y.view())?;
    let report = optimizer.minimize(&problem, initial.to_array())?;

    if !report.success {
        log::debug!("gaussian fit failed: {}", report.message);
        return Err(PeakFitError::ConvergenceFailure {
            message: report.message,
            params: report.params.to_vec(),
        });
    }

    let mut fitted = GaussianParams::from_array(&report.params);
    fitted.sigma = fitted.sigma.abs();

    let y_mean = y.mean().unwrap_or(0.0);
    let ss_tot: f64 = y.iter().map(|v| (v - y_mean).powi(2)).sum();
    let r_squared = if ss_tot > 0.0 {
        1.0 - report.cost / ss_tot
    } else if report.cost == 0.0 {
        1.0
    } else {
        0.0
    };

    let curve_x = Array1::linspace(x[0], x[x.len() - 1], CURVE_POINTS);
    let curve_y = curve_x.mapv(|v| fitted.eval(v));

    Ok(GaussianFitResult {
        amplitude: fitted.amplitude,
        mean: fitted.mean,
        sigma: fitted.sigma,
        y_offset: fitted.y_offset,
        curve_x,
        curve_y,
        cost: report.cost,
        r_squared,
        iterations: report.iterations,
        status: report.status,
    })
}

/// [`FitModel`] wrapper around [`fit_gaussian_with`].
#[derive(Debug, Clone, Default)]
pub struct GaussianModel {
    guess: GaussianGuess,
    optimizer: LevenbergMarquardt,
}

impl GaussianModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_guess(mut self, guess: GaussianGuess) -> Self {
        self.guess = guess;
        self
    }

    pub fn with_optimizer(mut self, optimizer: LevenbergMarquardt) -> Self {
        self.optimizer = optimizer;
        self
    }
}

impl FitModel for GaussianModel {
    fn name(&self) -> &str {
        "gaussian"
    }

    fn fit(&self, x: ArrayView1<f64>, y: ArrayView1<f64>) -> FitOutcome<FitResult> {
        fit_gaussian_with(x, y, &self.guess, &self.optimizer).map(FitResult::Gaussian)
    }
}

//! Polynomial background model.
//!
//! Backgrounds are fitted by linear least squares on a Vandermonde matrix.
//! The abscissa is mapped to `t = (x - shift) / scale` with `t` in `[-1, 1]`
//! over the fitted range; without that, cubic fits on wavenumbers in the
//! thousands are hopelessly ill-conditioned.

use crate::background::FittingPointSet;
use crate::error::{PeakFitError, Result};
use crate::utils::matrix_convert::{nalgebra_vec_to_ndarray, ndarray_vec_to_nalgebra};
use nalgebra::DMatrix;
use ndarray::{Array1, ArrayView1, AsArray};
use serde::{Deserialize, Serialize};

/// A fitted polynomial background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundModel {
    /// Coefficients in ascending powers of the normalized abscissa
    coefficients: Array1<f64>,
    shift: f64,
    scale: f64,
}

impl BackgroundModel {
    /// Fit a polynomial of the given degree.
    ///
    /// # Errors
    ///
    /// * `MismatchedLengths` if `x` and `y` differ in length
    /// * `InsufficientData` with fewer than `degree + 1` samples
    /// * `SingularMatrix` if the least-squares system cannot be solved
    pub fn fit<'a, 'b, X, Y>(x: X, y: Y, degree: usize) -> Result<Self>
    where
        X: AsArray<'a, f64>,
        Y: AsArray<'b, f64>,
    {
        let x: ArrayView1<f64> = x.into();
        let y: ArrayView1<f64> = y.into();
        PeakFitError::check_lengths(x.len(), y.len())?;
        PeakFitError::check_min_len(x.len(), degree + 1)?;

        let x_min = x.iter().copied().fold(f64::INFINITY, f64::min);
        let x_max = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let shift = (x_max + x_min) / 2.0;
        let half_range = (x_max - x_min) / 2.0;
        let scale = if half_range > 0.0 { half_range } else { 1.0 };

        let design = DMatrix::from_fn(x.len(), degree + 1, |i, j| {
            ((x[i] - shift) / scale).powi(j as i32)
        });
        let rhs = ndarray_vec_to_nalgebra(&y.to_owned())?;
        let solution = design
            .svd(true, true)
            .solve(&rhs, 1e-12)
            .map_err(|_| PeakFitError::SingularMatrix)?;

        let coefficients = nalgebra_vec_to_ndarray(&solution)?;
        if !coefficients.iter().all(|c| c.is_finite()) {
            return Err(PeakFitError::SingularMatrix);
        }

        Ok(Self {
            coefficients,
            shift,
            scale,
        })
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// Coefficients in ascending powers of `(x - shift) / scale`.
    pub fn coefficients(&self) -> &Array1<f64> {
        &self.coefficients
    }

    /// The `(shift, scale)` normalization of the abscissa.
    pub fn normalization(&self) -> (f64, f64) {
        (self.shift, self.scale)
    }

    /// Evaluate the background at `x`.
    pub fn eval(&self, x: f64) -> f64 {
        let t = (x - self.shift) / self.scale;
        self.coefficients.iter().rev().fold(0.0, |acc, c| acc * t + c)
    }

    /// Evaluate the background at every element of `x`.
    pub fn eval_array<'a, X: AsArray<'a, f64>>(&self, x: X) -> Array1<f64> {
        let x: ArrayView1<f64> = x.into();
        x.mapv(|v| self.eval(v))
    }
}

/// Fit a polynomial background through a set of fitting points.
pub fn fit_background(points: &FittingPointSet, degree: usize) -> Result<BackgroundModel> {
    let model = BackgroundModel::fit(&points.x, &points.y, degree)?;
    log::debug!(
        "fitted degree {} background through {} points",
        degree,
        points.len()
    );
    Ok(model)
}

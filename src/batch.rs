//! Parallel fitting of many independent series.
//!
//! Each series is fitted on the rayon thread pool. Fits share nothing, so the
//! outcomes are identical to fitting the series one by one, and they are
//! returned in input order.

use ndarray::Array1;
use rayon::prelude::*;

use crate::lm::LevenbergMarquardt;
use crate::models::{
    fit_gaussian_with, FitModel, FitOutcome, FitResult, GaussianFitResult, GaussianGuess,
};

/// A pair of equal-length `x` and `y` arrays.
pub type Series = (Array1<f64>, Array1<f64>);

/// Fit `model` to every series in parallel.
pub fn fit_batch<M: FitModel + ?Sized>(model: &M, series: &[Series]) -> Vec<FitOutcome<FitResult>> {
    log::debug!("fitting {} series with model '{}'", series.len(), model.name());
    series
        .par_iter()
        .map(|(x, y)| model.fit(x.view(), y.view()))
        .collect()
}

/// Fit a Gaussian to every series in parallel with a shared guess.
pub fn fit_gaussian_batch(
    series: &[Series],
    guess: &GaussianGuess,
    optimizer: &LevenbergMarquardt,
) -> Vec<FitOutcome<GaussianFitResult>> {
    log::debug!("fitting gaussians to {} series", series.len());
    series
        .par_iter()
        .map(|(x, y)| fit_gaussian_with(x, y, guess, optimizer))
        .collect()
}

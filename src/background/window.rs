//! Iterative selection of background fitting points around the peak.

use super::global::global_background_after;
use super::{locate_peak, PeakLocation, WindowConfig};
use crate::error::{PeakFitError, Result};
use crate::spectrum::{CropWindow, Spectrum};
use crate::utils::search::{argmin, argmin_last, mean_spacing};
use ndarray::{s, Array1};
use serde::Serialize;

/// Background fitting points selected on both sides of the peak.
///
/// `x` and `y` hold the samples `[start, left_min)` followed by
/// `[right_min, end)` of the final crop window, with the raw `y` values.
#[derive(Debug, Clone, Serialize)]
pub struct FittingPointSet {
    pub x: Array1<f64>,
    pub y: Array1<f64>,

    /// Number of points left of the peak's left minimum
    pub left_count: usize,

    /// Number of points from the peak's right minimum to the window end
    pub right_count: usize,

    /// Crop window the search converged on
    pub window: CropWindow,

    /// The peak the points bracket
    pub peak: PeakLocation,

    /// Iterations used by the successful search phase
    pub iterations: usize,

    /// Whether the global background fallback was needed
    pub used_global_background: bool,
}

impl FittingPointSet {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Find the background fitting points flanking the peak.
///
/// The crop bounds are moved until `target_count ± tolerance` points lie
/// outside each of the peak's bracketing minima. Ties on a flat baseline
/// resolve to the minimum closest to the peak on both sides. If the lower
/// bound cannot be found and no background was given, the search is repeated
/// once with the global background anchored on the same peak (see
/// [`global_background_after`]).
///
/// # Arguments
///
/// * `spectrum` - The full spectrum
/// * `config` - Crop window, target count and limits of the search
/// * `background` - Optional background subtracted from `y` before the left
///   minimum is located
///
/// # Returns
///
/// * The fitting points on both sides of the peak, with the converged window
///
/// # Errors
///
/// * `NoLowBoundFound` if the left minimum lies below `min_low_crop` or the
///   left side does not converge within `max_iterations`
/// * `NoHighBoundFound` if the right minimum lies above `max_high_crop` or
///   the right side does not converge within `max_iterations`
/// * `EmptyWindow` if the crop window selects no samples
pub fn find_background_fitting_points(
    spectrum: &Spectrum,
    config: &WindowConfig,
    background: Option<&dyn Fn(f64) -> f64>,
) -> Result<FittingPointSet> {
    config.validate()?;
    let peak = locate_peak(spectrum, config)?;
    log::debug!("background window search: peak at x = {} (index {})", peak.x, peak.index);

    match search(spectrum, config, &peak, background) {
        Err(PeakFitError::NoLowBoundFound(reason)) if background.is_none() => {
            log::warn!(
                "no lower background bound ({}); retrying with global background estimate",
                reason
            );
            let global = global_background_after(spectrum, peak.index);
            let subtract = |x: f64| global.eval(x);

            match search(spectrum, config, &peak, Some(&subtract)) {
                Ok(mut points) => {
                    points.used_global_background = true;
                    Ok(points)
                }
                Err(PeakFitError::NoLowBoundFound(reason)) => Err(PeakFitError::NoLowBoundFound(
                    format!("{} (after global background fallback)", reason),
                )),
                Err(e) => Err(e),
            }
        }
        other => other,
    }
}

/// One search phase with a fixed background function.
fn search(
    spectrum: &Spectrum,
    config: &WindowConfig,
    peak: &PeakLocation,
    background: Option<&dyn Fn(f64) -> f64>,
) -> Result<FittingPointSet> {
    let target = config.target_count as i64;
    let tolerance = config.tolerance as i64;
    let fallback_spacing = mean_spacing(spectrum.x().view()).unwrap_or(1.0);

    let mut window = config.crop();
    let mut left_converged = false;

    for iteration in 1..=config.max_iterations {
        let range = spectrum.window_range(window)?;
        if peak.index < range.start {
            return Err(PeakFitError::NoLowBoundFound(format!(
                "lower crop bound {} moved past the peak at {}",
                window.low, peak.x
            )));
        }
        if peak.index >= range.end {
            return Err(PeakFitError::NoHighBoundFound(format!(
                "upper crop bound {} moved past the peak at {}",
                window.high, peak.x
            )));
        }

        let (xs, ys) = spectrum.slice(range.clone());
        let local_peak = peak.index - range.start;

        let left_min = match background {
            Some(bg) => {
                let corrected: Array1<f64> = xs
                    .slice(s![..local_peak])
                    .iter()
                    .zip(ys.slice(s![..local_peak]).iter())
                    .map(|(&x, &y)| y - bg(x))
                    .collect();
                argmin_last(corrected.view())
            }
            None => argmin_last(ys.slice(s![..local_peak])),
        }
        .unwrap_or(0);
        let right_min = local_peak + argmin(ys.slice(s![local_peak..])).unwrap_or(0);

        if xs[left_min] < config.min_low_crop {
            return Err(PeakFitError::NoLowBoundFound(format!(
                "left minimum at {} lies below {}",
                xs[left_min], config.min_low_crop
            )));
        }
        if xs[right_min] > config.max_high_crop {
            return Err(PeakFitError::NoHighBoundFound(format!(
                "right minimum at {} lies above {}",
                xs[right_min], config.max_high_crop
            )));
        }

        let left_count = left_min;
        let right_count = range.len() - right_min;
        let left_diff = left_count as i64 - target;
        let right_diff = right_count as i64 - target;
        left_converged = left_diff.abs() <= tolerance;
        let right_converged = right_diff.abs() <= tolerance;

        log::trace!(
            "window ({}, {}]: left {} points, right {} points",
            window.low,
            window.high,
            left_count,
            right_count
        );

        if left_converged && right_converged {
            log::debug!(
                "background window converged after {} iterations: ({}, {}]",
                iteration,
                window.low,
                window.high
            );

            let x = xs
                .slice(s![..left_min])
                .iter()
                .chain(xs.slice(s![right_min..]).iter())
                .copied()
                .collect();
            let y = ys
                .slice(s![..left_min])
                .iter()
                .chain(ys.slice(s![right_min..]).iter())
                .copied()
                .collect();

            return Ok(FittingPointSet {
                x,
                y,
                left_count,
                right_count,
                window,
                peak: peak.clone(),
                iterations: iteration,
                used_global_background: false,
            });
        }

        // Convert point differences to x units
        let spacing = mean_spacing(xs).unwrap_or(fallback_spacing);
        if !left_converged {
            window.low += left_diff as f64 * spacing;
        }
        if !right_converged {
            window.high -= right_diff as f64 * spacing;
        }
    }

    let reason = format!("no convergence within {} iterations", config.max_iterations);
    if left_converged {
        Err(PeakFitError::NoHighBoundFound(reason))
    } else {
        Err(PeakFitError::NoLowBoundFound(reason))
    }
}

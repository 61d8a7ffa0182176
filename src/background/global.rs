//! Global background estimate used when the window search cannot find a
//! lower bound on the raw signal.

use crate::spectrum::Spectrum;
use crate::utils::search::{argmax, first_local_minimum};
use ndarray::s;
use serde::Serialize;

/// A straight-line background, or zero when no decreasing line exists.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum GlobalBackground {
    Linear { slope: f64, intercept: f64 },
    Zero,
}

impl GlobalBackground {
    pub fn eval(&self, x: f64) -> f64 {
        match *self {
            GlobalBackground::Linear { slope, intercept } => slope * x + intercept,
            GlobalBackground::Zero => 0.0,
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, GlobalBackground::Zero)
    }
}

/// Estimate the background as the line through the first local minimum after
/// the peak and the last sample of the spectrum.
///
/// The peak is the maximum of `y` over `x > peak_floor` across the whole
/// spectrum. See [`global_background_after`] for the line itself.
pub fn estimate_global_background(spectrum: &Spectrum, peak_floor: Option<f64>) -> GlobalBackground {
    let x = spectrum.x();
    let last = spectrum.len() - 1;

    let offset = peak_floor
        .map(|floor| x.iter().take_while(|&&v| v <= floor).count())
        .filter(|&offset| offset <= last)
        .unwrap_or(0);

    match argmax(spectrum.y().slice(s![offset..])) {
        Some(i) => global_background_after(spectrum, offset + i),
        None => GlobalBackground::Zero,
    }
}

/// Straight-line background anchored on a known peak.
///
/// # Arguments
///
/// * `spectrum` - The full spectrum
/// * `peak` - Index of the peak in the full spectrum
///
/// # Returns
///
/// * The line through the first local minimum after `peak` and the last
///   sample, or [`GlobalBackground::Zero`] if no local minimum follows the
///   peak or the line would not be decreasing
pub fn global_background_after(spectrum: &Spectrum, peak: usize) -> GlobalBackground {
    let x = spectrum.x();
    let y = spectrum.y();
    let last = spectrum.len() - 1;

    let minimum = match first_local_minimum(y.view(), peak) {
        Some(m) if m < last && x[m] < x[last] => m,
        _ => {
            log::debug!("degenerate global background: no local minimum after x = {}", x[peak]);
            return GlobalBackground::Zero;
        }
    };

    let slope = (y[last] - y[minimum]) / (x[last] - x[minimum]);
    if slope >= 0.0 || !slope.is_finite() {
        log::debug!("degenerate global background: slope {} is not decreasing", slope);
        return GlobalBackground::Zero;
    }

    GlobalBackground::Linear {
        slope,
        intercept: y[minimum] - slope * x[minimum],
    }
}

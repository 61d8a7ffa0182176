//! Peak-background separation.
//!
//! This module locates the target peak of a spectrum and selects the samples
//! on either side of it that are used to fit a background model:
//!
//! - [`locate_peak`] finds the peak inside the crop window, above the search floor
//! - [`find_background_fitting_points`] runs the iterative window search
//! - [`estimate_global_background`] and [`global_background_after`] provide the
//!   fallback baseline estimate
//! - [`compute_peak_height`] measures the peak above a fitted background
//! - [`classify_spectrum`] labels a spectrum as well behaved or low signal
//!
//! The window search and the peak-height calculation share [`locate_peak`], so
//! for the same [`WindowConfig`] they always agree on where the peak is.

mod classify;
mod global;
mod height;
mod window;

pub use classify::{classify_spectrum, SpectrumClass};
pub use global::{estimate_global_background, global_background_after, GlobalBackground};
pub use height::{compute_peak_height, PeakHeight};
pub use window::{find_background_fitting_points, FittingPointSet};

use crate::error::{PeakFitError, Result};
use crate::spectrum::{CropWindow, Spectrum};
use crate::utils::search::argmax;
use ndarray::s;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Parameters of the background window search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Initial lower crop bound. Default: 2200
    pub low_crop: f64,

    /// Initial upper crop bound. Default: 4000
    pub high_crop: f64,

    /// Peak search is restricted to `x > peak_floor`. Default: Some(3000)
    pub peak_floor: Option<f64>,

    /// Desired number of background points on each side. Default: 200
    pub target_count: usize,

    /// Accepted deviation from `target_count`. Default: 30
    pub tolerance: usize,

    /// The left minimum may not lie below this x. Default: 2000
    pub min_low_crop: f64,

    /// The right minimum may not lie above this x. Default: 5000
    pub max_high_crop: f64,

    /// Iteration cap for each search phase. Default: 100
    pub max_iterations: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            low_crop: 2200.0,
            high_crop: 4000.0,
            peak_floor: Some(3000.0),
            target_count: 200,
            tolerance: 30,
            min_low_crop: 2000.0,
            max_high_crop: 5000.0,
            max_iterations: 100,
        }
    }
}

impl WindowConfig {
    /// Load a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: WindowConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the initial crop bounds.
    pub fn with_crop(mut self, low: f64, high: f64) -> Self {
        self.low_crop = low;
        self.high_crop = high;
        self
    }

    /// Set the peak search floor (`None` searches the whole crop window).
    pub fn with_peak_floor(mut self, floor: Option<f64>) -> Self {
        self.peak_floor = floor;
        self
    }

    /// Set the target point count and tolerance.
    pub fn with_target(mut self, target_count: usize, tolerance: usize) -> Self {
        self.target_count = target_count;
        self.tolerance = tolerance;
        self
    }

    /// Set the x limits for the bracketing minima.
    pub fn with_limits(mut self, min_low_crop: f64, max_high_crop: f64) -> Self {
        self.min_low_crop = min_low_crop;
        self.max_high_crop = max_high_crop;
        self
    }

    /// Set the iteration cap per search phase.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// The initial crop window.
    pub fn crop(&self) -> CropWindow {
        CropWindow::new(self.low_crop, self.high_crop)
    }

    /// Check the configuration for internal consistency.
    pub fn validate(&self) -> Result<()> {
        if self.low_crop >= self.high_crop || self.low_crop.is_nan() || self.high_crop.is_nan() {
            return Err(PeakFitError::InvalidInput(format!(
                "low_crop ({}) must be below high_crop ({})",
                self.low_crop, self.high_crop
            )));
        }
        if self.target_count == 0 {
            return Err(PeakFitError::InvalidInput(
                "target_count must be positive".to_string(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(PeakFitError::InvalidInput(
                "max_iterations must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Location of the target peak.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakLocation {
    /// Index into the full spectrum
    pub index: usize,

    /// x at the peak
    pub x: f64,

    /// y at the peak
    pub y: f64,

    /// Index range of the crop window the peak was found in
    pub window: Range<usize>,
}

/// Locate the peak: the maximum of `y` over the crop window, restricted to
/// `x > peak_floor`.
pub fn locate_peak(spectrum: &Spectrum, config: &WindowConfig) -> Result<PeakLocation> {
    let window = spectrum.window_range(config.crop())?;
    let (xs, ys) = spectrum.slice(window.clone());

    let offset = match config.peak_floor {
        Some(floor) => xs.iter().take_while(|&&v| v <= floor).count(),
        None => 0,
    };
    if offset >= xs.len() {
        return Err(PeakFitError::EmptyWindow {
            low: config.peak_floor.unwrap_or(config.low_crop).max(config.low_crop),
            high: config.high_crop,
        });
    }

    let local = argmax(ys.slice(s![offset..])).ok_or_else(|| {
        PeakFitError::InvalidInput("no finite samples in the peak search range".to_string())
    })?;
    let index = window.start + offset + local;

    Ok(PeakLocation {
        index,
        x: spectrum.x()[index],
        y: spectrum.y()[index],
        window,
    })
}

//! # peakfit-rs
//!
//! `peakfit-rs` separates a target absorption peak from its background in
//! FTIR, UV-VIS and DOAS spectra, and fits peak and background models.
//!
//! The library provides:
//! - An iterative search for background fitting points on both sides of a peak,
//!   with a global straight-line background as fallback
//! - Polynomial background fits and peak height above the background
//! - A Gaussian peak fit driven by a Levenberg-Marquardt optimizer
//! - Ordinary least-squares line fits with regression statistics
//! - A heuristic well-behaved / low-signal spectrum classifier
//!
//! ## Basic Usage
//!
//! ```no_run
//! use peakfit_rs::{
//!     compute_peak_height, find_background_fitting_points, fit_background, Spectrum,
//!     WindowConfig,
//! };
//!
//! # fn main() -> peakfit_rs::Result<()> {
//! # let (x, y) = (ndarray::Array1::zeros(0), ndarray::Array1::zeros(0));
//! let spectrum = Spectrum::new(x, y)?;
//! let config = WindowConfig::default();
//!
//! let points = find_background_fitting_points(&spectrum, &config, None)?;
//! let background = fit_background(&points, 3)?;
//! let height = compute_peak_height(&spectrum, &background, &config)?;
//! println!("peak at {} is {} above background", height.x, height.height);
//! # Ok(())
//! # }
//! ```

pub mod background;
pub mod error;
pub mod lm;
pub mod models;
pub mod problem;
pub mod spectrum;
pub mod utils;

#[cfg(feature = "parallel")]
pub mod batch;

// Re-exports for convenience
pub use background::{
    classify_spectrum, compute_peak_height, estimate_global_background,
    find_background_fitting_points, global_background_after, locate_peak, FittingPointSet,
    GlobalBackground, PeakHeight, PeakLocation, SpectrumClass, WindowConfig,
};
pub use error::{PeakFitError, Result};
pub use lm::{LevenbergMarquardt, LmConfig};
pub use models::{
    fit_background, fit_gaussian, fit_gaussian_with, fit_linear, BackgroundModel, FitModel,
    FitOutcome, FitResult, GaussianFitResult, GaussianGuess, LinearFitResult, ModelRegistry,
};
pub use problem::Problem;
pub use spectrum::{CropWindow, Spectrum};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Peak height above a fitted background.

use super::{locate_peak, WindowConfig};
use crate::error::Result;
use crate::models::polynomial::BackgroundModel;
use crate::spectrum::Spectrum;
use serde::Serialize;

/// Height of the peak above the background model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeakHeight {
    /// Index of the peak in the full spectrum
    pub index: usize,

    /// x at the peak
    pub x: f64,

    /// `y[peak] - background(x[peak])`
    pub height: f64,
}

/// Compute the peak height above `background`.
///
/// The peak is located with the same crop and search floor as
/// [`find_background_fitting_points`](super::find_background_fitting_points),
/// so both see the same peak for the same `config`.
///
/// # Arguments
///
/// * `spectrum` - The full spectrum
/// * `background` - Fitted background model
/// * `config` - Crop window and search floor used to locate the peak
///
/// # Returns
///
/// * `Result<PeakHeight>` - Peak position and height above the background
pub fn compute_peak_height(
    spectrum: &Spectrum,
    background: &BackgroundModel,
    config: &WindowConfig,
) -> Result<PeakHeight> {
    let peak = locate_peak(spectrum, config)?;
    let height = peak.y - background.eval(peak.x);
    log::debug!("peak height at x = {}: {}", peak.x, height);

    Ok(PeakHeight {
        index: peak.index,
        x: peak.x,
        height,
    })
}

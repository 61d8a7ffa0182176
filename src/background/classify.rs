//! Heuristic spectrum classification.

use super::{locate_peak, WindowConfig};
use crate::error::{PeakFitError, Result};
use crate::models::linear::fit_linear;
use crate::spectrum::Spectrum;
use crate::utils::search::argmin;
use ndarray::s;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Label assigned by [`classify_spectrum`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpectrumClass {
    WellBehaved,
    LowSignal,
}

impl SpectrumClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpectrumClass::WellBehaved => "well_behaved",
            SpectrumClass::LowSignal => "low_signal",
        }
    }
}

impl fmt::Display for SpectrumClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label a spectrum as well behaved or low signal.
///
/// A line is fitted through the samples from the peak's right minimum to the
/// end of the spectrum and extrapolated to the global minimum before the
/// peak. If the line passes below the measured minimum the spectrum is well
/// behaved, otherwise the target signal is considered low. This is a
/// heuristic; occasional misclassification is expected.
pub fn classify_spectrum(spectrum: &Spectrum, config: &WindowConfig) -> Result<SpectrumClass> {
    let peak = locate_peak(spectrum, config)?;
    let x = spectrum.x();
    let y = spectrum.y();

    let global_min = argmin(y.slice(s![..peak.index])).ok_or_else(|| {
        PeakFitError::InvalidInput("no samples before the peak to classify against".to_string())
    })?;
    let right_min = peak.index + argmin(y.slice(s![peak.index..peak.window.end])).unwrap_or(0);

    let tail = fit_linear(x.slice(s![right_min..]), y.slice(s![right_min..]))?;

    let predicted = tail.predict(x[global_min]);
    let class = if predicted < y[global_min] {
        SpectrumClass::WellBehaved
    } else {
        SpectrumClass::LowSignal
    };

    log::debug!(
        "classified as {}: tail line gives {} at x = {}, measured {}",
        class,
        predicted,
        x[global_min],
        y[global_min]
    );
    Ok(class)
}

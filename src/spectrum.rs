//! Spectrum and crop window types.
//!
//! A [`Spectrum`] owns its own copy of the sample arrays, so nothing the crate
//! does can reach back into caller memory. A [`CropWindow`] restricts a
//! spectrum to the half-open range `(low, high]`.

use crate::error::{PeakFitError, Result};
use ndarray::{s, Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A sampled spectrum with increasing `x`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spectrum {
    x: Array1<f64>,
    y: Array1<f64>,
}

impl Spectrum {
    /// Build a spectrum, rejecting mismatched lengths, empty input and
    /// decreasing `x`.
    pub fn new(x: Array1<f64>, y: Array1<f64>) -> Result<Self> {
        PeakFitError::check_lengths(x.len(), y.len())?;
        PeakFitError::check_min_len(x.len(), 1)?;

        if x.windows(2).into_iter().any(|w| w[1] < w[0]) {
            return Err(PeakFitError::InvalidInput(
                "x values must be monotonically increasing".to_string(),
            ));
        }

        Ok(Self { x, y })
    }

    /// Build a spectrum by copying caller-owned slices.
    pub fn from_slices(x: &[f64], y: &[f64]) -> Result<Self> {
        Self::new(Array1::from_vec(x.to_vec()), Array1::from_vec(y.to_vec()))
    }

    pub fn x(&self) -> &Array1<f64> {
        &self.x
    }

    pub fn y(&self) -> &Array1<f64> {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Index range of the samples selected by `window`.
    ///
    /// Since `x` is increasing the mask `x > low && x <= high` is always a
    /// contiguous run of indices.
    pub fn window_range(&self, window: CropWindow) -> Result<Range<usize>> {
        let start = self.x.iter().take_while(|&&v| v <= window.low).count();
        let end = self.x.iter().take_while(|&&v| v <= window.high).count();

        if start >= end {
            return Err(PeakFitError::EmptyWindow {
                low: window.low,
                high: window.high,
            });
        }
        Ok(start..end)
    }

    /// Views of `x` and `y` restricted to an index range.
    pub fn slice(&self, range: Range<usize>) -> (ArrayView1<'_, f64>, ArrayView1<'_, f64>) {
        (
            self.x.slice(s![range.start..range.end]),
            self.y.slice(s![range.start..range.end]),
        )
    }
}

/// Half-open x-range `(low, high]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropWindow {
    pub low: f64,
    pub high: f64,
}

impl CropWindow {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Whether `x` falls inside the window.
    pub fn contains(&self, x: f64) -> bool {
        x > self.low && x <= self.high
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_new_validates_input() {
        let err = Spectrum::new(array![1.0, 2.0], array![1.0]).unwrap_err();
        assert!(matches!(
            err,
            PeakFitError::MismatchedLengths { x_len: 2, y_len: 1 }
        ));

        let err = Spectrum::new(Array1::zeros(0), Array1::zeros(0)).unwrap_err();
        assert!(matches!(err, PeakFitError::InsufficientData { .. }));

        let err = Spectrum::new(array![2.0, 1.0], array![0.0, 0.0]).unwrap_err();
        assert!(matches!(err, PeakFitError::InvalidInput(_)));
    }

    #[test]
    fn test_from_slices_copies() {
        let x = vec![1.0, 2.0, 3.0];
        let y = vec![4.0, 5.0, 6.0];
        let spectrum = Spectrum::from_slices(&x, &y).unwrap();
        assert_eq!(spectrum.len(), 3);
        assert_eq!(spectrum.y()[2], 6.0);
        assert_eq!(y, vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_window_range_is_half_open() {
        let x = Array1::linspace(0.0, 10.0, 11);
        let spectrum = Spectrum::new(x.clone(), x).unwrap();

        // (2, 5] keeps 3, 4, 5
        let range = spectrum.window_range(CropWindow::new(2.0, 5.0)).unwrap();
        assert_eq!(range, 3..6);

        let (xs, _) = spectrum.slice(range);
        assert_eq!(xs.to_vec(), vec![3.0, 4.0, 5.0]);

        assert!(CropWindow::new(2.0, 5.0).contains(5.0));
        assert!(!CropWindow::new(2.0, 5.0).contains(2.0));
    }

    #[test]
    fn test_empty_window() {
        let x = Array1::linspace(0.0, 10.0, 11);
        let spectrum = Spectrum::new(x.clone(), x).unwrap();

        let err = spectrum.window_range(CropWindow::new(20.0, 30.0)).unwrap_err();
        assert!(matches!(err, PeakFitError::EmptyWindow { .. }));

        // Between two samples
        let err = spectrum.window_range(CropWindow::new(3.2, 3.8)).unwrap_err();
        assert!(matches!(err, PeakFitError::EmptyWindow { .. }));
    }
}

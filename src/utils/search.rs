//! Array search helpers used by the peak and background locators.
//!
//! All functions take array views so callers can search sub-ranges with
//! `slice(s![..])` without copying. Indices returned are relative to the view.

use ndarray::{Array1, ArrayView1};

/// Index of the first maximum value, ignoring NaN. `None` for an empty view.
pub fn argmax(values: ArrayView1<f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Index of the first minimum value, ignoring NaN. `None` for an empty view.
pub fn argmin(values: ArrayView1<f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v >= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Index of the last minimum value, ignoring NaN. `None` for an empty view.
pub fn argmin_last(values: ArrayView1<f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v > b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Sample-index gradient: central differences in the interior and one-sided
/// differences at both ends.
pub fn gradient(values: ArrayView1<f64>) -> Array1<f64> {
    let n = values.len();
    let mut grad = Array1::zeros(n);
    if n < 2 {
        return grad;
    }

    grad[0] = values[1] - values[0];
    grad[n - 1] = values[n - 1] - values[n - 2];
    for i in 1..n - 1 {
        grad[i] = (values[i + 1] - values[i - 1]) / 2.0;
    }

    grad
}

/// First local minimum strictly after `start`.
///
/// Scans the gradient from `start + 1` for the first sign change from
/// negative to non-negative and returns the lower of the two samples at the
/// change. Returns `None` if the signal never descends and turns back up.
pub fn first_local_minimum(values: ArrayView1<f64>, start: usize) -> Option<usize> {
    let grad = gradient(values);
    let mut descending = false;

    for i in (start + 1)..grad.len() {
        if grad[i] < 0.0 {
            descending = true;
        } else if descending {
            return Some(if values[i - 1] < values[i] { i - 1 } else { i });
        }
    }

    None
}

/// Mean spacing between consecutive samples, or `None` with fewer than two.
pub fn mean_spacing(x: ArrayView1<f64>) -> Option<f64> {
    let n = x.len();
    if n < 2 {
        return None;
    }
    Some((x[n - 1] - x[0]) / (n - 1) as f64)
}

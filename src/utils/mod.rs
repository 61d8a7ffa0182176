//! Utility functions and helpers for the peakfit-rs library.

pub mod finite_difference;
pub mod matrix_convert;
pub mod search;
pub mod special;

// Re-export commonly used utilities
pub use matrix_convert::{nalgebra_vec_to_ndarray, ndarray_to_nalgebra, ndarray_vec_to_nalgebra};
pub use search::{argmax, argmin, argmin_last, first_local_minimum, gradient, mean_spacing};

//! Integration tests for the peakfit-rs library
//!
//! These tests drive the public API end to end rather than individual
//! components.

// Background window search, global background, height and classification
pub mod background;

// Gaussian peak fits
pub mod gaussian;

// Linear regression and polynomial backgrounds
pub mod linear;

// Model registry and batch fitting
pub mod registry;

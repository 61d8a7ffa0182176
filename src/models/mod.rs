//! Curve-fitting models.
//!
//! This module provides the fits used on spectra: a Gaussian peak with a
//! constant offset, a straight line and a polynomial background. The
//! Gaussian and linear fits are also exposed through the [`FitModel`] trait so
//! callers can pick a model by name from a [`ModelRegistry`].

use crate::error::{PeakFitError, Result};
use ndarray::ArrayView1;
use serde::Serialize;
use std::collections::BTreeMap;

pub mod linear;
pub mod peak;
pub mod polynomial;

// Re-export the models
pub use linear::{fit_linear, LinearFitResult, LinearModel};
pub use peak::{
    fit_gaussian, fit_gaussian_with, GaussianFitResult, GaussianGuess, GaussianModel,
    GaussianParams, GaussianProblem, CURVE_POINTS, FWHM_FACTOR,
};
pub use polynomial::{fit_background, BackgroundModel};

/// Result of a fit: either the fitted model or the reason it failed.
///
/// A failed fit never carries partial results.
#[derive(Debug)]
pub enum FitOutcome<T> {
    Success(T),
    Failure(PeakFitError),
}

impl<T> FitOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, FitOutcome::Success(_))
    }

    /// The fitted value, if any.
    pub fn success(self) -> Option<T> {
        match self {
            FitOutcome::Success(value) => Some(value),
            FitOutcome::Failure(_) => None,
        }
    }

    /// The failure reason, if any.
    pub fn failure(self) -> Option<PeakFitError> {
        match self {
            FitOutcome::Success(_) => None,
            FitOutcome::Failure(err) => Some(err),
        }
    }

    pub fn into_result(self) -> Result<T> {
        match self {
            FitOutcome::Success(value) => Ok(value),
            FitOutcome::Failure(err) => Err(err),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> FitOutcome<U> {
        match self {
            FitOutcome::Success(value) => FitOutcome::Success(f(value)),
            FitOutcome::Failure(err) => FitOutcome::Failure(err),
        }
    }
}

impl<T> From<Result<T>> for FitOutcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => FitOutcome::Success(value),
            Err(err) => FitOutcome::Failure(err),
        }
    }
}

/// A fitted model of any registered kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum FitResult {
    Linear(LinearFitResult),
    Gaussian(GaussianFitResult),
}

/// A curve model that can be fitted to `(x, y)` samples.
pub trait FitModel: Send + Sync {
    /// Name the model is registered under.
    fn name(&self) -> &str;

    /// Fit the model to the samples.
    fn fit(&self, x: ArrayView1<f64>, y: ArrayView1<f64>) -> FitOutcome<FitResult>;
}

/// Name → model lookup, built explicitly by the caller.
#[derive(Default)]
pub struct ModelRegistry {
    models: BTreeMap<String, Box<dyn FitModel>>,
}

impl ModelRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in `"linear"` and `"gaussian"` models.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(LinearModel));
        registry.register(Box::new(GaussianModel::default()));
        registry
    }

    /// Register a model under its name, returning any model it replaces.
    pub fn register(&mut self, model: Box<dyn FitModel>) -> Option<Box<dyn FitModel>> {
        self.models.insert(model.name().to_string(), model)
    }

    pub fn get(&self, name: &str) -> Option<&dyn FitModel> {
        self.models.get(name).map(|m| m.as_ref())
    }

    /// Registered model names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.models.keys().map(String::as_str).collect()
    }

    /// Fit the named model to the samples.
    pub fn fit(&self, name: &str, x: ArrayView1<f64>, y: ArrayView1<f64>) -> FitOutcome<FitResult> {
        match self.get(name) {
            Some(model) => model.fit(x, y),
            None => FitOutcome::Failure(PeakFitError::UnknownModel(name.to_string())),
        }
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("models", &self.names())
            .finish()
    }
}

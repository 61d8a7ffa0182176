//! Gaussian peak fits through the public API.

use crate::test_helpers::{add_noise, gaussian, init_logging};
use approx::assert_relative_eq;
use ndarray::Array1;
use peakfit_rs::lm::ConvergenceStatus;
use peakfit_rs::models::{CURVE_POINTS, FWHM_FACTOR};
use peakfit_rs::{
    fit_gaussian, fit_gaussian_with, FitOutcome, GaussianGuess, LevenbergMarquardt, PeakFitError,
};

#[test]
fn test_noise_free_recovery() {
    init_logging();
    let x = Array1::linspace(0.0, 10.0, 101);
    let y = x.mapv(|v| gaussian(v, 10.0, 5.0, 1.0, 0.0));

    let fit = match fit_gaussian(&x, &y, &GaussianGuess::default()) {
        FitOutcome::Success(fit) => fit,
        FitOutcome::Failure(err) => panic!("fit failed: {}", err),
    };

    assert_relative_eq!(fit.amplitude, 10.0, max_relative = 0.01);
    assert_relative_eq!(fit.mean, 5.0, max_relative = 0.01);
    assert_relative_eq!(fit.sigma, 1.0, max_relative = 0.01);
    assert!(fit.y_offset.abs() < 0.01);
    assert_relative_eq!(fit.fwhm(), FWHM_FACTOR, max_relative = 0.01);
    assert!(matches!(
        fit.status,
        ConvergenceStatus::ParameterConvergence
            | ConvergenceStatus::FunctionValueConvergence
            | ConvergenceStatus::GradientConvergence
    ));
}

#[test]
fn test_noisy_recovery() {
    let x = Array1::linspace(2800.0, 3000.0, 201);
    let clean = x.mapv(|v| gaussian(v, 0.8, 2905.0, 12.0, 0.05));
    let y = add_noise(&clean, 0.01, 42);

    let fit = fit_gaussian(&x, &y, &GaussianGuess::default()).into_result().unwrap();

    assert_relative_eq!(fit.amplitude, 0.8, epsilon = 0.03);
    assert_relative_eq!(fit.mean, 2905.0, epsilon = 0.5);
    assert_relative_eq!(fit.sigma, 12.0, epsilon = 0.5);
    assert_relative_eq!(fit.y_offset, 0.05, epsilon = 0.01);
    assert!(fit.r_squared > 0.95);

    assert_eq!(fit.curve_x.len(), CURVE_POINTS);
    assert_eq!(fit.curve_y.len(), CURVE_POINTS);
    assert_eq!(fit.curve_x[0], 2800.0);
    assert_relative_eq!(fit.curve_x[CURVE_POINTS - 1], 3000.0, epsilon = 1e-9);
}

#[test]
fn test_guess_overrides() {
    let x = Array1::linspace(0.0, 20.0, 200);
    // Two peaks; the guess steers the fit to the smaller one
    let y = x.mapv(|v| gaussian(v, 6.0, 5.0, 0.8, 0.0) + gaussian(v, 3.0, 15.0, 0.8, 0.0));
    let window: Vec<usize> = (0..x.len()).filter(|&i| x[i] > 12.0).collect();
    let xs = x.select(ndarray::Axis(0), &window);
    let ys = y.select(ndarray::Axis(0), &window);

    let guess = GaussianGuess::new().with_mean(15.0).with_sigma(1.0);
    let fit = fit_gaussian(&xs, &ys, &guess).into_result().unwrap();
    assert_relative_eq!(fit.mean, 15.0, epsilon = 1e-4);
    assert_relative_eq!(fit.amplitude, 3.0, epsilon = 1e-3);
}

#[test]
fn test_mismatched_lengths() {
    let x = Array1::linspace(0.0, 1.0, 10);
    let y = Array1::zeros(9);
    match fit_gaussian(&x, &y, &GaussianGuess::default()) {
        FitOutcome::Failure(PeakFitError::MismatchedLengths { x_len, y_len }) => {
            assert_eq!((x_len, y_len), (10, 9))
        }
        other => panic!("expected MismatchedLengths, got {:?}", other),
    }
}

#[test]
fn test_too_few_samples() {
    let outcome = fit_gaussian(&[0.0, 1.0, 2.0][..], &[0.0, 1.0, 0.0][..], &GaussianGuess::default());
    assert!(matches!(
        outcome,
        FitOutcome::Failure(PeakFitError::InsufficientData { required: 4, actual: 3 })
    ));
}

#[test]
fn test_unconverged_fit_is_failure() {
    let x = Array1::linspace(0.0, 10.0, 101);
    let y = x.mapv(|v| gaussian(v, 10.0, 5.0, 1.0, 0.0));
    let optimizer = LevenbergMarquardt::new().with_max_iterations(1);
    let guess = GaussianGuess::new().with_mean(3.0).with_sigma(2.5).with_amplitude(4.0);

    let outcome = fit_gaussian_with(&x, &y, &guess, &optimizer);
    assert!(!outcome.is_success());
    match outcome.failure() {
        Some(PeakFitError::ConvergenceFailure { params, .. }) => assert_eq!(params.len(), 4),
        other => panic!("expected ConvergenceFailure, got {:?}", other),
    }
}

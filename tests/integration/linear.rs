//! Linear regression and polynomial backgrounds.

use crate::test_helpers::add_noise;
use approx::assert_relative_eq;
use ndarray::Array1;
use peakfit_rs::{fit_linear, BackgroundModel, PeakFitError};

#[test]
fn test_repeated_fits_are_bit_identical() {
    let x = Array1::linspace(3600.0, 5500.0, 1901);
    let y = add_noise(&x.mapv(|v| 2.5 - 4e-4 * v), 0.02, 11);

    let first = fit_linear(&x, &y).unwrap();
    for _ in 0..5 {
        let again = fit_linear(&x, &y).unwrap();
        assert_eq!(first.slope.to_bits(), again.slope.to_bits());
        assert_eq!(first.intercept.to_bits(), again.intercept.to_bits());
        assert_eq!(first.p_value.to_bits(), again.p_value.to_bits());
        assert_eq!(first.std_err.to_bits(), again.std_err.to_bits());
    }

    assert_relative_eq!(first.slope, -4e-4, epsilon = 2e-5);
    assert!(first.p_value < 1e-10);
}

#[test]
fn test_linear_agrees_with_degree_one_background() {
    let x = Array1::linspace(0.0, 50.0, 60);
    let y = add_noise(&x.mapv(|v| 0.3 * v - 2.0), 0.5, 3);

    let line = fit_linear(&x, &y).unwrap();
    let poly = BackgroundModel::fit(&x, &y, 1).unwrap();
    for v in [0.0, 17.5, 50.0] {
        assert_relative_eq!(line.predict(v), poly.eval(v), epsilon = 1e-9);
    }
}

#[test]
fn test_no_trend_has_large_p_value() {
    let x = Array1::linspace(0.0, 1.0, 200);
    let y = add_noise(&Array1::from_elem(200, 1.0), 0.1, 5);
    let fit = fit_linear(&x, &y).unwrap();
    assert!(fit.p_value > 0.001);
    assert!(fit.r_squared < 0.1);
}

#[test]
fn test_guards() {
    let err = fit_linear(&[1.0, 2.0][..], &[1.0, 2.0, 3.0][..]).unwrap_err();
    assert!(matches!(err, PeakFitError::MismatchedLengths { x_len: 2, y_len: 3 }));

    let err = BackgroundModel::fit(&[1.0, 2.0][..], &[1.0, 2.0][..], 2).unwrap_err();
    assert!(matches!(err, PeakFitError::InsufficientData { required: 3, actual: 2 }));
}

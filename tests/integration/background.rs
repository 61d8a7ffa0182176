//! Background window search on synthetic spectra.

use crate::test_helpers::{add_noise, gaussian, init_logging, valley_baseline, valley_spectrum};
use approx::assert_relative_eq;
use ndarray::Array1;
use peakfit_rs::{
    classify_spectrum, compute_peak_height, estimate_global_background,
    find_background_fitting_points, fit_background, GlobalBackground, PeakFitError, Spectrum,
    SpectrumClass, WindowConfig,
};

fn spectrum_with_tail(tail: impl Fn(f64) -> f64) -> Spectrum {
    let x = Array1::linspace(1500.0, 5500.0, 4001);
    let y = x.mapv(|v: f64| {
        let baseline = if v <= 3600.0 { valley_baseline(v) } else { tail(v) };
        baseline + gaussian(v, 5.0, 3400.0, 30.0, 0.0)
    });
    Spectrum::new(x, y).unwrap()
}

/// Rises to 1 at 3700, then falls to -0.8 at the end.
fn falling_tail(v: f64) -> f64 {
    if v <= 3700.0 {
        0.01 * (v - 3600.0)
    } else {
        1.0 - 0.001 * (v - 3700.0)
    }
}

#[test]
fn test_window_converges_on_coarse_grid() {
    init_logging();
    let spectrum = valley_spectrum(2.0);
    let config = WindowConfig::default();

    let points = find_background_fitting_points(&spectrum, &config, None).unwrap();

    assert!((170..=230).contains(&points.left_count), "{}", points.left_count);
    assert!((170..=230).contains(&points.right_count), "{}", points.right_count);
    assert_eq!(points.len(), points.left_count + points.right_count);
    assert_eq!(points.peak.x, 3400.0);
    assert!(!points.used_global_background);
    assert!(points.x.iter().all(|&x| x < 3200.0 || x >= 3600.0));

    // Raw y values are kept
    for (&x, &y) in points.x.iter().zip(points.y.iter()) {
        assert_relative_eq!(y, valley_baseline(x) + gaussian(x, 5.0, 3400.0, 30.0, 0.0));
    }
}

#[test]
fn test_window_converges_with_noise() {
    init_logging();
    let clean = valley_spectrum(1.0);
    let noisy = add_noise(clean.y(), 1e-3, 7);
    let spectrum = Spectrum::new(clean.x().clone(), noisy).unwrap();

    let points = find_background_fitting_points(&spectrum, &WindowConfig::default(), None).unwrap();

    assert!((170..=230).contains(&points.left_count), "{}", points.left_count);
    assert!((170..=230).contains(&points.right_count), "{}", points.right_count);
    assert!((points.peak.x - 3400.0).abs() <= 5.0);
}

#[test]
fn test_height_and_window_agree_on_peak() {
    let spectrum = valley_spectrum(2.0);
    let config = WindowConfig::default();

    let points = find_background_fitting_points(&spectrum, &config, None).unwrap();
    let background = fit_background(&points, 3).unwrap();
    let height = compute_peak_height(&spectrum, &background, &config).unwrap();

    assert_eq!(height.x, points.peak.x);
    assert_eq!(height.index, points.peak.index);
    assert_relative_eq!(height.height, points.peak.y - background.eval(points.peak.x));
    assert!(height.height > 4.0);
}

#[test]
fn test_global_background_zero_for_rising_tail() {
    let spectrum = spectrum_with_tail(|v| (0.005 * (v - 3600.0)).min(2.0));
    let background = estimate_global_background(&spectrum, Some(3000.0));
    assert_eq!(background, GlobalBackground::Zero);
    assert_eq!(background.eval(1234.0), 0.0);
}

#[test]
fn test_global_background_line_for_falling_tail() {
    let spectrum = spectrum_with_tail(falling_tail);
    match estimate_global_background(&spectrum, Some(3000.0)) {
        GlobalBackground::Linear { slope, intercept } => {
            assert!(slope < 0.0);
            assert_relative_eq!(slope * 5500.0 + intercept, -0.8, epsilon = 1e-9);
            assert!((slope * 3600.0 + intercept).abs() < 1e-6);
        }
        GlobalBackground::Zero => panic!("expected a decreasing line"),
    }
}

/// Baseline rising towards the peak, so the left minimum always sits at the
/// lower crop bound.
fn rising_left_spectrum() -> Spectrum {
    let x = Array1::linspace(1500.0, 5500.0, 4001);
    let y = x.mapv(|v: f64| {
        let baseline = if v < 3400.0 {
            0.001 * (v - 1500.0)
        } else if v <= 3600.0 {
            1.9 - 0.005 * (v - 3400.0)
        } else {
            0.9 + 0.01 * (v - 3600.0)
        };
        baseline + gaussian(v, 5.0, 3400.0, 30.0, 0.0)
    });
    Spectrum::new(x, y).unwrap()
}

#[test]
fn test_low_bound_failure_after_fallback() {
    init_logging();
    let spectrum = rising_left_spectrum();

    match find_background_fitting_points(&spectrum, &WindowConfig::default(), None) {
        Err(PeakFitError::NoLowBoundFound(reason)) => {
            assert!(reason.ends_with("(after global background fallback)"), "{}", reason)
        }
        other => panic!("expected NoLowBoundFound, got {:?}", other.map(|p| p.len())),
    }
}

#[test]
fn test_supplied_background_skips_fallback() {
    let spectrum = rising_left_spectrum();
    let zero = |_: f64| 0.0;

    match find_background_fitting_points(&spectrum, &WindowConfig::default(), Some(&zero)) {
        Err(PeakFitError::NoLowBoundFound(reason)) => {
            assert!(!reason.contains("fallback"), "{}", reason)
        }
        other => panic!("expected NoLowBoundFound, got {:?}", other.map(|p| p.len())),
    }
}

#[test]
fn test_window_limits_are_configurable() {
    let spectrum = valley_spectrum(2.0);

    // The right minimum at 3600 lies beyond the configured upper limit
    let config = WindowConfig::default().with_limits(1000.0, 3500.0);
    let err = find_background_fitting_points(&spectrum, &config, None).unwrap_err();
    assert!(matches!(err, PeakFitError::NoHighBoundFound(_)), "{:?}", err);

    // 300 points right of 3600 push the upper crop bound past 4100, which is
    // fine as long as the minimum itself stays inside the limit
    let config = WindowConfig::default()
        .with_target(300, 30)
        .with_limits(1000.0, 4100.0);
    let points = find_background_fitting_points(&spectrum, &config, None).unwrap();
    assert!(points.window.high > 4100.0);
    assert!((270..=330).contains(&points.right_count), "{}", points.right_count);
}

/// Flat zero baseline over exactly 250 samples on each side of a triangular
/// peak at 3400, with the baseline rising away outside the flat runs.
fn flat_shoulder_spectrum() -> Spectrum {
    let x = Array1::linspace(1500.0, 5500.0, 4001);
    let y = x.mapv(|v: f64| {
        if v < 3101.0 {
            0.01 * (3101.0 - v)
        } else if v > 3699.0 {
            0.01 * (v - 3699.0)
        } else {
            (5.0 - 0.1 * (v - 3400.0).abs()).max(0.0)
        }
    });
    Spectrum::new(x, y).unwrap()
}

#[test]
fn test_window_converges_on_flat_shoulders() {
    let spectrum = flat_shoulder_spectrum();
    let flat = spectrum.y().iter().filter(|&&v| v == 0.0).count();
    assert_eq!(flat, 500);

    let points =
        find_background_fitting_points(&spectrum, &WindowConfig::default(), None).unwrap();

    assert!((170..=230).contains(&points.left_count), "{}", points.left_count);
    assert!((170..=230).contains(&points.right_count), "{}", points.right_count);

    // Minima resolve to the flat samples next to the peak, so every fitting
    // point comes from the flat runs
    assert_eq!(points.x[points.left_count - 1], 3349.0);
    assert_eq!(points.x[points.left_count], 3450.0);
    assert!(points.y.iter().all(|&v| v == 0.0));
}

#[test]
fn test_classification() {
    let rising = valley_spectrum(1.0);
    assert_eq!(
        classify_spectrum(&rising, &WindowConfig::default()).unwrap(),
        SpectrumClass::WellBehaved
    );

    let falling = spectrum_with_tail(falling_tail);
    assert_eq!(
        classify_spectrum(&falling, &WindowConfig::default()).unwrap(),
        SpectrumClass::LowSignal
    );
}

#[test]
fn test_config_from_json_drives_search() {
    let config = WindowConfig::from_json(r#"{"target_count": 150, "tolerance": 10}"#).unwrap();
    let points = find_background_fitting_points(&valley_spectrum(2.0), &config, None).unwrap();
    assert!((140..=160).contains(&points.left_count));
    assert!((140..=160).contains(&points.right_count));
}

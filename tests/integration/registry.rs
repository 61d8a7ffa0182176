//! Model registry and batch fitting.

use crate::test_helpers::gaussian;
use ndarray::Array1;
use peakfit_rs::models::GaussianModel;
use peakfit_rs::{FitOutcome, FitResult, GaussianGuess, ModelRegistry, PeakFitError};

#[test]
fn test_registry_dispatches_by_name() {
    let registry = ModelRegistry::with_defaults();
    let x = Array1::linspace(0.0, 10.0, 80);
    let y = x.mapv(|v| gaussian(v, 2.0, 4.0, 1.5, 0.2));

    match registry.fit("gaussian", x.view(), y.view()) {
        FitOutcome::Success(FitResult::Gaussian(fit)) => {
            assert!((fit.mean - 4.0).abs() < 1e-6);
            assert!((fit.sigma - 1.5).abs() < 1e-6);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    match registry.fit("linear", x.view(), y.view()) {
        FitOutcome::Success(FitResult::Linear(_)) => {}
        other => panic!("unexpected outcome: {:?}", other),
    }

    assert!(matches!(
        registry.fit("lorentzian", x.view(), y.view()),
        FitOutcome::Failure(PeakFitError::UnknownModel(_))
    ));
}

#[test]
fn test_custom_registration() {
    let mut registry = ModelRegistry::new();
    assert!(registry.names().is_empty());

    let model = GaussianModel::new().with_guess(GaussianGuess::new().with_sigma(1.0));
    registry.register(Box::new(model));
    assert_eq!(registry.names(), vec!["gaussian"]);
}

#[test]
fn test_fit_result_serializes_with_tag() {
    let registry = ModelRegistry::with_defaults();
    let x = Array1::linspace(0.0, 3.0, 4);
    let y = x.mapv(|v| 2.0 * v);
    let result = registry.fit("linear", x.view(), y.view()).into_result().unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["model"], "linear");
    assert_eq!(json["slope"], 2.0);
}

#[cfg(feature = "parallel")]
#[test]
fn test_batch_matches_sequential() {
    use peakfit_rs::batch::{fit_batch, fit_gaussian_batch, Series};
    use peakfit_rs::LevenbergMarquardt;

    let series: Vec<Series> = (0..16)
        .map(|i| {
            let x = Array1::linspace(0.0, 10.0, 100);
            let y = x.mapv(|v| gaussian(v, 1.0 + i as f64, 2.0 + 0.4 * i as f64, 0.9, 0.0));
            (x, y)
        })
        .collect();

    let outcomes = fit_gaussian_batch(&series, &GaussianGuess::default(), &LevenbergMarquardt::new());
    for (i, outcome) in outcomes.into_iter().enumerate() {
        let fit = outcome.into_result().unwrap();
        assert!((fit.mean - (2.0 + 0.4 * i as f64)).abs() < 1e-6);
    }

    let model = GaussianModel::new();
    let batch = fit_batch(&model, &series);
    assert_eq!(batch.len(), series.len());
    assert!(batch.iter().all(|o| o.is_success()));
}

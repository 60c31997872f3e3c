//! AccuracyScorer tests: MAPE exclusion, error statistics and sharding.

use approx::assert_relative_eq;
use staffing_core::{AccuracyAccumulator, AccuracyGrade, AccuracyScorer, StaffingError};

/// actual = [10, 0, 20], forecast = [12, 5, 18]: index 1 is left out of MAPE.
#[test]
fn zero_actuals_are_excluded_from_mape() {
    let report = AccuracyScorer::new()
        .score(&[10.0, 0.0, 20.0], &[12.0, 5.0, 18.0])
        .unwrap();

    let mape = report.mape.expect("two admissible periods");
    assert_relative_eq!(mape, (20.0 + 10.0) / 2.0, max_relative = 1e-12);
    assert_eq!(report.mape_excluded, 1);
    assert_eq!(report.periods, 3);
    assert_relative_eq!(report.mae, (2.0 + 5.0 + 2.0) / 3.0, max_relative = 1e-12);
    assert_relative_eq!(report.rmse, ((4.0 + 25.0 + 4.0) / 3.0_f64).sqrt(), max_relative = 1e-12);
    assert_relative_eq!(report.bias, (2.0 + 5.0 - 2.0) / 3.0, max_relative = 1e-12);
}

#[test]
fn bias_is_positive_when_over_forecasting() {
    let scorer = AccuracyScorer::new();
    let over = scorer.score(&[10.0, 10.0], &[12.0, 11.0]).unwrap();
    let under = scorer.score(&[10.0, 10.0], &[8.0, 9.0]).unwrap();
    assert!(over.bias > 0.0, "over-forecast bias {}", over.bias);
    assert!(under.bias < 0.0, "under-forecast bias {}", under.bias);
}

#[test]
fn perfect_forecast_scores_zero() {
    let report = AccuracyScorer::new()
        .score(&[3.0, 7.0, 11.0], &[3.0, 7.0, 11.0])
        .unwrap();
    assert_eq!(report.mape, Some(0.0));
    assert_eq!(report.mae, 0.0);
    assert_eq!(report.rmse, 0.0);
    assert_eq!(report.bias, 0.0);
    assert_eq!(report.grade(), Some(AccuracyGrade::Excellent));
}

#[test]
fn all_zero_actuals_leave_mape_undefined() {
    let report = AccuracyScorer::new()
        .score(&[0.0, 0.0], &[1.0, 3.0])
        .unwrap();
    assert_eq!(report.mape, None);
    assert_eq!(report.grade(), None);
    assert_eq!(report.mape_excluded, 2);
    assert_relative_eq!(report.mae, 2.0, max_relative = 1e-12);
}

#[test]
fn length_mismatch_is_an_error() {
    let result = AccuracyScorer::new().score(&[1.0, 2.0, 3.0], &[1.0, 2.0]);
    assert!(matches!(
        result,
        Err(StaffingError::LengthMismatch { actual: 3, forecast: 2 })
    ));
}

#[test]
fn empty_series_is_an_error() {
    assert!(matches!(
        AccuracyScorer::new().score(&[], &[]),
        Err(StaffingError::EmptySeries)
    ));
    assert!(matches!(
        AccuracyAccumulator::new().finish(),
        Err(StaffingError::EmptySeries)
    ));
}

#[test]
fn non_finite_values_are_rejected() {
    assert!(matches!(
        AccuracyScorer::new().score(&[1.0, f64::NAN], &[1.0, 2.0]),
        Err(StaffingError::NonFinite { series: "actual", index: 1 })
    ));
    assert!(matches!(
        AccuracyScorer::new().score(&[1.0, 2.0], &[f64::INFINITY, 2.0]),
        Err(StaffingError::NonFinite { series: "forecast", index: 0 })
    ));
}

/// Merging shard sums must equal scoring the whole series; averaging
/// the shards' MAPEs would not.
#[test]
fn merged_shards_match_whole_series() {
    let actual = [10.0, 0.0, 20.0, 40.0, 5.0, 8.0, 0.0];
    let forecast = [12.0, 5.0, 18.0, 30.0, 7.0, 8.0, 2.0];
    let scorer = AccuracyScorer::new();

    let whole = scorer.score(&actual, &forecast).unwrap();

    let mut merged = scorer.accumulate(&actual[..3], &forecast[..3]).unwrap();
    merged.merge(&scorer.accumulate(&actual[3..], &forecast[3..]).unwrap());
    let sharded = merged.finish().unwrap();

    assert_eq!(sharded.periods, whole.periods);
    assert_eq!(sharded.mape_excluded, whole.mape_excluded);
    assert_relative_eq!(sharded.mape.unwrap(), whole.mape.unwrap(), max_relative = 1e-12);
    assert_relative_eq!(sharded.mae, whole.mae, max_relative = 1e-12);
    assert_relative_eq!(sharded.rmse, whole.rmse, max_relative = 1e-12);
    assert_relative_eq!(sharded.bias, whole.bias, max_relative = 1e-12);

    let first = scorer.score(&actual[..3], &forecast[..3]).unwrap().mape.unwrap();
    let second = scorer.score(&actual[3..], &forecast[3..]).unwrap().mape.unwrap();
    assert!(
        ((first + second) / 2.0 - whole.mape.unwrap()).abs() > 1e-6,
        "averaging partial MAPEs should not reproduce the whole-series MAPE"
    );
}

#[test]
fn grades_follow_mape_bands() {
    assert_eq!(AccuracyGrade::from_mape(3.0), AccuracyGrade::Excellent);
    assert_eq!(AccuracyGrade::from_mape(5.0), AccuracyGrade::Good);
    assert_eq!(AccuracyGrade::from_mape(8.5), AccuracyGrade::Acceptable);
    assert_eq!(AccuracyGrade::from_mape(10.0), AccuracyGrade::Acceptable);
    assert_eq!(AccuracyGrade::from_mape(12.0), AccuracyGrade::Poor);
}

//! Forecaster tests: seasonal decomposition layers and exponential smoothing.

use approx::assert_relative_eq;
use staffing_core::{
    forecast::{
        growth_multiplier, DayContext, DayType, DayTypeFactors, ExponentialSmoothing,
        ForecastModel, HoltWinters, HoltWintersParams, SeasonalLayers, SeasonalModel, Z_95,
    },
    AccuracyScorer, StaffingError,
};

/// Two days of a four-slot pattern: 10, 20, 30, 40.
fn two_days() -> Vec<f64> {
    vec![10.0, 20.0, 30.0, 40.0, 10.0, 20.0, 30.0, 40.0]
}

#[test]
fn seasonal_indices_are_slot_mean_over_overall_mean() {
    let model = SeasonalModel::fit(&two_days(), 4).unwrap();

    assert_relative_eq!(model.base(), 25.0, max_relative = 1e-12);
    let expected = [0.4, 0.8, 1.2, 1.6];
    for (slot, want) in expected.iter().enumerate() {
        assert_relative_eq!(model.seasonal_index(slot), *want, max_relative = 1e-12);
    }
    // Indices average to one across the season.
    let mean: f64 = model.indices().iter().sum::<f64>() / 4.0;
    assert_relative_eq!(mean, 1.0, max_relative = 1e-12);
}

#[test]
fn seasonal_fit_reproduces_a_pure_pattern() {
    let history = two_days();
    let model = SeasonalModel::fit(&history, 4).unwrap();

    let report = AccuracyScorer::new().score(&history, model.fitted()).unwrap();
    assert!(report.mae < 1e-9, "in-sample MAE {}", report.mae);

    let next = model.forecast(6);
    assert_eq!(next.len(), 6);
    assert_relative_eq!(next[0], 10.0, max_relative = 1e-12);
    assert_relative_eq!(next[5], 20.0, max_relative = 1e-12);
}

#[test]
fn layers_multiply_through() {
    let model = SeasonalModel::fit(&two_days(), 4)
        .unwrap()
        .with_layers(SeasonalLayers {
            annual_growth: 0.07,
            day_factors: DayTypeFactors::conventional(),
        });

    let weekday = model
        .forecast_day(&DayContext {
            day_number: 365,
            day_type: DayType::Weekday,
            event_multiplier: 1.0,
        })
        .unwrap();
    // One full year of 7% growth.
    assert_relative_eq!(weekday[3], 40.0 * 1.07, max_relative = 1e-12);

    let weekend_promo = model
        .forecast_day(&DayContext {
            day_number: 0,
            day_type: DayType::Weekend,
            event_multiplier: 1.25,
        })
        .unwrap();
    assert_relative_eq!(weekend_promo[1], 20.0 * 0.4 * 1.25, max_relative = 1e-12);

    let closed = model
        .forecast_day(&DayContext {
            day_number: 10,
            day_type: DayType::Holiday,
            event_multiplier: 0.0,
        })
        .unwrap();
    assert!(closed.iter().all(|v| *v == 0.0));
}

#[test]
fn unlayered_day_forecast_is_the_seasonal_profile() {
    let model = SeasonalModel::fit(&two_days(), 4).unwrap();
    let day = model
        .forecast_day(&DayContext {
            day_number: 200,
            day_type: DayType::Holiday,
            event_multiplier: 1.0,
        })
        .unwrap();
    assert_relative_eq!(day[2], 30.0, max_relative = 1e-12);
}

#[test]
fn growth_multiplier_is_linear_in_days() {
    assert_eq!(growth_multiplier(0.07, 0), 1.0);
    assert_relative_eq!(growth_multiplier(0.07, 73), 1.014, max_relative = 1e-12);
}

#[test]
fn seasonal_fit_rejects_bad_shapes() {
    assert!(matches!(SeasonalModel::fit(&[], 4), Err(StaffingError::EmptySeries)));
    assert!(matches!(
        SeasonalModel::fit(&[1.0, 2.0], 4),
        Err(StaffingError::InvalidInput { .. })
    ));
    assert!(matches!(
        SeasonalModel::fit(&[1.0, 2.0], 0),
        Err(StaffingError::InvalidInput { .. })
    ));
    assert!(matches!(
        SeasonalModel::fit(&[1.0, f64::NAN, 3.0, 4.0], 2),
        Err(StaffingError::NonFinite { index: 1, .. })
    ));

    let model = SeasonalModel::fit(&two_days(), 4).unwrap();
    let bad_event = model.forecast_day(&DayContext {
        day_number: 0,
        day_type: DayType::Weekday,
        event_multiplier: -1.0,
    });
    assert!(bad_event.is_err());
}

#[test]
fn all_zero_history_gives_zero_indices() {
    let model = SeasonalModel::fit(&[0.0; 8], 4).unwrap();
    assert!(model.indices().iter().all(|i| *i == 0.0));
    assert!(model.forecast(4).iter().all(|v| *v == 0.0));
}

/// f₀ = mean = 20; f₁ = 0.5·10 + 0.5·20 = 15; f₂ = 0.5·30 + 0.5·15 = 22.5;
/// next = 0.5·20 + 0.5·22.5 = 21.25.
#[test]
fn exponential_smoothing_recurrence() {
    let model = ExponentialSmoothing::fit(&[10.0, 30.0, 20.0], 0.5).unwrap();

    assert_eq!(model.fitted(), &[20.0, 15.0, 22.5]);
    assert_eq!(model.level(), 21.25);
    assert_eq!(model.forecast(3), vec![21.25; 3]);
    assert_eq!(model.alpha(), 0.5);
}

#[test]
fn exponential_smoothing_validates_inputs() {
    assert!(ExponentialSmoothing::fit(&[1.0], 0.0).is_err());
    assert!(ExponentialSmoothing::fit(&[1.0], 1.0).is_err());
    assert!(matches!(
        ExponentialSmoothing::fit(&[], 0.3),
        Err(StaffingError::EmptySeries)
    ));
}

#[test]
fn forecasters_share_a_common_surface() {
    let history = two_days();
    let models: Vec<Box<dyn ForecastModel>> = vec![
        Box::new(SeasonalModel::fit(&history, 4).unwrap()),
        Box::new(ExponentialSmoothing::fit(&history, 0.3).unwrap()),
    ];
    for model in &models {
        assert_eq!(model.fitted().len(), history.len(), "{}", model.name());
        assert_eq!(model.forecast(5).len(), 5, "{}", model.name());
    }
}

const HW_PARAMS: HoltWintersParams = HoltWintersParams {
    alpha: 0.4,
    beta: 0.1,
    gamma: 0.3,
};

#[test]
fn holt_winters_tracks_a_pure_pattern_exactly() {
    let history = two_days();
    let model = HoltWinters::fit(&history, 4, HW_PARAMS).unwrap();

    assert_eq!(model.trend(), 0.0);
    assert_eq!(model.sigma(), 0.0);
    let report = AccuracyScorer::new().score(&history, model.fitted()).unwrap();
    assert!(report.mae < 1e-9, "in-sample MAE {}", report.mae);

    let next = model.forecast(5);
    for (got, want) in next.iter().zip([10.0, 20.0, 30.0, 40.0, 10.0]) {
        assert_relative_eq!(*got, want, max_relative = 1e-12);
    }
    for band in model.forecast_bands(5, Z_95) {
        assert_eq!(band.lower, band.point);
        assert_eq!(band.upper, band.point);
    }
}

#[test]
fn holt_winters_carries_the_trend_forward() {
    // Steady growth of one call per slot over three days.
    let history: Vec<f64> = (0..12u32).map(|t| 10.0 + f64::from(t)).collect();
    let model = HoltWinters::fit(&history, 4, HW_PARAMS).unwrap();

    assert!(model.trend() > 0.0, "trend {}", model.trend());
    let next = model.forecast(8);
    for h in 0..4 {
        assert_relative_eq!(next[h + 4] - next[h], 4.0 * model.trend(), max_relative = 1e-9);
    }
}

#[test]
fn holt_winters_bands_widen_with_the_horizon() {
    let noise = [0.5, -1.0, 0.7, -0.2, 1.1, -0.6, 0.3, 0.9, -0.8, 0.4, -1.2, 0.6];
    let history: Vec<f64> = [10.0, 20.0, 30.0, 40.0]
        .iter()
        .cycle()
        .zip(noise)
        .map(|(base, n)| base + n)
        .collect();
    let model = HoltWinters::fit(&history, 4, HW_PARAMS).unwrap();
    assert!(model.sigma() > 0.0);

    let bands = model.forecast_bands(9, Z_95);
    let points = model.forecast(9);
    for (band, point) in bands.iter().zip(&points) {
        assert_eq!(band.point, *point);
        assert!(band.lower < band.point && band.point < band.upper);
        assert!(band.contains(band.point));
        assert_relative_eq!(band.point - band.lower, band.upper - band.point, max_relative = 1e-12);
    }
    assert_relative_eq!(
        bands[0].upper - bands[0].point,
        Z_95 * model.sigma(),
        max_relative = 1e-12
    );
    for pair in bands.windows(2) {
        assert!(pair[1].upper - pair[1].lower > pair[0].upper - pair[0].lower);
    }
}

#[test]
fn holt_winters_rejects_bad_inputs() {
    // Fewer than two seasons.
    assert!(matches!(
        HoltWinters::fit(&[1.0, 2.0, 3.0, 4.0, 5.0], 4, HW_PARAMS),
        Err(StaffingError::InvalidInput { .. })
    ));
    assert!(matches!(
        HoltWinters::fit(&[], 4, HW_PARAMS),
        Err(StaffingError::EmptySeries)
    ));
    let mut history = two_days();
    history[6] = f64::NAN;
    assert!(matches!(
        HoltWinters::fit(&history, 4, HW_PARAMS),
        Err(StaffingError::NonFinite { index: 6, .. })
    ));
    for params in [
        HoltWintersParams { alpha: 0.0, ..HW_PARAMS },
        HoltWintersParams { beta: 1.5, ..HW_PARAMS },
        HoltWintersParams { gamma: -0.1, ..HW_PARAMS },
    ] {
        assert!(HoltWinters::fit(&two_days(), 4, params).is_err());
    }
}

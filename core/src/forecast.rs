//! Volume forecasters whose output feeds the ErlangEngine and whose
//! accuracy is measured by the AccuracyScorer.
//!
//! Three models:
//!   - `SeasonalModel`: layered multiplicative decomposition,
//!     base × seasonal_index[slot] × trend × day_type × event.
//!   - `ExponentialSmoothing`: simple one-parameter smoothing for
//!     short-horizon forecasts.
//!   - `HoltWinters`: additive level, trend and season (triple
//!     smoothing) with prediction bands.

use crate::error::{StaffingError, StaffingResult};
use serde::{Deserialize, Serialize};

/// Common surface of the forecasters.
pub trait ForecastModel {
    fn name(&self) -> &str;

    /// In-sample fitted values, aligned one-to-one with the history.
    fn fitted(&self) -> &[f64];

    /// Out-of-sample forecast for the next `horizon` periods.
    fn forecast(&self, horizon: usize) -> Vec<f64>;
}

/// Calendar classification of a forecast day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    Weekday,
    Weekend,
    Holiday,
}

/// Volume multiplier per day type, relative to a weekday.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DayTypeFactors {
    pub weekday: f64,
    pub weekend: f64,
    pub holiday: f64,
}

impl DayTypeFactors {
    /// Weekends run at 40% of weekday volume, holidays at 15%.
    pub fn conventional() -> Self {
        Self {
            weekday: 1.0,
            weekend: 0.4,
            holiday: 0.15,
        }
    }

    pub fn factor(&self, day_type: DayType) -> f64 {
        match day_type {
            DayType::Weekday => self.weekday,
            DayType::Weekend => self.weekend,
            DayType::Holiday => self.holiday,
        }
    }
}

/// Linear annual growth: 1 + g·day/365.
pub fn growth_multiplier(annual_growth: f64, day_number: u32) -> f64 {
    1.0 + annual_growth * f64::from(day_number) / 365.0
}

/// The multiplicative layers stacked on top of the seasonal base.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SeasonalLayers {
    pub annual_growth: f64,
    pub day_factors: DayTypeFactors,
}

/// The day being forecast.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DayContext {
    /// Days since the end of the fitted history.
    pub day_number: u32,
    pub day_type: DayType,
    /// Special-event factor: 1.25 for a promotion, 0.0 when closed.
    pub event_multiplier: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeasonalModel {
    season_length: usize,
    history_len: usize,
    base: f64,
    indices: Vec<f64>,
    fitted: Vec<f64>,
    layers: Option<SeasonalLayers>,
}

impl SeasonalModel {
    /// Fit seasonal indices (slot mean / overall mean) over whole or
    /// partial seasons of `history`. Slot k of the season is every
    /// observation at position t with t % season_length == k.
    pub fn fit(history: &[f64], season_length: usize) -> StaffingResult<Self> {
        if history.is_empty() {
            return Err(StaffingError::EmptySeries);
        }
        if season_length == 0 || history.len() < season_length {
            return Err(StaffingError::InvalidInput {
                field: "season length",
                value: season_length as f64,
            });
        }
        check_series(history, "history")?;

        let base = history.iter().sum::<f64>() / history.len() as f64;

        let mut sums = vec![0.0; season_length];
        let mut counts = vec![0usize; season_length];
        for (t, &value) in history.iter().enumerate() {
            sums[t % season_length] += value;
            counts[t % season_length] += 1;
        }

        let indices: Vec<f64> = sums
            .iter()
            .zip(&counts)
            .map(|(&sum, &count)| {
                if base == 0.0 {
                    0.0
                } else {
                    (sum / count as f64) / base
                }
            })
            .collect();

        let fitted = (0..history.len())
            .map(|t| base * indices[t % season_length])
            .collect();

        log::debug!(
            "seasonal model: {} observations, season {}, base {:.2}",
            history.len(),
            season_length,
            base
        );

        Ok(Self {
            season_length,
            history_len: history.len(),
            base,
            indices,
            fitted,
            layers: None,
        })
    }

    pub fn with_layers(mut self, layers: SeasonalLayers) -> Self {
        self.layers = Some(layers);
        self
    }

    pub fn base(&self) -> f64 {
        self.base
    }

    pub fn season_length(&self) -> usize {
        self.season_length
    }

    pub fn seasonal_index(&self, slot: usize) -> f64 {
        self.indices[slot % self.season_length]
    }

    pub fn indices(&self) -> &[f64] {
        &self.indices
    }

    /// One season of slots for `day`, with every layer applied.
    pub fn forecast_day(&self, day: &DayContext) -> StaffingResult<Vec<f64>> {
        if !day.event_multiplier.is_finite() || day.event_multiplier < 0.0 {
            return Err(StaffingError::InvalidInput {
                field: "event multiplier",
                value: day.event_multiplier,
            });
        }

        let (trend, day_factor) = match &self.layers {
            Some(layers) => (
                growth_multiplier(layers.annual_growth, day.day_number),
                layers.day_factors.factor(day.day_type),
            ),
            None => (1.0, 1.0),
        };
        let scale = self.base * trend * day_factor * day.event_multiplier;

        Ok(self.indices.iter().map(|index| scale * index).collect())
    }
}

impl ForecastModel for SeasonalModel {
    fn name(&self) -> &str {
        "seasonal decomposition"
    }

    fn fitted(&self) -> &[f64] {
        &self.fitted
    }

    fn forecast(&self, horizon: usize) -> Vec<f64> {
        (self.history_len..self.history_len + horizon)
            .map(|t| self.base * self.seasonal_index(t))
            .collect()
    }
}

/// Simple exponential smoothing: fₜ₊₁ = α·aₜ + (1 − α)·fₜ,
/// seeded with the history mean.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExponentialSmoothing {
    alpha: f64,
    fitted: Vec<f64>,
    level: f64,
}

impl ExponentialSmoothing {
    pub fn fit(history: &[f64], alpha: f64) -> StaffingResult<Self> {
        if !alpha.is_finite() || alpha <= 0.0 || alpha >= 1.0 {
            return Err(StaffingError::InvalidInput {
                field: "smoothing alpha",
                value: alpha,
            });
        }
        if history.is_empty() {
            return Err(StaffingError::EmptySeries);
        }
        check_series(history, "history")?;

        let mut level = history.iter().sum::<f64>() / history.len() as f64;
        let mut fitted = Vec::with_capacity(history.len());
        for &actual in history {
            fitted.push(level);
            level = alpha * actual + (1.0 - alpha) * level;
        }

        Ok(Self {
            alpha,
            fitted,
            level,
        })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// The smoothed level, i.e. the next-period forecast.
    pub fn level(&self) -> f64 {
        self.level
    }
}

impl ForecastModel for ExponentialSmoothing {
    fn name(&self) -> &str {
        "simple exponential smoothing"
    }

    fn fitted(&self) -> &[f64] {
        &self.fitted
    }

    fn forecast(&self, horizon: usize) -> Vec<f64> {
        vec![self.level; horizon]
    }
}

/// Two-sided 95% normal quantile.
pub const Z_95: f64 = 1.959_963_984_540_054;

/// Smoothing weights for level (α), trend (β) and season (γ).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HoltWintersParams {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl HoltWintersParams {
    pub fn validate(&self) -> StaffingResult<()> {
        if !self.alpha.is_finite() || self.alpha <= 0.0 || self.alpha > 1.0 {
            return Err(StaffingError::InvalidInput {
                field: "level weight",
                value: self.alpha,
            });
        }
        for (field, value) in [("trend weight", self.beta), ("season weight", self.gamma)] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(StaffingError::InvalidInput { field, value });
            }
        }
        Ok(())
    }
}

/// Point forecast with its prediction band.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ForecastBand {
    pub point: f64,
    pub lower: f64,
    pub upper: f64,
}

impl ForecastBand {
    pub fn contains(&self, value: f64) -> bool {
        (self.lower..=self.upper).contains(&value)
    }
}

/// Additive Holt-Winters.
///
///   ℓₜ = α(yₜ − sₜ₋ₘ) + (1 − α)(ℓₜ₋₁ + bₜ₋₁)
///   bₜ = β(ℓₜ − ℓₜ₋₁) + (1 − β)bₜ₋₁
///   sₜ = γ(yₜ − ℓₜ) + (1 − γ)sₜ₋ₘ
///   ŷₜ₊ₕ = ℓₜ + h·bₜ + sₜ₊ₕ₋ₘ
///
/// Initial level is the first season's mean, initial trend the mean
/// per-slot change between the first two seasons, initial season the
/// first season's deviations from its mean.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HoltWinters {
    params: HoltWintersParams,
    season_length: usize,
    history_len: usize,
    level: f64,
    trend: f64,
    season: Vec<f64>,
    fitted: Vec<f64>,
    /// Standard deviation of the one-step in-sample errors.
    sigma: f64,
}

impl HoltWinters {
    pub fn fit(
        history: &[f64],
        season_length: usize,
        params: HoltWintersParams,
    ) -> StaffingResult<Self> {
        params.validate()?;
        if history.is_empty() {
            return Err(StaffingError::EmptySeries);
        }
        if season_length == 0 || history.len() < 2 * season_length {
            return Err(StaffingError::InvalidInput {
                field: "season length",
                value: season_length as f64,
            });
        }
        check_series(history, "history")?;

        let m = season_length;
        let first = &history[..m];
        let second = &history[m..2 * m];
        let first_mean = first.iter().sum::<f64>() / m as f64;
        let second_mean = second.iter().sum::<f64>() / m as f64;

        let HoltWintersParams { alpha, beta, gamma } = params;
        let mut level = first_mean;
        let mut trend = (second_mean - first_mean) / m as f64;
        let mut season: Vec<f64> = first.iter().map(|y| y - first_mean).collect();

        let mut fitted = Vec::with_capacity(history.len());
        let mut sum_sq_error = 0.0;
        for (t, &y) in history.iter().enumerate() {
            let slot = t % m;
            let predicted = level + trend + season[slot];
            fitted.push(predicted);
            sum_sq_error += (y - predicted).powi(2);

            let previous = level;
            level = alpha * (y - season[slot]) + (1.0 - alpha) * (level + trend);
            trend = beta * (level - previous) + (1.0 - beta) * trend;
            season[slot] = gamma * (y - level) + (1.0 - gamma) * season[slot];
        }
        let sigma = (sum_sq_error / history.len() as f64).sqrt();

        log::debug!(
            "holt-winters: {} observations, season {}, level {:.2}, trend {:+.4}, sigma {:.3}",
            history.len(),
            m,
            level,
            trend,
            sigma
        );

        Ok(Self {
            params,
            season_length,
            history_len: history.len(),
            level,
            trend,
            season,
            fitted,
            sigma,
        })
    }

    pub fn params(&self) -> HoltWintersParams {
        self.params
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    pub fn trend(&self) -> f64 {
        self.trend
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    fn point(&self, h: usize) -> f64 {
        let slot = (self.history_len + h - 1) % self.season_length;
        self.level + h as f64 * self.trend + self.season[slot]
    }

    /// Forecasts with bands at `z` standard errors (`Z_95` for 95%).
    /// The h-step variance is σ²·(1 + Σⱼ₌₁ʰ⁻¹ cⱼ²) with
    /// cⱼ = α(1 + jβ) + γ when j is a whole number of seasons, else
    /// α(1 + jβ).
    pub fn forecast_bands(&self, horizon: usize, z: f64) -> Vec<ForecastBand> {
        let HoltWintersParams { alpha, beta, gamma } = self.params;
        let mut spread = 1.0;
        (1..=horizon)
            .map(|h| {
                if h > 1 {
                    let j = h - 1;
                    let seasonal = if j % self.season_length == 0 { gamma } else { 0.0 };
                    let c = alpha * (1.0 + j as f64 * beta) + seasonal;
                    spread += c * c;
                }
                let point = self.point(h);
                let half_width = z * self.sigma * spread.sqrt();
                ForecastBand {
                    point,
                    lower: point - half_width,
                    upper: point + half_width,
                }
            })
            .collect()
    }
}

impl ForecastModel for HoltWinters {
    fn name(&self) -> &str {
        "holt-winters"
    }

    fn fitted(&self) -> &[f64] {
        &self.fitted
    }

    fn forecast(&self, horizon: usize) -> Vec<f64> {
        (1..=horizon).map(|h| self.point(h)).collect()
    }
}

fn check_series(series: &[f64], name: &'static str) -> StaffingResult<()> {
    match series.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(StaffingError::NonFinite {
            series: name,
            index,
        }),
        None => Ok(()),
    }
}

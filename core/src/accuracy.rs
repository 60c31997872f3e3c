//! AccuracyScorer: forecast accuracy over paired actual/forecast series.
//!
//! RULES:
//!   - Periods with actual = 0 are excluded from MAPE and counted.
//!     They are never scored as zero error.
//!   - Sharded series combine raw sums first (`AccuracyAccumulator::merge`),
//!     then average once. Partial MAPEs are never averaged.
//!   - Bias is forecast − actual: positive means over-forecasting.

use crate::error::{StaffingError, StaffingResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// MAPE reporting bands used by planners.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AccuracyGrade {
    Excellent,  // < 5%
    Good,       // 5–7%
    Acceptable, // 7–10%
    Poor,       // > 10%
}

impl AccuracyGrade {
    pub fn from_mape(mape: f64) -> Self {
        if mape < 5.0 {
            Self::Excellent
        } else if mape < 7.0 {
            Self::Good
        } else if mape <= 10.0 {
            Self::Acceptable
        } else {
            Self::Poor
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AccuracyReport {
    /// Percent. `None` when every actual was zero.
    pub mape: Option<f64>,
    pub mae: f64,
    pub rmse: f64,
    pub bias: f64,
    pub periods: usize,
    /// Periods left out of MAPE because the actual was zero.
    pub mape_excluded: usize,
}

impl AccuracyReport {
    pub fn grade(&self) -> Option<AccuracyGrade> {
        self.mape.map(AccuracyGrade::from_mape)
    }
}

impl fmt::Display for AccuracyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mape {
            Some(mape) => writeln!(f, "  MAPE:  {mape:.2}%")?,
            None => writeln!(f, "  MAPE:  n/a")?,
        }
        writeln!(f, "  MAE:   {:.3}", self.mae)?;
        writeln!(f, "  RMSE:  {:.3}", self.rmse)?;
        writeln!(f, "  Bias:  {:+.3}", self.bias)?;
        write!(
            f,
            "  periods: {} ({} excluded from MAPE)",
            self.periods, self.mape_excluded
        )
    }
}

/// Running sums for one shard of a paired series.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct AccuracyAccumulator {
    count: usize,
    sum_abs_error: f64,
    sum_sq_error: f64,
    sum_error: f64,
    sum_abs_pct_error: f64,
    pct_count: usize,
    zero_actuals: usize,
}

impl AccuracyAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, actual: f64, forecast: f64) {
        let error = forecast - actual;
        self.count += 1;
        self.sum_abs_error += error.abs();
        self.sum_sq_error += error * error;
        self.sum_error += error;
        if actual == 0.0 {
            self.zero_actuals += 1;
        } else {
            self.sum_abs_pct_error += (error / actual).abs() * 100.0;
            self.pct_count += 1;
        }
    }

    /// Combine another shard's sums into this one.
    pub fn merge(&mut self, other: &AccuracyAccumulator) {
        self.count += other.count;
        self.sum_abs_error += other.sum_abs_error;
        self.sum_sq_error += other.sum_sq_error;
        self.sum_error += other.sum_error;
        self.sum_abs_pct_error += other.sum_abs_pct_error;
        self.pct_count += other.pct_count;
        self.zero_actuals += other.zero_actuals;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn finish(&self) -> StaffingResult<AccuracyReport> {
        if self.count == 0 {
            return Err(StaffingError::EmptySeries);
        }
        let n = self.count as f64;
        let mape = (self.pct_count > 0).then(|| self.sum_abs_pct_error / self.pct_count as f64);

        if self.zero_actuals > 0 {
            log::warn!(
                "{} of {} periods had zero actuals and were excluded from MAPE",
                self.zero_actuals,
                self.count
            );
        }

        Ok(AccuracyReport {
            mape,
            mae: self.sum_abs_error / n,
            rmse: (self.sum_sq_error / n).sqrt(),
            bias: self.sum_error / n,
            periods: self.count,
            mape_excluded: self.zero_actuals,
        })
    }
}

/// Scores forecasts against actuals. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccuracyScorer;

impl AccuracyScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, actual: &[f64], forecast: &[f64]) -> StaffingResult<AccuracyReport> {
        self.accumulate(actual, forecast)?.finish()
    }

    /// Validate one shard and return its raw sums, ready to merge.
    pub fn accumulate(
        &self,
        actual: &[f64],
        forecast: &[f64],
    ) -> StaffingResult<AccuracyAccumulator> {
        if actual.len() != forecast.len() {
            return Err(StaffingError::LengthMismatch {
                actual: actual.len(),
                forecast: forecast.len(),
            });
        }
        if actual.is_empty() {
            return Err(StaffingError::EmptySeries);
        }

        let mut acc = AccuracyAccumulator::new();
        for (index, (&a, &f)) in actual.iter().zip(forecast).enumerate() {
            if !a.is_finite() {
                return Err(StaffingError::NonFinite {
                    series: "actual",
                    index,
                });
            }
            if !f.is_finite() {
                return Err(StaffingError::NonFinite {
                    series: "forecast",
                    index,
                });
            }
            acc.push(a, f);
        }
        Ok(acc)
    }
}

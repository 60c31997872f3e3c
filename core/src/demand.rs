//! Forecast interval demand and the traffic it offers.

use crate::{
    error::{StaffingError, StaffingResult},
    types::{Erlangs, Seconds},
};
use serde::{Deserialize, Serialize};

/// One forecast interval. Immutable once constructed; deserialized
/// values go through the same checks as `new`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawIntervalDemand")]
pub struct IntervalDemand {
    offered_calls: f64,
    aht_seconds: Seconds,
    interval_seconds: Seconds,
}

impl IntervalDemand {
    pub fn new(
        offered_calls: f64,
        aht_seconds: Seconds,
        interval_seconds: Seconds,
    ) -> StaffingResult<Self> {
        if !offered_calls.is_finite() || offered_calls < 0.0 {
            return Err(StaffingError::InvalidInput {
                field: "offered calls",
                value: offered_calls,
            });
        }
        if !aht_seconds.is_finite() || aht_seconds <= 0.0 {
            return Err(StaffingError::InvalidInput {
                field: "average handle time",
                value: aht_seconds,
            });
        }
        if !interval_seconds.is_finite() || interval_seconds <= 0.0 {
            return Err(StaffingError::InvalidInput {
                field: "interval length",
                value: interval_seconds,
            });
        }
        Ok(Self {
            offered_calls,
            aht_seconds,
            interval_seconds,
        })
    }

    pub fn offered_calls(&self) -> f64 {
        self.offered_calls
    }

    pub fn aht_seconds(&self) -> Seconds {
        self.aht_seconds
    }

    pub fn interval_seconds(&self) -> Seconds {
        self.interval_seconds
    }

    /// Traffic intensity A = calls × AHT / interval. Always recomputed.
    pub fn traffic(&self) -> Erlangs {
        traffic_intensity(self.offered_calls, self.aht_seconds, self.interval_seconds)
    }
}

#[derive(Deserialize)]
struct RawIntervalDemand {
    offered_calls: f64,
    aht_seconds: Seconds,
    interval_seconds: Seconds,
}

impl TryFrom<RawIntervalDemand> for IntervalDemand {
    type Error = StaffingError;

    fn try_from(raw: RawIntervalDemand) -> StaffingResult<Self> {
        Self::new(raw.offered_calls, raw.aht_seconds, raw.interval_seconds)
    }
}

pub fn traffic_intensity(offered_calls: f64, aht_seconds: Seconds, interval_seconds: Seconds) -> Erlangs {
    offered_calls * aht_seconds / interval_seconds
}

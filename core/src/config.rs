//! Caller-supplied planning configuration.
//!
//! RULE: The engine never consults a process-wide default.
//! Every calculation receives its shrinkage, service target and
//! interval length explicitly from the caller. `default_test()` exists
//! for tests and the headless runner only.

use crate::{
    error::{StaffingError, StaffingResult},
    types::Seconds,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An "X/Y" service target: fraction `level` of calls answered
/// within `answer_seconds`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ServiceTarget {
    pub level: f64,
    pub answer_seconds: Seconds,
}

impl ServiceTarget {
    pub fn new(level: f64, answer_seconds: Seconds) -> StaffingResult<Self> {
        let target = Self { level, answer_seconds };
        target.validate()?;
        Ok(target)
    }

    pub fn validate(&self) -> StaffingResult<()> {
        // SL = 1 − C·exp(…) only reaches 1 in the limit, so 100% is unreachable.
        if !self.level.is_finite() || !(0.0..1.0).contains(&self.level) {
            return Err(StaffingError::InvalidInput {
                field: "service level target",
                value: self.level,
            });
        }
        // A non-positive threshold is accepted here; the required-agents
        // search bound reports it as NoSolutionFound when it cannot be met.
        if !self.answer_seconds.is_finite() {
            return Err(StaffingError::InvalidInput {
                field: "answer threshold",
                value: self.answer_seconds,
            });
        }
        Ok(())
    }
}

/// Parses the workforce-planning shorthand "80/90".
impl FromStr for ServiceTarget {
    type Err = StaffingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (pct, secs) = s.trim().split_once('/').ok_or_else(|| {
            StaffingError::Other(anyhow::anyhow!("Service target '{s}' is not in X/Y form"))
        })?;
        let pct: f64 = pct.trim().parse().map_err(|e| {
            StaffingError::Other(anyhow::anyhow!("Bad service level in '{s}': {e}"))
        })?;
        let secs: f64 = secs.trim().parse().map_err(|e| {
            StaffingError::Other(anyhow::anyhow!("Bad answer threshold in '{s}': {e}"))
        })?;
        ServiceTarget::new(pct / 100.0, secs)
    }
}

impl fmt::Display for ServiceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.level * 100.0, self.answer_seconds)
    }
}

/// Occupancy thresholds used to flag burnout or idle intervals.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct OccupancyBands {
    pub low: f64,
    pub high: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanningConfig {
    pub shrinkage: f64,
    pub service_target: ServiceTarget,
    pub interval_seconds: Seconds,
    /// Safety factor for the square-root staffing estimate.
    pub k_factor: f64,
    pub occupancy_bands: OccupancyBands,
}

impl PlanningConfig {
    /// Load from a JSON file.
    /// In tests, use PlanningConfig::default_test().
    pub fn load(path: &str) -> StaffingResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> StaffingResult<Self> {
        let config: PlanningConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> StaffingResult<()> {
        if !self.shrinkage.is_finite() || !(0.0..1.0).contains(&self.shrinkage) {
            return Err(StaffingError::InvalidShrinkage {
                shrinkage: self.shrinkage,
            });
        }
        self.service_target.validate()?;
        if !self.interval_seconds.is_finite() || self.interval_seconds <= 0.0 {
            return Err(StaffingError::InvalidInput {
                field: "interval length",
                value: self.interval_seconds,
            });
        }
        if !self.k_factor.is_finite() || self.k_factor < 0.0 {
            return Err(StaffingError::InvalidInput {
                field: "k factor",
                value: self.k_factor,
            });
        }
        let bands = self.occupancy_bands;
        if !(0.0..=1.0).contains(&bands.low) || !(bands.low..=1.0).contains(&bands.high) {
            return Err(StaffingError::InvalidInput {
                field: "occupancy bands",
                value: bands.high,
            });
        }
        Ok(())
    }

    /// Config with the conventional contact-centre values:
    /// 25% shrinkage, 80/90 target, 15-minute intervals, K = 1.6,
    /// healthy occupancy between 70% and 85%.
    pub fn default_test() -> Self {
        Self {
            shrinkage: 0.25,
            service_target: ServiceTarget {
                level: 0.80,
                answer_seconds: 90.0,
            },
            interval_seconds: 900.0,
            k_factor: 1.6,
            occupancy_bands: OccupancyBands {
                low: 0.70,
                high: 0.85,
            },
        }
    }
}

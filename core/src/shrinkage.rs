//! Shrinkage adjustment: scheduled agents → net agents on the phones.
//!
//! Net agents are reported to one decimal place, rounded half away
//! from zero. Downstream Erlang computation works on that rounded
//! value, so the rounding policy is part of the contract.

use crate::{
    error::{StaffingError, StaffingResult},
    types::Agents,
};
use serde::{Deserialize, Serialize};

/// A scheduled headcount and the fraction of it lost to shrinkage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StaffingInput {
    pub scheduled_agents: Agents,
    pub shrinkage: f64,
}

impl StaffingInput {
    pub fn new(scheduled_agents: Agents, shrinkage: f64) -> StaffingResult<Self> {
        let input = Self {
            scheduled_agents,
            shrinkage,
        };
        input.net_agents()?;
        Ok(input)
    }

    pub fn net_agents(&self) -> StaffingResult<Agents> {
        net_agents(self.scheduled_agents, self.shrinkage)
    }
}

/// Net agents = scheduled × (1 − shrinkage), rounded to 0.1.
pub fn net_agents(scheduled: Agents, shrinkage: f64) -> StaffingResult<Agents> {
    if !shrinkage.is_finite() || !(0.0..1.0).contains(&shrinkage) {
        return Err(StaffingError::InvalidShrinkage { shrinkage });
    }
    if !scheduled.is_finite() || scheduled < 0.0 {
        return Err(StaffingError::InvalidInput {
            field: "scheduled agents",
            value: scheduled,
        });
    }
    Ok(round_to(scheduled * (1.0 - shrinkage), 1))
}

/// Round half away from zero at `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_to(2.25, 1), 2.3);
        assert_eq!(round_to(-2.25, 1), -2.3);
        assert_eq!(round_to(7.44, 1), 7.4);
    }
}

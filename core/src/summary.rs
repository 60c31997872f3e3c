//! Schedule-level dashboard over a run of evaluated intervals.
//!
//! Averages cover staffed intervals only. An understaffed interval has
//! no service level to average; it is counted instead, and always
//! counts as below target.

use crate::{
    config::{OccupancyBands, PlanningConfig},
    erlang::IntervalOutcome,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OccupancyBand {
    Low,
    Healthy,
    High,
}

impl OccupancyBand {
    pub fn classify(occupancy: f64, bands: &OccupancyBands) -> Self {
        if occupancy > bands.high {
            Self::High
        } else if occupancy < bands.low {
            Self::Low
        } else {
            Self::Healthy
        }
    }
}

/// Band per interval; `None` for understaffed intervals.
pub fn occupancy_bands(outcomes: &[IntervalOutcome], bands: &OccupancyBands) -> Vec<Option<OccupancyBand>> {
    outcomes
        .iter()
        .map(|o| o.metrics().map(|m| OccupancyBand::classify(m.occupancy, bands)))
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StaffingSummary {
    pub intervals: usize,
    pub staffed_intervals: usize,
    pub understaffed_intervals: usize,
    pub below_target_intervals: usize,
    pub high_occupancy_intervals: usize,
    pub low_occupancy_intervals: usize,
    pub average_service_level: Option<f64>,
    pub average_asa_seconds: Option<f64>,
    pub average_occupancy: Option<f64>,
    /// Sum of net − required over staffed intervals. Positive = overstaffed.
    pub total_staffing_gap: f64,
    /// Understaffed intervals whose target no agent count up to the
    /// search bound can meet. Left out of the peak and the hours.
    pub unsolved_intervals: usize,
    pub peak_required_agents: u32,
    pub required_agent_hours: f64,
}

impl StaffingSummary {
    pub fn from_outcomes(outcomes: &[IntervalOutcome], config: &PlanningConfig) -> Self {
        let staffed: Vec<_> = outcomes.iter().filter_map(|o| o.metrics()).collect();
        let understaffed_intervals = outcomes.len() - staffed.len();

        let below_target_staffed = staffed
            .iter()
            .filter(|m| m.service_level < config.service_target.level)
            .count();

        let bands: Vec<OccupancyBand> = staffed
            .iter()
            .map(|m| OccupancyBand::classify(m.occupancy, &config.occupancy_bands))
            .collect();

        let required_total: u64 = outcomes
            .iter()
            .filter_map(IntervalOutcome::required_agents)
            .map(u64::from)
            .sum();

        Self {
            intervals: outcomes.len(),
            staffed_intervals: staffed.len(),
            understaffed_intervals,
            below_target_intervals: below_target_staffed + understaffed_intervals,
            high_occupancy_intervals: bands.iter().filter(|b| **b == OccupancyBand::High).count(),
            low_occupancy_intervals: bands.iter().filter(|b| **b == OccupancyBand::Low).count(),
            average_service_level: mean(staffed.iter().map(|m| m.service_level)),
            average_asa_seconds: mean(staffed.iter().map(|m| m.asa_seconds)),
            average_occupancy: mean(staffed.iter().map(|m| m.occupancy)),
            total_staffing_gap: staffed.iter().map(|m| m.staffing_gap).sum(),
            unsolved_intervals: outcomes
                .iter()
                .filter(|o| o.required_agents().is_none())
                .count(),
            peak_required_agents: outcomes
                .iter()
                .filter_map(IntervalOutcome::required_agents)
                .max()
                .unwrap_or(0),
            required_agent_hours: required_total as f64 * config.interval_seconds / 3600.0,
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

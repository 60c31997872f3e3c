//! Staffing core: turns forecast call volume, handle time and scheduled
//! headcount into achievable service metrics, and scores the forecasts
//! that drive them.
//!
//! Components (all stateless, all pure):
//!   - `shrinkage`: scheduled agents → net agents
//!   - `erlang`:    Erlang C service level, ASA, occupancy, required agents
//!   - `accuracy`:  MAPE / MAE / RMSE / bias over actual vs forecast
//!   - `forecast`:  seasonal and exponential-smoothing volume forecasters
//!   - `summary`:   schedule-level dashboard over evaluated intervals

pub mod accuracy;
pub mod config;
pub mod demand;
pub mod erlang;
pub mod error;
pub mod forecast;
pub mod shrinkage;
pub mod summary;
pub mod types;

pub use crate::accuracy::{AccuracyAccumulator, AccuracyGrade, AccuracyReport, AccuracyScorer};
pub use crate::config::{OccupancyBands, PlanningConfig, ServiceTarget};
pub use crate::demand::IntervalDemand;
pub use crate::erlang::{ErlangEngine, IntervalOutcome, ServiceMetrics};
pub use crate::error::{StaffingError, StaffingResult};
pub use crate::shrinkage::StaffingInput;

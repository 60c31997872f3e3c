use thiserror::Error;

#[derive(Error, Debug)]
pub enum StaffingError {
    #[error("Invalid shrinkage {shrinkage}: must be in [0, 1)")]
    InvalidShrinkage { shrinkage: f64 },

    #[error("Understaffed: {agents} agents cannot carry {traffic:.2} Erlangs")]
    Understaffed { traffic: f64, agents: f64 },

    #[error("No agent count up to {bound} reaches service level {target} for {traffic:.2} Erlangs")]
    NoSolutionFound { traffic: f64, target: f64, bound: u32 },

    #[error("Series length mismatch: {actual} actuals vs {forecast} forecasts")]
    LengthMismatch { actual: usize, forecast: usize },

    #[error("Empty series: no observations to score")]
    EmptySeries,

    #[error("Non-finite value in {series} series at index {index}")]
    NonFinite { series: &'static str, index: usize },

    #[error("Invalid {field}: {value}")]
    InvalidInput { field: &'static str, value: f64 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StaffingResult<T> = Result<T, StaffingError>;

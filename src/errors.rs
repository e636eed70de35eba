use thiserror::Error;

#[derive(Debug, Error)]
pub enum PredictorError {
    #[error("Prediction request was considered invalid due to error: {0}")]
    InvalidInput(#[from] InvalidInputError),
    #[error("Configuration could not be used: {0}")]
    InvalidConfig(String),
    #[error("Error reading or writing prediction data: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Raised before any computation happens when a prediction input is outside its domain.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum InvalidInputError {
    #[error("Insulation rating must be between 1 and 10 inclusive (got {rating})")]
    InsulationRatingOutOfRange { rating: f64 },
    #[error("Floor area must be greater than zero (got {area} m²)")]
    NonPositiveArea { area: f64 },
    #[error("Time period must be greater than zero (got {hours} hours)")]
    NonPositiveDuration { hours: f64 },
    #[error("Value for {field} must be a finite number")]
    NonFinite { field: &'static str },
}

/// The percentage error of a prediction cannot be computed against the supplied actual value.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum UndefinedEvaluationError {
    #[error("Actual usage of 0 kWh makes the percentage error undefined")]
    ZeroActual,
    #[error("Actual usage cannot be negative (got {actual} kWh)")]
    NegativeActual { actual: f64 },
    #[error("Actual usage must be a finite number")]
    NonFiniteActual,
    #[error("Predicted usage must be a finite number")]
    NonFinitePrediction,
}

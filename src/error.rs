//! Error types for Synheart Cortisol

use thiserror::Error;

/// Reasons an override submission is rejected.
///
/// These are always recoverable and carry a human-readable reason that is safe
/// to show to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Malformed override payload: {0}")]
    MalformedPayload(String),

    #[error("Missing cortisol value")]
    MissingValue,

    #[error("Cortisol value must be numeric, got {0}")]
    NonNumeric(String),

    #[error("Cortisol value {0} is outside the accepted range of 0-50 ng/mL")]
    OutOfRange(f64),
}

/// Errors that can occur while operating the sensor core
#[derive(Debug, Error)]
pub enum SensorError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Message shown to callers for anything that is not a validation failure
pub const GENERIC_FAILURE_MESSAGE: &str = "An unexpected error occurred";

impl SensorError {
    /// Whether this error is a rejected override value or payload
    pub fn is_validation(&self) -> bool {
        matches!(self, SensorError::Validation(_))
    }

    /// Caller-facing message.
    ///
    /// Validation failures keep their reason; every other failure collapses to
    /// a generic message so internals never leak across the boundary.
    pub fn public_message(&self) -> String {
        match self {
            SensorError::Validation(e) => e.to_string(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

//! Domain error types.
//!
//! These errors represent invalid inputs to the route estimator. They are
//! distinct from backend/IO errors.

/// Errors raised by the route estimator and the value types it consumes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EstimateError {
    /// A coordinate, distance or duration is non-finite or out of range
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The estimator was configured with an unusable parameter
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl EstimateError {
    pub(crate) fn input(message: impl Into<String>) -> Self {
        EstimateError::InvalidInput(message.into())
    }

    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        EstimateError::InvalidConfiguration(message.into())
    }
}

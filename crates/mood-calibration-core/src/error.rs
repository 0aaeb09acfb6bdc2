//! Error types for mood-calibration-core.

use thiserror::Error;
use uuid::Uuid;

use crate::types::AdjustmentStatus;

/// Top-level error type for mood-calibration-core.
///
/// Store failures during apply/revert are not represented here: they are
/// absorbed into adjustment outcomes. These variants are contract violations,
/// malformed input and configuration problems.
#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error("Invalid transition for adjustment {id}: expected {expected}, found {actual}")]
    InvalidTransition {
        id: Uuid,
        expected: AdjustmentStatus,
        actual: AdjustmentStatus,
    },

    #[error("Adjustment not active: {id}")]
    NotActive { id: Uuid },

    #[error("Validation error: {field} - {message}")]
    ValidationError { field: String, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl CalibrationError {
    /// Build a `ValidationError` for a named field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for CalibrationError {
    fn from(err: serde_json::Error) -> Self {
        CalibrationError::SerializationError(err.to_string())
    }
}

impl From<config::ConfigError> for CalibrationError {
    fn from(err: config::ConfigError) -> Self {
        CalibrationError::ConfigError(err.to_string())
    }
}

/// Result type alias for calibration operations.
pub type CalibrationResult<T> = Result<T, CalibrationError>;

//! Result types for the parameter applier.

use thiserror::Error;

use crate::traits::StoreError;
use crate::types::CalibrationAdjustment;

/// Why an application (or revert) did not commit.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ApplyFailure {
    /// The store refused the write.
    #[error("application failure: {0}")]
    Failure(StoreError),

    /// The live value moved away from the one the adjustment was proposed against.
    #[error("stale adjustment: {parameter} proposed against {expected:.4}, live value is {actual:.4}")]
    Stale {
        parameter: String,
        expected: f32,
        actual: f32,
    },

    /// Unexpected error: store unreachable, missing audit record, panic.
    #[error("application fault: {0}")]
    Fault(String),
}

impl From<StoreError> for ApplyFailure {
    fn from(err: StoreError) -> Self {
        if err.is_rejection() {
            ApplyFailure::Failure(err)
        } else {
            ApplyFailure::Fault(err.to_string())
        }
    }
}

impl ApplyFailure {
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Fault(_))
    }
}

/// Partition of a batch into applied and rejected adjustments, input order kept.
#[derive(Clone, Debug, Default)]
pub struct ApplicationReport {
    pub applied: Vec<CalibrationAdjustment>,
    pub rejected: Vec<CalibrationAdjustment>,
}

impl ApplicationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> usize {
        self.applied.len() + self.rejected.len()
    }

    pub fn all_applied(&self) -> bool {
        self.rejected.is_empty()
    }
}

//! Report types for the calibration manager.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::CalibrationAdjustment;

/// Outcome of `run_calibration_session`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SessionReport {
    /// Study the session was generated from
    pub study_id: Uuid,
    /// Number of adjustments generated after truncation
    pub generated: usize,
    /// Adjustments awaiting a human gate (auto-apply disabled)
    pub pending: Vec<CalibrationAdjustment>,
    pub applied: Vec<CalibrationAdjustment>,
    pub rejected: Vec<CalibrationAdjustment>,
    /// Advisory: study confidence `1 - p` fell below `confidence_threshold`
    pub below_confidence_threshold: bool,
}

impl SessionReport {
    /// Nothing was generated, or nothing was applied when auto-apply ran.
    pub fn is_quiet(&self) -> bool {
        self.generated == 0 || (self.pending.is_empty() && self.applied.is_empty())
    }
}

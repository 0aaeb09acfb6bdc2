//! Bias correction factor curve.

use crate::types::BiasSeverity;

/// Log-scale growth per affected sample.
pub const SAMPLE_SCALE: f32 = 0.05;

/// Base multiplier for a severity level.
pub fn severity_multiplier(severity: BiasSeverity) -> f32 {
    match severity {
        BiasSeverity::Low => 1.05,
        BiasSeverity::Medium => 1.1,
        BiasSeverity::High => 1.2,
    }
}

/// Correction factor for a bias of `severity` seen in `affected_samples` samples.
///
/// `multiplier(severity) * (1 + SAMPLE_SCALE * ln(1 + n))`: non-decreasing in
/// both severity and sample count, with diminishing returns in the count.
pub fn get_bias_correction_factor(severity: BiasSeverity, affected_samples: usize) -> f32 {
    let sample_scale = 1.0 + SAMPLE_SCALE * (affected_samples as f32).ln_1p();
    severity_multiplier(severity) * sample_scale
}

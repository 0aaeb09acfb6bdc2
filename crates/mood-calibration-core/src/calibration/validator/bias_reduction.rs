//! Composite bias-reduction score between two metric snapshots.

use crate::types::ValidationMetrics;

pub const CORRELATION_WEIGHT: f32 = 0.4;
pub const ERROR_WEIGHT: f32 = 0.4;
pub const AGREEMENT_WEIGHT: f32 = 0.2;

/// Score in [0.0, 1.0] for how much `after` improves on `before`.
///
/// Each component is the improvement normalized by the room that was left:
/// - correlation: `(after - before) / (1 - before)`
/// - error: `(before - after) / before`
/// - agreement: `(after - before) / (100 - before)`
///
/// Regressions contribute zero. The result is strictly positive whenever
/// `after` improves any component, and grows with the size of the improvement.
pub fn calculate_bias_reduction(before: &ValidationMetrics, after: &ValidationMetrics) -> f32 {
    let correlation = normalized_gain(
        after.pearson_correlation - before.pearson_correlation,
        1.0 - before.pearson_correlation,
    );
    let error = normalized_gain(
        before.mean_absolute_error - after.mean_absolute_error,
        before.mean_absolute_error,
    );
    let agreement = normalized_gain(
        after.agreement_percentage - before.agreement_percentage,
        100.0 - before.agreement_percentage,
    );

    (CORRELATION_WEIGHT * correlation + ERROR_WEIGHT * error + AGREEMENT_WEIGHT * agreement)
        .clamp(0.0, 1.0)
}

fn normalized_gain(gain: f32, room: f32) -> f32 {
    if gain <= 0.0 || room <= f32::EPSILON || !gain.is_finite() {
        return 0.0;
    }
    (gain / room).min(1.0)
}

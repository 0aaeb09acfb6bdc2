//! Effectiveness validator service implementation.

use chrono::Utc;
use tracing::debug;

use super::bias_reduction::calculate_bias_reduction;
use crate::config::CalibrationConfig;
use crate::types::{TrendEntry, ValidationMetrics, ValidationOutcome, ValidationResult};

/// Keep/revert decision for one applied adjustment.
#[derive(Clone, Debug, PartialEq)]
pub struct EffectivenessDecision {
    /// Both correlation and accuracy improved
    pub accepted: bool,
    pub outcome: ValidationOutcome,
}

/// Decides whether an applied adjustment helped, from a later study.
#[derive(Clone, Debug)]
pub struct EffectivenessValidator {
    min_improvement_threshold: f32,
}

impl EffectivenessValidator {
    pub fn new() -> Self {
        Self::with_config(&CalibrationConfig::default())
    }

    pub fn with_config(config: &CalibrationConfig) -> Self {
        Self {
            min_improvement_threshold: config.min_improvement_threshold,
        }
    }

    /// Compare `later` against the pre-adjustment `reference` snapshot.
    ///
    /// Accepted iff the correlation delta and the error reduction are both
    /// strictly positive. `meets_min_improvement` additionally reports whether
    /// both cleared the configured minimum.
    pub fn evaluate(
        &self,
        reference: &ValidationMetrics,
        later: &ValidationResult,
    ) -> EffectivenessDecision {
        let after = &later.overall_metrics;
        let correlation_delta = after.pearson_correlation - reference.pearson_correlation;
        let accuracy_delta = reference.mean_absolute_error - after.mean_absolute_error;
        let bias_reduction = calculate_bias_reduction(reference, after);

        let accepted = correlation_delta > 0.0 && accuracy_delta > 0.0;
        let meets_min_improvement = correlation_delta >= self.min_improvement_threshold
            && accuracy_delta >= self.min_improvement_threshold;

        debug!(
            "Study {}: correlation {:+.4}, accuracy {:+.4}, bias reduction {:.4} -> {}",
            later.id,
            correlation_delta,
            accuracy_delta,
            bias_reduction,
            if accepted { "keep" } else { "revert" }
        );

        EffectivenessDecision {
            accepted,
            outcome: ValidationOutcome {
                actual_correlation_delta: correlation_delta,
                actual_bias_reduction: bias_reduction,
                actual_accuracy_delta: accuracy_delta,
                evaluated_at: Utc::now(),
                evaluated_against: later.id,
                meets_min_improvement,
                revert_succeeded: None,
            },
        }
    }

    /// Trend point describing the study an adjustment was validated against.
    pub fn trend_entry(&self, later: &ValidationResult) -> TrendEntry {
        TrendEntry {
            date: Utc::now(),
            correlation_score: later.overall_metrics.pearson_correlation,
            bias_level: later.discrepancy_analysis.bias_pattern.magnitude,
            accuracy_score: later.overall_metrics.agreement_percentage / 100.0,
        }
    }
}

impl Default for EffectivenessValidator {
    fn default() -> Self {
        Self::new()
    }
}

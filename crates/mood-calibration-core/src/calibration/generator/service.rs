//! Adjustment generator service implementation.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::correction::get_bias_correction_factor;
use super::types::{
    correction_parameter_name, target_for_bias_type, OverconfidenceScan,
    HIGH_CONFIDENCE_LEVEL, HIGH_CONFIDENCE_THRESHOLD_PARAM, MAX_CONFIDENCE_THRESHOLD,
    MAX_CORRECTION_FACTOR, MAX_WEIGHT_STEP, SENTIMENT_WEIGHT_PARAM, WEIGHT_STEP_PER_POINT,
};
use crate::config::{CalibrationConfig, ParameterDefaultsConfig};
use crate::types::{
    AdjustmentKind, BiasPattern, BiasTypeEntry, CalibrationAdjustment, ParameterAdjustment,
    PredictedImprovements, SystematicBias, TargetComponent, ValidationMetrics, ValidationResult,
};

/// Service turning a validation study into bounded candidate adjustments.
#[derive(Clone, Debug)]
pub struct AdjustmentGenerator {
    config: CalibrationConfig,
    defaults: ParameterDefaultsConfig,
    /// Last known live values, overriding `defaults`
    observed: HashMap<(TargetComponent, String), f32>,
}

impl AdjustmentGenerator {
    /// Create a generator with default configuration
    pub fn new() -> Self {
        Self::with_config(CalibrationConfig::default(), ParameterDefaultsConfig::default())
    }

    /// Create a generator with custom configuration
    pub fn with_config(config: CalibrationConfig, defaults: ParameterDefaultsConfig) -> Self {
        Self {
            config,
            defaults,
            observed: HashMap::new(),
        }
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Record the live value of a parameter so later proposals start from it.
    pub fn observe_parameter(&mut self, component: TargetComponent, parameter: &str, value: f32) {
        self.observed
            .insert((component, parameter.to_string()), value);
    }

    /// Value the generator assumes `component.parameter` currently holds.
    pub fn current_value(&self, component: TargetComponent, parameter: &str, fallback: f32) -> f32 {
        self.observed
            .get(&(component, parameter.to_string()))
            .copied()
            .unwrap_or(fallback)
    }

    /// Parameters the rules may read for `result`, in rule order.
    ///
    /// Callers with access to the live store use this to refresh observed
    /// values before generating.
    pub fn parameter_keys(&self, result: &ValidationResult) -> Vec<(TargetComponent, String)> {
        let mut keys = Vec::new();
        if result.discrepancy_analysis.systematic_bias != SystematicBias::None {
            keys.push((
                TargetComponent::SentimentAnalysis,
                SENTIMENT_WEIGHT_PARAM.to_string(),
            ));
        }
        if !result.individual_analyses.is_empty() {
            keys.push((
                TargetComponent::ConfidenceCalculator,
                HIGH_CONFIDENCE_THRESHOLD_PARAM.to_string(),
            ));
        }
        for entry in &result.bias_analysis.bias_types {
            keys.push((
                target_for_bias_type(&entry.bias_type),
                correction_parameter_name(&entry.bias_type),
            ));
        }
        keys
    }

    /// Produce pending adjustments for `result`, highest priority first.
    ///
    /// `current` is the live algorithm's measured performance; it bounds the
    /// predicted correlation gain by the remaining headroom.
    ///
    /// Returns an empty list when the study sample is below
    /// `min_validation_sample_size`.
    pub fn generate(
        &self,
        result: &ValidationResult,
        current: &ValidationMetrics,
    ) -> Vec<CalibrationAdjustment> {
        let sample_size = result.overall_metrics.sample_size;
        if sample_size < self.config.min_validation_sample_size {
            warn!(
                "Skipping calibration for study {}: sample size {} below minimum {}",
                result.id, sample_size, self.config.min_validation_sample_size
            );
            return Vec::new();
        }

        let headroom = (1.0 - current.pearson_correlation).clamp(0.0, 1.0);
        let mut candidates = Vec::new();

        if let Some(adjustment) = self.systematic_bias_adjustment(result, headroom) {
            candidates.push(adjustment);
        }

        if let Some(adjustment) = self.overconfidence_adjustment(result, headroom) {
            candidates.push(adjustment);
        }

        for entry in &result.bias_analysis.bias_types {
            if let Some(adjustment) = self.bias_correction_adjustment(result, entry, headroom) {
                candidates.push(adjustment);
            }
        }

        let generated = candidates.len();
        candidates.truncate(self.config.max_calibrations_per_session);
        debug!(
            "Study {}: {} candidate adjustments, {} kept (limit {})",
            result.id,
            generated,
            candidates.len(),
            self.config.max_calibrations_per_session
        );
        candidates
    }

    /// Weight adjustment countering a systematic over- or under-estimation.
    fn systematic_bias_adjustment(
        &self,
        result: &ValidationResult,
        headroom: f32,
    ) -> Option<CalibrationAdjustment> {
        let analysis = &result.discrepancy_analysis;
        let decrease = match analysis.systematic_bias {
            SystematicBias::OverEstimation => true,
            SystematicBias::UnderEstimation => false,
            SystematicBias::None => return None,
        };
        let BiasPattern {
            magnitude,
            consistency,
            ..
        } = analysis.bias_pattern;
        if magnitude <= 0.0 {
            debug!("Systematic bias reported with zero magnitude; no weight change");
            return None;
        }

        let current = self.current_value(
            TargetComponent::SentimentAnalysis,
            SENTIMENT_WEIGHT_PARAM,
            self.defaults.sentiment_weight,
        );
        let step = (magnitude * WEIGHT_STEP_PER_POINT).min(MAX_WEIGHT_STEP);
        let raw = if decrease { current - step } else { current + step };
        let recommended = raw.clamp(
            self.defaults.min_sentiment_weight,
            self.defaults.max_sentiment_weight,
        );

        let moved = if decrease {
            recommended < current
        } else {
            recommended > current
        };
        if !moved {
            debug!(
                "Sentiment weight {:.3} has no room to move; skipping weight adjustment",
                current
            );
            return None;
        }

        let saturation = 1.0 - (-magnitude).exp();
        let predicted = PredictedImprovements {
            correlation_delta: 0.15 * saturation * headroom,
            bias_reduction: 0.6 * saturation * (0.5 + 0.5 * consistency.clamp(0.0, 1.0)),
            accuracy_delta: 0.2 * saturation,
        };
        let direction = if decrease { "over" } else { "under" };

        Some(CalibrationAdjustment::new(
            result.id,
            AdjustmentKind::WeightAdjustment,
            TargetComponent::SentimentAnalysis,
            vec![ParameterAdjustment {
                parameter: SENTIMENT_WEIGHT_PARAM.to_string(),
                current_value: current,
                recommended_value: recommended,
                rationale: format!(
                    "Systematic {}-estimation of {:.2} points (consistency {:.2})",
                    direction, magnitude, consistency
                ),
                expected_impact: format!(
                    "Shift sentiment scores {} by about {:.1}%",
                    if decrease { "down" } else { "up" },
                    (recommended - current).abs() / current.max(f32::EPSILON) * 100.0
                ),
            }],
            predicted,
        ))
    }

    /// Threshold tightening when high-confidence scores miss by a wide margin.
    fn overconfidence_adjustment(
        &self,
        result: &ValidationResult,
        headroom: f32,
    ) -> Option<CalibrationAdjustment> {
        let scan = OverconfidenceScan::scan(&result.individual_analyses);
        if !scan.is_overconfident() {
            return None;
        }
        let share = scan.share();

        let current = self.current_value(
            TargetComponent::ConfidenceCalculator,
            HIGH_CONFIDENCE_THRESHOLD_PARAM,
            self.defaults.high_confidence_threshold,
        );
        let recommended =
            (current.max(HIGH_CONFIDENCE_LEVEL) + 0.05 + 0.1 * share).min(MAX_CONFIDENCE_THRESHOLD);
        if recommended <= current {
            debug!(
                "High-confidence threshold {:.3} already at ceiling; skipping",
                current
            );
            return None;
        }

        Some(CalibrationAdjustment::new(
            result.id,
            AdjustmentKind::ThresholdAdjustment,
            TargetComponent::ConfidenceCalculator,
            vec![ParameterAdjustment {
                parameter: HIGH_CONFIDENCE_THRESHOLD_PARAM.to_string(),
                current_value: current,
                recommended_value: recommended,
                rationale: format!(
                    "{} of {} high-confidence scores missed human ratings by a large margin",
                    scan.overconfident_items, scan.high_confidence_items
                ),
                expected_impact: "Fewer scores reported as high-confidence when uncertain".into(),
            }],
            PredictedImprovements {
                correlation_delta: (0.05 + 0.1 * share) * headroom,
                bias_reduction: 0.1 + 0.2 * share,
                accuracy_delta: 0.05 + 0.1 * share,
            },
        ))
    }

    /// Correction factor for one named bias type.
    fn bias_correction_adjustment(
        &self,
        result: &ValidationResult,
        entry: &BiasTypeEntry,
        headroom: f32,
    ) -> Option<CalibrationAdjustment> {
        let target = target_for_bias_type(&entry.bias_type);
        let parameter = correction_parameter_name(&entry.bias_type);
        let factor = get_bias_correction_factor(entry.severity, entry.affected_samples);
        let current = self.current_value(target, &parameter, self.defaults.correction_factor);
        let recommended = (current * factor).min(MAX_CORRECTION_FACTOR);
        if recommended <= current {
            debug!(
                "{} already at {:.3}; skipping {} correction",
                parameter, current, entry.bias_type
            );
            return None;
        }

        let bias_reduction = (factor - 1.0).min(0.9);
        Some(CalibrationAdjustment::new(
            result.id,
            AdjustmentKind::BiasCorrection,
            target,
            vec![ParameterAdjustment {
                parameter,
                current_value: current,
                recommended_value: recommended,
                rationale: format!(
                    "{} severity {} in {} samples: {}",
                    entry.severity.as_str(),
                    entry.bias_type,
                    entry.affected_samples,
                    entry.rationale
                ),
                expected_impact: format!(
                    "Correction factor x{:.3} on {}",
                    factor,
                    target.as_str()
                ),
            }],
            PredictedImprovements {
                correlation_delta: 0.2 * bias_reduction * headroom,
                bias_reduction,
                accuracy_delta: 0.3 * bias_reduction,
            },
        ))
    }
}

impl Default for AdjustmentGenerator {
    fn default() -> Self {
        Self::new()
    }
}

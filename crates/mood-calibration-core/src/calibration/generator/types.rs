//! Constants and lookup tables for the adjustment generator.

use crate::types::{IndividualAnalysis, TargetComponent};

/// Primary weight of the sentiment-analysis component.
pub const SENTIMENT_WEIGHT_PARAM: &str = "sentiment_weight";

/// Confidence above which the calculator declares a score high-confidence.
pub const HIGH_CONFIDENCE_THRESHOLD_PARAM: &str = "high_confidence_threshold";

/// Algorithmic confidence treated as "high" when scanning individual analyses.
pub const HIGH_CONFIDENCE_LEVEL: f32 = 0.8;

/// Absolute error (score points) treated as a large miss.
pub const LARGE_ERROR_THRESHOLD: f32 = 2.0;

/// Share of high-confidence items that must be large misses to flag overconfidence.
pub const OVERCONFIDENCE_MIN_SHARE: f32 = 0.3;

/// Weight change per score point of systematic bias magnitude.
pub const WEIGHT_STEP_PER_POINT: f32 = 0.1;

/// Largest weight change a single adjustment may make.
pub const MAX_WEIGHT_STEP: f32 = 0.5;

/// Ceiling for the high-confidence threshold.
pub const MAX_CONFIDENCE_THRESHOLD: f32 = 0.95;

/// Ceiling for any bias correction factor.
pub const MAX_CORRECTION_FACTOR: f32 = 3.0;

/// Component responsible for a bias type. Unknown types go to sentiment analysis.
pub fn target_for_bias_type(bias_type: &str) -> TargetComponent {
    match bias_type {
        "emotional_minimization"
        | "sarcasm_detection_failure"
        | "mixed_emotion_oversimplification" => TargetComponent::SentimentAnalysis,
        "repetitive_pattern_blindness" | "defensive_language_blindness" => {
            TargetComponent::PsychologicalIndicators
        }
        _ => TargetComponent::SentimentAnalysis,
    }
}

/// Parameter name for a bias type's correction factor.
pub fn correction_parameter_name(bias_type: &str) -> String {
    format!("{}_correction_factor", bias_type)
}

/// Result of scanning individual analyses for confident misses.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverconfidenceScan {
    pub high_confidence_items: usize,
    pub overconfident_items: usize,
}

impl OverconfidenceScan {
    pub fn scan(analyses: &[IndividualAnalysis]) -> Self {
        let mut scan = Self::default();
        for analysis in analyses {
            if analysis.algorithmic_confidence >= HIGH_CONFIDENCE_LEVEL {
                scan.high_confidence_items += 1;
                if analysis.absolute_error >= LARGE_ERROR_THRESHOLD {
                    scan.overconfident_items += 1;
                }
            }
        }
        scan
    }

    /// Share of high-confidence items that were large misses.
    pub fn share(&self) -> f32 {
        if self.high_confidence_items == 0 {
            return 0.0;
        }
        self.overconfident_items as f32 / self.high_confidence_items as f32
    }

    pub fn is_overconfident(&self) -> bool {
        self.overconfident_items > 0 && self.share() >= OVERCONFIDENCE_MIN_SHARE
    }
}

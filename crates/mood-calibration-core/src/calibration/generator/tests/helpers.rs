//! Shared fixtures for generator tests.

use crate::types::{
    BiasDirection, BiasPattern, BiasSeverity, BiasTypeEntry, IndividualAnalysis, SystematicBias,
    ValidationMetrics, ValidationResult,
};

pub fn metrics_with_sample(sample_size: usize) -> ValidationMetrics {
    ValidationMetrics {
        sample_size,
        ..ValidationMetrics::with_core(0.6, 1.5)
    }
}

pub fn clean_result(sample_size: usize) -> ValidationResult {
    ValidationResult::new(metrics_with_sample(sample_size))
}

pub fn biased_result(bias: SystematicBias, magnitude: f32) -> ValidationResult {
    let direction = match bias {
        SystematicBias::OverEstimation => BiasDirection::Positive,
        SystematicBias::UnderEstimation => BiasDirection::Negative,
        SystematicBias::None => BiasDirection::Neutral,
    };
    clean_result(20).with_systematic_bias(
        bias,
        BiasPattern {
            magnitude,
            consistency: 0.8,
            direction,
        },
    )
}

/// Three confident misses and one confident hit.
pub fn overconfident_analyses() -> Vec<IndividualAnalysis> {
    vec![
        IndividualAnalysis::from_scores("i1", 9.0, 4.0, 0.92, 0.8),
        IndividualAnalysis::from_scores("i2", 8.5, 5.0, 0.88, 0.7),
        IndividualAnalysis::from_scores("i3", 2.0, 6.5, 0.85, 0.9),
        IndividualAnalysis::from_scores("i4", 6.0, 6.2, 0.90, 0.9),
        IndividualAnalysis::from_scores("i5", 5.0, 8.0, 0.40, 0.6),
    ]
}

pub fn three_bias_types() -> Vec<BiasTypeEntry> {
    vec![
        BiasTypeEntry::new(
            "emotional_minimization",
            BiasSeverity::High,
            12,
            "distress scored as mild",
        ),
        BiasTypeEntry::new(
            "repetitive_pattern_blindness",
            BiasSeverity::Medium,
            6,
            "recurring complaints missed",
        ),
        BiasTypeEntry::new(
            "sarcasm_detection_failure",
            BiasSeverity::High,
            15,
            "sarcasm read literally",
        ),
    ]
}

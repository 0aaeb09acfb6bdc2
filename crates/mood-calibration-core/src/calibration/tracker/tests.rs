//! Tests for the performance tracker.

use chrono::Utc;
use uuid::Uuid;

use super::*;
use crate::types::{
    AdjustmentKind, AdjustmentStatus, CalibrationAdjustment, ParameterAdjustment, PredictedImprovements,
    TargetComponent, TrendEntry, ValidationMetrics,
};

fn history_entry(validated: bool) -> CalibrationAdjustment {
    let mut adj = CalibrationAdjustment::new(
        Uuid::new_v4(),
        AdjustmentKind::WeightAdjustment,
        TargetComponent::SentimentAnalysis,
        vec![ParameterAdjustment {
            parameter: "sentiment_weight".into(),
            current_value: 1.0,
            recommended_value: 0.9,
            rationale: String::new(),
            expected_impact: String::new(),
        }],
        PredictedImprovements::default(),
    );
    adj.status = if validated {
        AdjustmentStatus::Validated
    } else {
        AdjustmentStatus::Rejected
    };
    adj
}

fn entry(correlation: f32) -> TrendEntry {
    TrendEntry {
        date: Utc::now(),
        correlation_score: correlation,
        bias_level: 0.5,
        accuracy_score: 0.7,
    }
}

#[test]
fn test_default_baseline() {
    let tracker = PerformanceTracker::new(None);
    assert_eq!(tracker.baseline_metrics(), &ValidationMetrics::default());
    assert_eq!(tracker.current_metrics(), tracker.baseline_metrics());
    assert_eq!(tracker.trend_len(), 0);
}

#[test]
fn test_summary_scenario() {
    let mut tracker = PerformanceTracker::new(Some(ValidationMetrics::with_core(0.6, 1.5)));
    tracker.update_current_metrics(ValidationMetrics::with_core(0.7, 1.3));
    tracker.record_trend(entry(0.7));

    let history = vec![history_entry(true), history_entry(false)];
    let summary = tracker.summary(&history);

    assert_eq!(summary.total_calibrations, 2);
    assert_eq!(summary.successful_calibrations, 1);
    assert!((summary.overall_correlation_improvement - 0.1).abs() < 1e-5);
    assert!((summary.overall_accuracy_improvement - 0.2).abs() < 1e-5);
    assert_eq!(summary.improvement_trend.len(), 1);
    assert!((summary.success_rate() - 0.5).abs() < f32::EPSILON);
    println!("[PASS] test_summary_scenario");
}

#[test]
fn test_trend_is_returned_by_value() {
    let mut tracker = PerformanceTracker::default();
    tracker.record_trend(entry(0.6));

    let mut trend = tracker.improvement_trend();
    trend.push(entry(0.9));
    trend[0].correlation_score = -1.0;

    assert_eq!(tracker.trend_len(), 1);
    assert!((tracker.improvement_trend()[0].correlation_score - 0.6).abs() < f32::EPSILON);

    let mut summary = tracker.summary(&[]);
    summary.improvement_trend.clear();
    assert_eq!(tracker.trend_len(), 1);
}

#[test]
fn test_baseline_is_fixed() {
    let mut tracker = PerformanceTracker::new(Some(ValidationMetrics::with_core(0.4, 2.0)));
    tracker.update_current_metrics(ValidationMetrics::with_core(0.8, 1.0));
    assert!((tracker.baseline_metrics().pearson_correlation - 0.4).abs() < f32::EPSILON);
    assert!((tracker.snapshot().current_metrics.pearson_correlation - 0.8).abs() < f32::EPSILON);
}

#[test]
fn test_empty_history_success_rate() {
    let summary = PerformanceTracker::default().summary(&[]);
    assert_eq!(summary.total_calibrations, 0);
    assert_eq!(summary.success_rate(), 0.0);
}

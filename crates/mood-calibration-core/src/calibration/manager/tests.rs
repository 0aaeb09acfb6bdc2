//! Tests for the calibration manager lifecycle.

use std::sync::Arc;

use super::*;
use crate::calibration::generator::SENTIMENT_WEIGHT_PARAM;
use crate::config::{CalibrationConfig, Config, ParameterDefaultsConfig};
use crate::error::CalibrationError;
use crate::stubs::InMemoryParameterStore;
use crate::traits::StoreError;
use crate::types::{
    AdjustmentKind, AdjustmentStatus, BiasDirection, BiasPattern, BiasSeverity, BiasTypeEntry,
    SignificanceTest, SystematicBias, TargetComponent, ValidationMetrics, ValidationResult,
};

fn metrics(pearson: f32, mae: f32, sample_size: usize) -> ValidationMetrics {
    ValidationMetrics {
        sample_size,
        agreement_percentage: 60.0 + (pearson - 0.6) * 100.0,
        ..ValidationMetrics::with_core(pearson, mae)
    }
}

fn over_estimation_study() -> ValidationResult {
    ValidationResult::new(metrics(0.6, 1.5, 30))
        .with_systematic_bias(
            SystematicBias::OverEstimation,
            BiasPattern {
                magnitude: 1.2,
                consistency: 0.7,
                direction: BiasDirection::Positive,
            },
        )
        .with_bias_types(vec![BiasTypeEntry::new(
            "repetitive_pattern_blindness",
            BiasSeverity::Medium,
            8,
            "recurring themes missed",
        )])
}

fn store() -> Arc<InMemoryParameterStore> {
    Arc::new(InMemoryParameterStore::with_defaults(
        &ParameterDefaultsConfig::default(),
    ))
}

fn manager_with_baseline(
    store: Arc<InMemoryParameterStore>,
) -> CalibrationManager<InMemoryParameterStore> {
    CalibrationManager::with_config(Config::default(), store, Some(metrics(0.6, 1.5, 30)))
        .expect("valid configuration")
}

// === Construction ===

#[test]
fn test_invalid_config_is_rejected() {
    let config = Config {
        calibration: CalibrationConfig {
            max_calibrations_per_session: 0,
            ..CalibrationConfig::default()
        },
        ..Config::default()
    };
    let result = CalibrationManager::with_config(config, store(), None);
    assert!(matches!(result, Err(CalibrationError::ConfigError(_))));
}

#[test]
fn test_default_manager_starts_empty() {
    let manager = CalibrationManager::new(store());
    assert_eq!(manager.active_count(), 0);
    assert_eq!(manager.history_len(), 0);
    assert_eq!(manager.baseline_metrics(), ValidationMetrics::default());
    let summary = manager.get_performance_improvement_summary();
    assert_eq!(summary.total_calibrations, 0);
}

// === Generation ===

#[test]
fn test_malformed_study_is_an_error() {
    let manager = CalibrationManager::new(store());
    let mut study = over_estimation_study();
    study.overall_metrics.pearson_correlation = 2.0;
    assert!(matches!(
        manager.generate_calibration_adjustments(&study),
        Err(CalibrationError::ValidationError { .. })
    ));
}

#[test]
fn test_small_study_is_silent() {
    let manager = CalibrationManager::new(store());
    let study = ValidationResult::new(metrics(0.6, 1.5, 3));
    assert!(manager
        .generate_calibration_adjustments(&study)
        .unwrap()
        .is_empty());
}

// === Application ===

#[tokio::test]
async fn test_apply_populates_active() {
    let store = store();
    let manager = manager_with_baseline(Arc::clone(&store));
    let adjustments = manager
        .generate_calibration_adjustments(&over_estimation_study())
        .unwrap();
    assert_eq!(adjustments.len(), 2);

    let report = manager
        .apply_calibration_adjustments(adjustments)
        .await
        .unwrap();
    assert_eq!(report.applied.len() + report.rejected.len(), 2);
    assert_eq!(manager.active_count(), report.applied.len());
    assert_eq!(report.applied.len(), 2);
    assert!(
        store
            .get(TargetComponent::SentimentAnalysis, SENTIMENT_WEIGHT_PARAM)
            .unwrap()
            < 1.0
    );
    println!("[PASS] test_apply_populates_active");
}

#[tokio::test]
async fn test_failed_application_never_becomes_active() {
    let store = store();
    store.fail_writes_to(
        TargetComponent::SentimentAnalysis,
        SENTIMENT_WEIGHT_PARAM,
        StoreError::Rejected {
            component: TargetComponent::SentimentAnalysis,
            parameter: SENTIMENT_WEIGHT_PARAM.into(),
            reason: "frozen".into(),
        },
    );
    let manager = manager_with_baseline(Arc::clone(&store));
    let adjustments = manager
        .generate_calibration_adjustments(&over_estimation_study())
        .unwrap();
    let report = manager
        .apply_calibration_adjustments(adjustments)
        .await
        .unwrap();

    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].kind, AdjustmentKind::WeightAdjustment);
    assert_eq!(manager.active_count(), 1);
    assert!(manager
        .active_calibrations()
        .iter()
        .all(|a| a.status == AdjustmentStatus::Applied));
    assert_eq!(
        store.get(TargetComponent::SentimentAnalysis, SENTIMENT_WEIGHT_PARAM),
        Some(1.0)
    );
    assert_eq!(manager.history_len(), 0);
}

#[tokio::test]
async fn test_unavailable_store_rejects_everything() {
    let store = store();
    store.set_unavailable(true);
    let manager = manager_with_baseline(Arc::clone(&store));
    let adjustments = manager
        .generate_calibration_adjustments(&over_estimation_study())
        .unwrap();
    let report = manager
        .apply_calibration_adjustments(adjustments)
        .await
        .expect("faults are absorbed");
    assert_eq!(report.applied.len(), 0);
    assert_eq!(report.rejected.len(), 2);
    assert_eq!(manager.active_count(), 0);
}

#[tokio::test]
async fn test_reapplying_applied_adjustment_is_an_error() {
    let manager = manager_with_baseline(store());
    let adjustments = manager
        .generate_calibration_adjustments(&over_estimation_study())
        .unwrap();
    let report = manager
        .apply_calibration_adjustments(adjustments)
        .await
        .unwrap();
    let err = manager
        .apply_calibration_adjustments(report.applied.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, CalibrationError::InvalidTransition { .. }));
    assert_eq!(manager.active_count(), 2);
}

// === Validation ===

#[tokio::test]
async fn test_improved_study_validates() {
    let manager = manager_with_baseline(store());
    let adjustments = manager
        .generate_calibration_adjustments(&over_estimation_study())
        .unwrap();
    let report = manager
        .apply_calibration_adjustments(adjustments)
        .await
        .unwrap();
    let target = report.applied[0].clone();

    let later = ValidationResult::new(metrics(0.7, 1.3, 30));
    let validated = manager
        .validate_calibration_effectiveness(&target, &later)
        .await
        .unwrap();

    assert_eq!(validated.status, AdjustmentStatus::Validated);
    let outcome = validated.outcome.as_ref().unwrap();
    assert!((outcome.actual_correlation_delta - 0.1).abs() < 1e-5);
    assert!((outcome.actual_accuracy_delta - 0.2).abs() < 1e-5);
    assert_eq!(manager.get_performance_improvement_summary().improvement_trend.len(), 1);
    assert_eq!(manager.active_count(), 1);
    assert_eq!(manager.history_len(), 1);
    assert!(manager.active_calibrations().iter().all(|a| a.id != target.id));
    assert_eq!(manager.calibration_history()[0].id, target.id);
    println!("[PASS] test_improved_study_validates");
}

#[tokio::test]
async fn test_worse_study_rejects_and_reverts() {
    let store = store();
    let manager = manager_with_baseline(Arc::clone(&store));
    let adjustments = manager
        .generate_calibration_adjustments(&over_estimation_study())
        .unwrap();
    let report = manager
        .apply_calibration_adjustments(adjustments)
        .await
        .unwrap();
    let weight = report
        .applied
        .iter()
        .find(|a| a.kind == AdjustmentKind::WeightAdjustment)
        .cloned()
        .unwrap();
    assert!(store
        .get(TargetComponent::SentimentAnalysis, SENTIMENT_WEIGHT_PARAM)
        .unwrap()
        < 1.0);

    let later = ValidationResult::new(metrics(0.5, 1.8, 30));
    let rejected = manager
        .validate_calibration_effectiveness(&weight, &later)
        .await
        .unwrap();

    assert_eq!(rejected.status, AdjustmentStatus::Rejected);
    assert_eq!(rejected.outcome.as_ref().unwrap().revert_succeeded, Some(true));
    assert_eq!(
        store.get(TargetComponent::SentimentAnalysis, SENTIMENT_WEIGHT_PARAM),
        Some(1.0)
    );
    assert!(manager
        .get_performance_improvement_summary()
        .improvement_trend
        .is_empty());
    assert_eq!(manager.active_count(), 1);
    assert_eq!(manager.history_len(), 1);
    println!("[PASS] test_worse_study_rejects_and_reverts");
}

#[tokio::test]
async fn test_failed_revert_is_recorded() {
    let store = store();
    let manager = manager_with_baseline(Arc::clone(&store));
    let adjustments = manager
        .generate_calibration_adjustments(&over_estimation_study())
        .unwrap();
    let report = manager
        .apply_calibration_adjustments(adjustments)
        .await
        .unwrap();

    store.set_unavailable(true);
    let later = ValidationResult::new(metrics(0.5, 1.8, 30));
    let rejected = manager
        .validate_calibration_effectiveness(&report.applied[0], &later)
        .await
        .expect("revert failure is absorbed");
    assert_eq!(rejected.status, AdjustmentStatus::Rejected);
    assert_eq!(rejected.outcome.as_ref().unwrap().revert_succeeded, Some(false));
    assert!(rejected
        .rejection_reason
        .as_deref()
        .unwrap()
        .contains("revert failed"));
    assert_eq!(manager.history_len(), 1);
}

#[tokio::test]
async fn test_validating_twice_is_an_error() {
    let manager = manager_with_baseline(store());
    let adjustments = manager
        .generate_calibration_adjustments(&over_estimation_study())
        .unwrap();
    let report = manager
        .apply_calibration_adjustments(adjustments)
        .await
        .unwrap();
    let later = ValidationResult::new(metrics(0.7, 1.3, 30));
    manager
        .validate_calibration_effectiveness(&report.applied[0], &later)
        .await
        .unwrap();

    let err = manager
        .validate_calibration_effectiveness(&report.applied[0], &later)
        .await
        .unwrap_err();
    assert!(matches!(err, CalibrationError::NotActive { .. }));
    assert_eq!(manager.history_len(), 1);
}

#[tokio::test]
async fn test_validating_pending_is_an_error() {
    let manager = manager_with_baseline(store());
    let adjustments = manager
        .generate_calibration_adjustments(&over_estimation_study())
        .unwrap();
    let later = ValidationResult::new(metrics(0.7, 1.3, 30));
    let err = manager
        .validate_calibration_effectiveness(&adjustments[0], &later)
        .await
        .unwrap_err();
    assert!(matches!(err, CalibrationError::InvalidTransition { .. }));
    assert_eq!(manager.history_len(), 0);
}

// === Summary ===

#[tokio::test]
async fn test_summary_after_mixed_cycle() {
    let manager = manager_with_baseline(store());
    let adjustments = manager
        .generate_calibration_adjustments(&over_estimation_study())
        .unwrap();
    let report = manager
        .apply_calibration_adjustments(adjustments)
        .await
        .unwrap();

    let improved = ValidationResult::new(metrics(0.7, 1.3, 30));
    manager
        .validate_calibration_effectiveness(&report.applied[0], &improved)
        .await
        .unwrap();
    manager.update_current_metrics(metrics(0.7, 1.3, 30));

    let worse = ValidationResult::new(metrics(0.65, 1.4, 30));
    manager
        .validate_calibration_effectiveness(&report.applied[1], &worse)
        .await
        .unwrap();

    let summary = manager.get_performance_improvement_summary();
    assert_eq!(summary.total_calibrations, 2);
    assert_eq!(summary.successful_calibrations, 1);
    assert!((summary.overall_correlation_improvement - 0.1).abs() < 1e-5);
    assert!((summary.overall_accuracy_improvement - 0.2).abs() < 1e-5);
    assert_eq!(summary.improvement_trend.len(), 1);
    assert_eq!(manager.active_count(), 0);
    println!("[PASS] test_summary_after_mixed_cycle");
}

// === Sessions ===

#[tokio::test]
async fn test_session_without_auto_apply_returns_pending() {
    let store = store();
    let manager = manager_with_baseline(Arc::clone(&store));
    let report = manager
        .run_calibration_session(&over_estimation_study())
        .await
        .unwrap();
    assert_eq!(report.generated, 2);
    assert_eq!(report.pending.len(), 2);
    assert!(report.applied.is_empty());
    assert!(report
        .pending
        .iter()
        .all(|a| a.status == AdjustmentStatus::Pending));
    assert_eq!(store.write_count(), 0);
    assert_eq!(manager.active_count(), 0);
}

#[tokio::test]
async fn test_session_with_auto_apply() {
    let store = store();
    let config = Config {
        calibration: CalibrationConfig {
            auto_apply_adjustments: true,
            ..CalibrationConfig::default()
        },
        ..Config::default()
    };
    let manager = CalibrationManager::with_config(config, Arc::clone(&store), None).unwrap();
    let report = manager
        .run_calibration_session(&over_estimation_study())
        .await
        .unwrap();
    assert!(report.pending.is_empty());
    assert_eq!(report.applied.len(), 2);
    assert_eq!(manager.active_count(), 2);
    assert!(!report.is_quiet());
}

#[tokio::test]
async fn test_session_flags_low_confidence_study() {
    let manager = manager_with_baseline(store());
    let mut study = over_estimation_study();
    study.overall_metrics.significance = SignificanceTest {
        p_value: 0.4,
        is_significant: false,
        confidence_interval: (0.1, 0.8),
    };
    let report = manager.run_calibration_session(&study).await.unwrap();
    assert!(report.below_confidence_threshold);
    assert_eq!(report.generated, 2);

    let confident = manager
        .run_calibration_session(&over_estimation_study())
        .await
        .unwrap();
    assert!(!confident.below_confidence_threshold);
}

#[tokio::test]
async fn test_rejected_revert_restores_generator_view() {
    let store = store();
    let manager = manager_with_baseline(Arc::clone(&store));
    let adjustments = manager
        .generate_calibration_adjustments(&over_estimation_study())
        .unwrap();
    let report = manager
        .apply_calibration_adjustments(adjustments)
        .await
        .unwrap();

    // While applied, new proposals start from the applied weight
    let applied_weight = report.applied[0].parameters[0].recommended_value;
    let next = manager
        .generate_calibration_adjustments(&over_estimation_study())
        .unwrap();
    assert!((next[0].parameters[0].current_value - applied_weight).abs() < f32::EPSILON);

    let worse = ValidationResult::new(metrics(0.5, 1.8, 30));
    manager
        .validate_calibration_effectiveness(&report.applied[0], &worse)
        .await
        .unwrap();
    let after_revert = manager
        .generate_calibration_adjustments(&over_estimation_study())
        .unwrap();
    assert!((after_revert[0].parameters[0].current_value - 1.0).abs() < f32::EPSILON);
}

// === Live values ===

fn under_estimation_study() -> ValidationResult {
    ValidationResult::new(metrics(0.6, 1.5, 30)).with_systematic_bias(
        SystematicBias::UnderEstimation,
        BiasPattern {
            magnitude: 1.0,
            consistency: 0.8,
            direction: BiasDirection::Negative,
        },
    )
}

#[tokio::test]
async fn test_outdated_proposal_never_moves_live_weight_backwards() {
    let store = store();
    store.set(TargetComponent::SentimentAnalysis, SENTIMENT_WEIGHT_PARAM, 1.5);
    let manager = CalibrationManager::new(Arc::clone(&store));

    // Built from the configured default, not the live 1.5
    let adjustments = manager
        .generate_calibration_adjustments(&under_estimation_study())
        .unwrap();
    assert!((adjustments[0].parameters[0].current_value - 1.0).abs() < f32::EPSILON);

    let report = manager
        .apply_calibration_adjustments(adjustments)
        .await
        .unwrap();
    assert!(report.applied.is_empty());
    assert_eq!(report.rejected.len(), 1);
    assert!(report.rejected[0]
        .rejection_reason
        .as_deref()
        .unwrap()
        .contains("stale"));
    assert_eq!(
        store.get(TargetComponent::SentimentAnalysis, SENTIMENT_WEIGHT_PARAM),
        Some(1.5)
    );
    assert_eq!(manager.active_count(), 0);

    // The rejection taught the generator the live value
    let retry = manager
        .generate_calibration_adjustments(&under_estimation_study())
        .unwrap();
    assert!((retry[0].parameters[0].current_value - 1.5).abs() < f32::EPSILON);
    let report = manager.apply_calibration_adjustments(retry).await.unwrap();
    assert_eq!(report.applied.len(), 1);
    let live = store
        .get(TargetComponent::SentimentAnalysis, SENTIMENT_WEIGHT_PARAM)
        .unwrap();
    assert!((live - 1.6).abs() < 1e-5);
    println!("[PASS] test_outdated_proposal_never_moves_live_weight_backwards");
}

#[tokio::test]
async fn test_session_starts_from_live_values() {
    let store = store();
    store.set(TargetComponent::SentimentAnalysis, SENTIMENT_WEIGHT_PARAM, 1.5);
    let config = Config {
        calibration: CalibrationConfig {
            auto_apply_adjustments: true,
            ..CalibrationConfig::default()
        },
        ..Config::default()
    };
    let manager = CalibrationManager::with_config(config, Arc::clone(&store), None).unwrap();

    let report = manager
        .run_calibration_session(&under_estimation_study())
        .await
        .unwrap();
    assert_eq!(report.applied.len(), 1);
    assert!(report.rejected.is_empty());
    let param = &report.applied[0].parameters[0];
    assert!((param.current_value - 1.5).abs() < f32::EPSILON);
    assert!(param.recommended_value > param.current_value);
    let live = store
        .get(TargetComponent::SentimentAnalysis, SENTIMENT_WEIGHT_PARAM)
        .unwrap();
    assert!((live - 1.6).abs() < 1e-5);
    println!("[PASS] test_session_starts_from_live_values");
}

#[tokio::test]
async fn test_refresh_ignores_unknown_parameters() {
    let store = store();
    let manager = CalibrationManager::new(Arc::clone(&store));
    let study = over_estimation_study();
    manager.refresh_live_values(&study).await;

    let adjustments = manager.generate_calibration_adjustments(&study).unwrap();
    let correction = adjustments
        .iter()
        .find(|a| a.kind == AdjustmentKind::BiasCorrection)
        .unwrap();
    assert!((correction.parameters[0].current_value - 1.0).abs() < f32::EPSILON);
}

//! Calibration manager service implementation.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use super::types::SessionReport;
use crate::calibration::applier::{ApplicationReport, ParameterApplier};
use crate::calibration::generator::AdjustmentGenerator;
use crate::calibration::tracker::{PerformanceSummary, PerformanceTracker};
use crate::calibration::validator::EffectivenessValidator;
use crate::config::{CalibrationConfig, Config};
use crate::error::{CalibrationError, CalibrationResult};
use crate::traits::{ParameterStore, StoreError};
use crate::types::{
    AdjustmentStatus, CalibrationAdjustment, TargetComponent, ValidationMetrics, ValidationResult,
};

/// Closed-loop calibration of one live scoring algorithm.
///
/// # Ownership
///
/// An applied adjustment lives in the active collection until it is validated
/// or rejected, then moves to history exactly once. Adjustments returned to
/// callers are snapshots; the collections hold the authoritative instances.
///
/// # Thread Safety
///
/// Collections sit behind `parking_lot::RwLock` and no guard is held across
/// an `.await`. Readers always receive copies. One manager per live
/// algorithm: the parameter store itself provides no cross-manager locking.
pub struct CalibrationManager<S: ParameterStore + ?Sized> {
    config: CalibrationConfig,
    generator: RwLock<AdjustmentGenerator>,
    applier: ParameterApplier<S>,
    validator: EffectivenessValidator,
    tracker: RwLock<PerformanceTracker>,
    active: RwLock<Vec<CalibrationAdjustment>>,
    history: RwLock<Vec<CalibrationAdjustment>>,
}

impl<S: ParameterStore + ?Sized> CalibrationManager<S> {
    /// Create a manager with default configuration and default baseline metrics.
    pub fn new(store: Arc<S>) -> Self {
        let config = Config::default();
        Self::build(config, store, None)
    }

    /// Create a manager with custom configuration and an optional baseline.
    ///
    /// # Errors
    /// Returns `CalibrationError::ConfigError` if `config` is invalid, or
    /// `ValidationError` if `baseline` is malformed.
    pub fn with_config(
        config: Config,
        store: Arc<S>,
        baseline: Option<ValidationMetrics>,
    ) -> CalibrationResult<Self> {
        config.validate()?;
        if let Some(metrics) = &baseline {
            metrics.validate()?;
        }
        Ok(Self::build(config, store, baseline))
    }

    fn build(config: Config, store: Arc<S>, baseline: Option<ValidationMetrics>) -> Self {
        Self {
            generator: RwLock::new(AdjustmentGenerator::with_config(
                config.calibration.clone(),
                config.parameters.clone(),
            )),
            applier: ParameterApplier::new(store),
            validator: EffectivenessValidator::with_config(&config.calibration),
            tracker: RwLock::new(PerformanceTracker::new(baseline)),
            active: RwLock::new(Vec::new()),
            history: RwLock::new(Vec::new()),
            config: config.calibration,
        }
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        self.applier.store()
    }

    /// Propose adjustments for a study. Empty when the sample is too small.
    ///
    /// Proposals start from the last observed live values. Call
    /// `refresh_live_values` first when the store may have changed outside
    /// this manager.
    ///
    /// # Errors
    /// Returns `CalibrationError::ValidationError` if `result` is malformed.
    pub fn generate_calibration_adjustments(
        &self,
        result: &ValidationResult,
    ) -> CalibrationResult<Vec<CalibrationAdjustment>> {
        result.validate()?;
        let current = self.tracker.read().current_metrics().clone();
        Ok(self.generator.read().generate(result, &current))
    }

    /// Apply pending adjustments; successes become active.
    ///
    /// Store failures and faults never surface as errors: the affected
    /// adjustment is reported in `rejected`.
    ///
    /// # Errors
    /// Returns `CalibrationError::InvalidTransition` if any input is not `pending`.
    pub async fn apply_calibration_adjustments(
        &self,
        adjustments: Vec<CalibrationAdjustment>,
    ) -> CalibrationResult<ApplicationReport> {
        let report = self.applier.apply_batch(adjustments).await?;

        {
            let mut generator = self.generator.write();
            for adjustment in &report.applied {
                for param in &adjustment.parameters {
                    generator.observe_parameter(
                        adjustment.target,
                        &param.parameter,
                        param.recommended_value,
                    );
                }
            }
        }
        self.active.write().extend(report.applied.iter().cloned());

        // A rejection may mean the proposal was built on an outdated value
        let rejected_keys: Vec<(TargetComponent, String)> = report
            .rejected
            .iter()
            .flat_map(|a| a.parameter_keys().map(|(c, p)| (c, p.to_string())))
            .collect();
        self.observe_from_store(rejected_keys).await;

        info!(
            "Applied {} of {} adjustments ({} rejected)",
            report.applied.len(),
            report.total(),
            report.rejected.len()
        );
        Ok(report)
    }

    /// Decide whether an applied adjustment helped, using a later study.
    ///
    /// Improvement keeps the adjustment (`validated`) and appends a trend entry.
    /// Anything else reverts it (`rejected`). Either way it moves from active to
    /// history.
    ///
    /// # Errors
    /// Returns `InvalidTransition` if `adjustment` is not `applied`, `NotActive`
    /// if it is not in the active collection, or `ValidationError` if `later`
    /// is malformed. No state changes on error.
    pub async fn validate_calibration_effectiveness(
        &self,
        adjustment: &CalibrationAdjustment,
        later: &ValidationResult,
    ) -> CalibrationResult<CalibrationAdjustment> {
        adjustment.ensure_status(AdjustmentStatus::Applied)?;
        later.validate()?;

        let mut claimed = {
            let mut active = self.active.write();
            let position = active
                .iter()
                .position(|a| a.id == adjustment.id)
                .ok_or(CalibrationError::NotActive { id: adjustment.id })?;
            active.remove(position)
        };

        let reference = self.tracker.read().current_metrics().clone();
        let decision = self.validator.evaluate(&reference, later);

        if decision.accepted {
            claimed.mark_validated(decision.outcome)?;
            let entry = self.validator.trend_entry(later);
            self.tracker.write().record_trend(entry);
            info!(
                "Validated adjustment {} on {} against study {}",
                claimed.id, claimed.target, later.id
            );
        } else {
            let mut outcome = decision.outcome;
            let revert = self.applier.revert(&claimed).await;
            outcome.revert_succeeded = Some(revert.is_ok());

            let reason = match &revert {
                Ok(()) => {
                    self.observe_previous_values(&claimed);
                    "no measured improvement; reverted".to_string()
                }
                Err(failure) => format!("no measured improvement; revert failed: {}", failure),
            };
            warn!(
                "Rejected adjustment {} on {}: correlation {:+.4}, accuracy {:+.4}",
                claimed.id,
                claimed.target,
                outcome.actual_correlation_delta,
                outcome.actual_accuracy_delta
            );
            claimed.mark_rejected(reason)?;
            claimed.outcome = Some(outcome);
        }

        self.history.write().push(claimed.clone());
        Ok(claimed)
    }

    /// Refresh the generator's view of the parameters `result` may adjust.
    ///
    /// Parameters the store does not know keep their configured defaults.
    /// Other read failures are logged and skipped; a proposal built on an
    /// outdated value is refused as stale when applied.
    pub async fn refresh_live_values(&self, result: &ValidationResult) {
        let keys = self.generator.read().parameter_keys(result);
        self.observe_from_store(keys).await;
    }

    async fn observe_from_store(&self, keys: Vec<(TargetComponent, String)>) {
        for (component, parameter) in keys {
            match self.applier.store().read(component, &parameter).await {
                Ok(value) => {
                    self.generator
                        .write()
                        .observe_parameter(component, &parameter, value);
                }
                Err(StoreError::UnknownParameter { .. }) => {}
                Err(e) => {
                    debug!("Could not refresh {}.{}: {}", component, parameter, e);
                }
            }
        }
    }

    fn observe_previous_values(&self, adjustment: &CalibrationAdjustment) {
        if let Some(record) = &adjustment.application {
            let mut generator = self.generator.write();
            for (name, previous) in &record.previous_values {
                generator.observe_parameter(adjustment.target, name, *previous);
            }
        }
    }

    /// Generate for `result` and, when `auto_apply_adjustments` is set, apply.
    ///
    /// Live values are refreshed from the store before generating.
    ///
    /// Without auto-apply the adjustments are returned as `pending` for a
    /// human gate. The confidence threshold is advisory only.
    pub async fn run_calibration_session(
        &self,
        result: &ValidationResult,
    ) -> CalibrationResult<SessionReport> {
        result.validate()?;
        self.refresh_live_values(result).await;
        let generated = self.generate_calibration_adjustments(result)?;

        let confidence = result.overall_metrics.significance.confidence();
        let below_confidence_threshold = confidence < self.config.confidence_threshold;
        if below_confidence_threshold {
            warn!(
                "Study {} confidence {:.3} below advisory threshold {:.3}",
                result.id, confidence, self.config.confidence_threshold
            );
        }

        let mut report = SessionReport {
            study_id: result.id,
            generated: generated.len(),
            below_confidence_threshold,
            ..SessionReport::default()
        };

        if !self.config.auto_apply_adjustments || generated.is_empty() {
            debug!(
                "Session for study {}: {} adjustments awaiting approval",
                result.id,
                generated.len()
            );
            report.pending = generated;
            return Ok(report);
        }

        let applied = self.apply_calibration_adjustments(generated).await?;
        report.applied = applied.applied;
        report.rejected = applied.rejected;
        Ok(report)
    }

    /// Summary of improvement since the baseline.
    pub fn get_performance_improvement_summary(&self) -> PerformanceSummary {
        let history = self.history.read();
        self.tracker.read().summary(&history)
    }

    /// Record the live algorithm's latest measured performance.
    pub fn update_current_metrics(&self, metrics: ValidationMetrics) {
        self.tracker.write().update_current_metrics(metrics);
    }

    pub fn baseline_metrics(&self) -> ValidationMetrics {
        self.tracker.read().baseline_metrics().clone()
    }

    pub fn current_metrics(&self) -> ValidationMetrics {
        self.tracker.read().current_metrics().clone()
    }

    /// Snapshot of adjustments applied and awaiting validation.
    pub fn active_calibrations(&self) -> Vec<CalibrationAdjustment> {
        self.active.read().clone()
    }

    /// Snapshot of validated and rejected-after-application adjustments.
    pub fn calibration_history(&self) -> Vec<CalibrationAdjustment> {
        self.history.read().clone()
    }

    pub fn active_count(&self) -> usize {
        self.active.read().len()
    }

    pub fn history_len(&self) -> usize {
        self.history.read().len()
    }
}

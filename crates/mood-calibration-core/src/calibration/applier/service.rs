//! Parameter applier service implementation.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use futures::FutureExt;
use tracing::{debug, error, info, warn};

use super::lanes::plan_lanes;
use super::types::{ApplicationReport, ApplyFailure};
use crate::error::CalibrationResult;
use crate::traits::{ParameterStore, StoreError};
use crate::types::{AdjustmentStatus, ApplicationRecord, CalibrationAdjustment, TargetComponent};

/// Largest difference between a proposal's base and the live value still
/// treated as the same value.
pub const STALE_TOLERANCE: f32 = 1e-6;

/// Writes adjustments to a `ParameterStore`, one all-or-nothing unit each.
pub struct ParameterApplier<S: ParameterStore + ?Sized> {
    store: Arc<S>,
}

impl<S: ParameterStore + ?Sized> Clone for ParameterApplier<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: ParameterStore + ?Sized> ParameterApplier<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Commit every parameter of `adjustment` or none of them.
    ///
    /// Previous values are read first and returned in the audit record. An
    /// adjustment whose `current_value` no longer matches the live value is
    /// refused as stale before anything is written. A failed write restores
    /// the parameters already written.
    pub async fn apply(
        &self,
        adjustment: &CalibrationAdjustment,
    ) -> Result<ApplicationRecord, ApplyFailure> {
        match AssertUnwindSafe(self.apply_inner(adjustment))
            .catch_unwind()
            .await
        {
            Ok(outcome) => outcome,
            Err(payload) => {
                let detail = panic_detail(payload.as_ref());
                error!(
                    "Parameter store panicked while applying {}: {}",
                    adjustment.id, detail
                );
                Err(ApplyFailure::Fault(format!("store panicked: {}", detail)))
            }
        }
    }

    async fn apply_inner(
        &self,
        adjustment: &CalibrationAdjustment,
    ) -> Result<ApplicationRecord, ApplyFailure> {
        let target = adjustment.target;

        let mut previous_values = Vec::with_capacity(adjustment.parameters.len());
        for param in &adjustment.parameters {
            let previous = match self.store.read(target, &param.parameter).await {
                Ok(value) => value,
                Err(StoreError::UnknownParameter { .. }) => {
                    debug!(
                        "{}.{} not yet stored; assuming {:.4}",
                        target, param.parameter, param.current_value
                    );
                    param.current_value
                }
                Err(e) => return Err(e.into()),
            };
            if (previous - param.current_value).abs() > STALE_TOLERANCE {
                warn!(
                    "Adjustment {} is stale: {}.{} proposed against {:.4}, live {:.4}",
                    adjustment.id, target, param.parameter, param.current_value, previous
                );
                return Err(ApplyFailure::Stale {
                    parameter: param.parameter.clone(),
                    expected: param.current_value,
                    actual: previous,
                });
            }
            previous_values.push((param.parameter.clone(), previous));
        }

        let mut written: Vec<(String, f32)> = Vec::with_capacity(previous_values.len());
        for (param, (name, previous)) in adjustment.parameters.iter().zip(&previous_values) {
            if let Err(e) = self
                .store
                .write(target, &param.parameter, param.recommended_value)
                .await
            {
                warn!(
                    "Write of {}.{} failed for adjustment {}: {}",
                    target, param.parameter, adjustment.id, e
                );
                self.rollback(target, &written).await;
                return Err(e.into());
            }
            written.push((name.clone(), *previous));
        }

        Ok(ApplicationRecord {
            applied_at: Utc::now(),
            previous_values,
        })
    }

    /// Undo partial writes, newest first. Failures are logged; nothing else can be done.
    async fn rollback(&self, target: TargetComponent, written: &[(String, f32)]) {
        for (name, previous) in written.iter().rev() {
            if let Err(e) = self.store.restore(target, name, *previous).await {
                error!(
                    "Rollback of {}.{} to {:.4} failed: {}",
                    target, name, previous, e
                );
            }
        }
    }

    /// Restore the values recorded when `adjustment` was applied.
    ///
    /// Every parameter is attempted; the first failure is returned.
    pub async fn revert(&self, adjustment: &CalibrationAdjustment) -> Result<(), ApplyFailure> {
        let record = adjustment.application.as_ref().ok_or_else(|| {
            ApplyFailure::Fault(format!(
                "adjustment {} has no application record to revert",
                adjustment.id
            ))
        })?;

        let target = adjustment.target;
        let outcome = AssertUnwindSafe(async {
            let mut first_failure = None;
            for (name, previous) in record.previous_values.iter().rev() {
                if let Err(e) = self.store.restore(target, name, *previous).await {
                    error!("Revert of {}.{} failed: {}", target, name, e);
                    first_failure.get_or_insert(ApplyFailure::from(e));
                }
            }
            first_failure.map_or(Ok(()), Err)
        })
        .catch_unwind()
        .await;

        match outcome {
            Ok(result) => {
                if result.is_ok() {
                    info!("Reverted adjustment {} on {}", adjustment.id, target);
                }
                result
            }
            Err(payload) => {
                let detail = panic_detail(payload.as_ref());
                error!(
                    "Parameter store panicked while reverting {}: {}",
                    adjustment.id, detail
                );
                Err(ApplyFailure::Fault(format!("store panicked: {}", detail)))
            }
        }
    }

    /// Apply a batch, partitioning it into applied and rejected.
    ///
    /// Adjustments touching the same parameter run sequentially in input order;
    /// independent ones run concurrently.
    ///
    /// # Errors
    /// Returns `CalibrationError::InvalidTransition` before any write if an
    /// adjustment is not `pending`.
    pub async fn apply_batch(
        &self,
        adjustments: Vec<CalibrationAdjustment>,
    ) -> CalibrationResult<ApplicationReport> {
        for adjustment in &adjustments {
            adjustment.ensure_status(AdjustmentStatus::Pending)?;
        }

        let lanes = plan_lanes(&adjustments);
        debug!(
            "Applying {} adjustments in {} lanes",
            adjustments.len(),
            lanes.len()
        );

        let mut lane_of = vec![0usize; adjustments.len()];
        for (lane, indices) in lanes.iter().enumerate() {
            for &index in indices {
                lane_of[index] = lane;
            }
        }
        let mut work: Vec<Vec<(usize, CalibrationAdjustment)>> = vec![Vec::new(); lanes.len()];
        for (index, adjustment) in adjustments.into_iter().enumerate() {
            work[lane_of[index]].push((index, adjustment));
        }

        let lane_results = join_all(work.into_iter().map(|lane| async move {
            let mut done = Vec::with_capacity(lane.len());
            for (index, mut adjustment) in lane {
                let applied = match self.apply(&adjustment).await {
                    Ok(record) => {
                        adjustment.mark_applied(record)?;
                        info!(
                            "Applied {:?} adjustment {} to {}",
                            adjustment.kind, adjustment.id, adjustment.target
                        );
                        true
                    }
                    Err(failure) => {
                        warn!("Rejected adjustment {}: {}", adjustment.id, failure);
                        adjustment.mark_rejected(failure.to_string())?;
                        false
                    }
                };
                done.push((index, adjustment, applied));
            }
            CalibrationResult::Ok(done)
        }))
        .await;

        let mut finished = Vec::new();
        for lane in lane_results {
            finished.extend(lane?);
        }
        finished.sort_by_key(|(index, _, _)| *index);

        let mut report = ApplicationReport::new();
        for (_, adjustment, applied) in finished {
            if applied {
                report.applied.push(adjustment);
            } else {
                report.rejected.push(adjustment);
            }
        }
        Ok(report)
    }
}

fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

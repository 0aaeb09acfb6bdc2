//! Performance tracker service implementation.

use serde::{Deserialize, Serialize};

use crate::types::{
    AdjustmentStatus, CalibrationAdjustment, PerformanceTracking, TrendEntry, ValidationMetrics,
};

/// Summary of calibration effectiveness since the baseline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    /// Adjustments that reached history (validated or rejected after application)
    pub total_calibrations: usize,
    pub successful_calibrations: usize,
    /// current - baseline Pearson correlation
    pub overall_correlation_improvement: f32,
    /// baseline - current mean absolute error
    pub overall_accuracy_improvement: f32,
    pub improvement_trend: Vec<TrendEntry>,
}

impl PerformanceSummary {
    /// Fraction of history entries that were validated; 0.0 with no history.
    pub fn success_rate(&self) -> f32 {
        if self.total_calibrations == 0 {
            return 0.0;
        }
        self.successful_calibrations as f32 / self.total_calibrations as f32
    }
}

/// Holds baseline/current snapshots and the append-only improvement trend.
#[derive(Clone, Debug, Default)]
pub struct PerformanceTracker {
    tracking: PerformanceTracking,
}

impl PerformanceTracker {
    /// Track from `baseline`, or from default metrics when none is supplied.
    pub fn new(baseline: Option<ValidationMetrics>) -> Self {
        Self {
            tracking: PerformanceTracking::new(baseline.unwrap_or_default()),
        }
    }

    pub fn baseline_metrics(&self) -> &ValidationMetrics {
        &self.tracking.baseline_metrics
    }

    pub fn current_metrics(&self) -> &ValidationMetrics {
        &self.tracking.current_metrics
    }

    /// Replace the live algorithm's measured performance.
    pub fn update_current_metrics(&mut self, metrics: ValidationMetrics) {
        self.tracking.current_metrics = metrics;
    }

    pub fn record_trend(&mut self, entry: TrendEntry) {
        self.tracking.improvement_trend.push(entry);
    }

    pub fn trend_len(&self) -> usize {
        self.tracking.improvement_trend.len()
    }

    /// Copy of the trend; the tracker's own sequence is unaffected by changes to it.
    pub fn improvement_trend(&self) -> Vec<TrendEntry> {
        self.tracking.improvement_trend.clone()
    }

    /// Copy of the full tracking state.
    pub fn snapshot(&self) -> PerformanceTracking {
        self.tracking.clone()
    }

    /// Summarize against the calibration `history`.
    pub fn summary(&self, history: &[CalibrationAdjustment]) -> PerformanceSummary {
        let baseline = &self.tracking.baseline_metrics;
        let current = &self.tracking.current_metrics;
        PerformanceSummary {
            total_calibrations: history.len(),
            successful_calibrations: history
                .iter()
                .filter(|a| a.status == AdjustmentStatus::Validated)
                .count(),
            overall_correlation_improvement: current.pearson_correlation
                - baseline.pearson_correlation,
            overall_accuracy_improvement: baseline.mean_absolute_error
                - current.mean_absolute_error,
            improvement_trend: self.improvement_trend(),
        }
    }
}

//! Longitudinal performance state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::metrics::ValidationMetrics;

/// One point of the improvement trend, appended per validated adjustment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendEntry {
    pub date: DateTime<Utc>,
    pub correlation_score: f32,
    pub bias_level: f32,
    pub accuracy_score: f32,
}

/// Baseline and current snapshots plus the append-only trend.
///
/// `baseline_metrics` is the fixed reference for the long-run summary.
/// `current_metrics` is the reference point for individual validation decisions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerformanceTracking {
    pub baseline_metrics: ValidationMetrics,
    pub current_metrics: ValidationMetrics,
    pub improvement_trend: Vec<TrendEntry>,
}

impl PerformanceTracking {
    /// Start tracking from `baseline`; current starts equal to it.
    pub fn new(baseline: ValidationMetrics) -> Self {
        Self {
            current_metrics: baseline.clone(),
            baseline_metrics: baseline,
            improvement_trend: Vec::new(),
        }
    }
}

impl Default for PerformanceTracking {
    fn default() -> Self {
        Self::new(ValidationMetrics::default())
    }
}

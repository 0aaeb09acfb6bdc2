//! Statistical snapshot of algorithm-vs-human agreement.

use serde::{Deserialize, Serialize};

use crate::error::{CalibrationError, CalibrationResult};

/// Ordered concordance category between algorithmic and human scores.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcordanceLevel {
    Low,
    #[default]
    Moderate,
    High,
}

/// Outcome of the significance test run by the validation study.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignificanceTest {
    /// p-value of the correlation test
    pub p_value: f32,
    /// Whether the study considered the result significant
    pub is_significant: bool,
    /// Confidence interval `[lo, hi]` around the correlation
    pub confidence_interval: (f32, f32),
}

impl Default for SignificanceTest {
    fn default() -> Self {
        Self {
            p_value: 0.05,
            is_significant: false,
            confidence_interval: (0.3, 0.7),
        }
    }
}

impl SignificanceTest {
    /// Confidence carried by the test, `1 - p`.
    pub fn confidence(&self) -> f32 {
        (1.0 - self.p_value).clamp(0.0, 1.0)
    }
}

/// Immutable statistical snapshot of one validation study.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationMetrics {
    /// Pearson correlation [-1.0, 1.0]
    pub pearson_correlation: f32,
    /// Spearman rank correlation [-1.0, 1.0]
    pub spearman_correlation: f32,
    /// Mean absolute error (>= 0)
    pub mean_absolute_error: f32,
    /// Root mean square error (>= 0)
    pub root_mean_square_error: f32,
    /// Agreement percentage [0.0, 100.0]
    pub agreement_percentage: f32,
    pub concordance_level: ConcordanceLevel,
    pub significance: SignificanceTest,
    /// Number of scored samples (> 0)
    pub sample_size: usize,
}

impl Default for ValidationMetrics {
    /// Reference point used when no baseline study has been supplied.
    fn default() -> Self {
        Self {
            pearson_correlation: 0.5,
            spearman_correlation: 0.5,
            mean_absolute_error: 2.0,
            root_mean_square_error: 2.5,
            agreement_percentage: 60.0,
            concordance_level: ConcordanceLevel::Moderate,
            significance: SignificanceTest::default(),
            sample_size: 1,
        }
    }
}

impl ValidationMetrics {
    /// Snapshot with the two headline measures set and everything else defaulted.
    pub fn with_core(pearson_correlation: f32, mean_absolute_error: f32) -> Self {
        Self {
            pearson_correlation,
            spearman_correlation: pearson_correlation,
            mean_absolute_error,
            root_mean_square_error: mean_absolute_error * 1.25,
            ..Self::default()
        }
    }

    /// Check the documented ranges.
    ///
    /// # Errors
    /// Returns `CalibrationError::ValidationError` naming the first offending field.
    pub fn validate(&self) -> CalibrationResult<()> {
        check_correlation("pearson_correlation", self.pearson_correlation)?;
        check_correlation("spearman_correlation", self.spearman_correlation)?;
        check_non_negative("mean_absolute_error", self.mean_absolute_error)?;
        check_non_negative("root_mean_square_error", self.root_mean_square_error)?;
        if !(0.0..=100.0).contains(&self.agreement_percentage) {
            return Err(CalibrationError::validation(
                "agreement_percentage",
                format!("{} outside [0, 100]", self.agreement_percentage),
            ));
        }
        if !(0.0..=1.0).contains(&self.significance.p_value) {
            return Err(CalibrationError::validation(
                "significance.p_value",
                format!("{} outside [0, 1]", self.significance.p_value),
            ));
        }
        let (lo, hi) = self.significance.confidence_interval;
        if lo > hi {
            return Err(CalibrationError::validation(
                "significance.confidence_interval",
                format!("lower bound {} exceeds upper bound {}", lo, hi),
            ));
        }
        if self.sample_size == 0 {
            return Err(CalibrationError::validation(
                "sample_size",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}

fn check_correlation(field: &str, value: f32) -> CalibrationResult<()> {
    if value.is_nan() || !(-1.0..=1.0).contains(&value) {
        return Err(CalibrationError::validation(
            field,
            format!("{} outside [-1, 1]", value),
        ));
    }
    Ok(())
}

fn check_non_negative(field: &str, value: f32) -> CalibrationResult<()> {
    if value.is_nan() || value < 0.0 {
        return Err(CalibrationError::validation(
            field,
            format!("{} must be non-negative", value),
        ));
    }
    Ok(())
}

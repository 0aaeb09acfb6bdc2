//! Validation study results as delivered by the human-validation pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::metrics::ValidationMetrics;
use crate::error::{CalibrationError, CalibrationResult};

/// Systematic-bias classification of a study.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystematicBias {
    /// Algorithm scores consistently above human scores
    OverEstimation,
    /// Algorithm scores consistently below human scores
    UnderEstimation,
    #[default]
    None,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiasDirection {
    Positive,
    Negative,
    #[default]
    Neutral,
}

/// Shape of the systematic bias.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BiasPattern {
    /// Mean signed discrepancy in score points (>= 0)
    pub magnitude: f32,
    /// Share of samples following the bias [0.0, 1.0]
    pub consistency: f32,
    pub direction: BiasDirection,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscrepancyAnalysis {
    pub systematic_bias: SystematicBias,
    pub bias_pattern: BiasPattern,
}

/// Per-item discrepancy classification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscrepancyType {
    #[default]
    Agreement,
    Overestimation,
    Underestimation,
}

/// One scored item compared between algorithm and human raters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndividualAnalysis {
    pub item_id: String,
    pub algorithmic_score: f32,
    pub human_score: f32,
    pub absolute_error: f32,
    /// Algorithm confidence [0.0, 1.0]
    pub algorithmic_confidence: f32,
    /// Human rater confidence [0.0, 1.0]
    pub human_confidence: f32,
    pub discrepancy_type: DiscrepancyType,
}

impl IndividualAnalysis {
    /// Build an analysis from the two scores, deriving error and discrepancy type.
    pub fn from_scores(
        item_id: impl Into<String>,
        algorithmic_score: f32,
        human_score: f32,
        algorithmic_confidence: f32,
        human_confidence: f32,
    ) -> Self {
        let diff = algorithmic_score - human_score;
        let discrepancy_type = if diff.abs() < 0.5 {
            DiscrepancyType::Agreement
        } else if diff > 0.0 {
            DiscrepancyType::Overestimation
        } else {
            DiscrepancyType::Underestimation
        };
        Self {
            item_id: item_id.into(),
            algorithmic_score,
            human_score,
            absolute_error: diff.abs(),
            algorithmic_confidence,
            human_confidence,
            discrepancy_type,
        }
    }
}

/// Severity ordinal for a detected bias type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiasSeverity {
    Low,
    Medium,
    High,
}

impl BiasSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// A named bias detected by the study (e.g. `sarcasm_detection_failure`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiasTypeEntry {
    pub bias_type: String,
    pub severity: BiasSeverity,
    pub affected_samples: usize,
    pub rationale: String,
}

impl BiasTypeEntry {
    pub fn new(
        bias_type: impl Into<String>,
        severity: BiasSeverity,
        affected_samples: usize,
        rationale: impl Into<String>,
    ) -> Self {
        Self {
            bias_type: bias_type.into(),
            severity,
            affected_samples,
            rationale: rationale.into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BiasAnalysis {
    pub bias_types: Vec<BiasTypeEntry>,
}

/// Study bookkeeping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub session_id: String,
    pub conducted_at: DateTime<Utc>,
    pub rater_count: usize,
    pub notes: Option<String>,
}

impl Default for SessionMetadata {
    fn default() -> Self {
        Self {
            session_id: String::new(),
            conducted_at: Utc::now(),
            rater_count: 0,
            notes: None,
        }
    }
}

/// Output of one human-validation study. Read-only to the calibration core.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Identity of the study
    pub id: Uuid,
    pub overall_metrics: ValidationMetrics,
    pub discrepancy_analysis: DiscrepancyAnalysis,
    pub individual_analyses: Vec<IndividualAnalysis>,
    pub bias_analysis: BiasAnalysis,
    pub session: SessionMetadata,
}

impl ValidationResult {
    /// Create a result carrying only overall metrics.
    pub fn new(overall_metrics: ValidationMetrics) -> Self {
        Self {
            id: Uuid::new_v4(),
            overall_metrics,
            discrepancy_analysis: DiscrepancyAnalysis::default(),
            individual_analyses: Vec::new(),
            bias_analysis: BiasAnalysis::default(),
            session: SessionMetadata::default(),
        }
    }

    #[must_use]
    pub fn with_systematic_bias(mut self, bias: SystematicBias, pattern: BiasPattern) -> Self {
        self.discrepancy_analysis = DiscrepancyAnalysis {
            systematic_bias: bias,
            bias_pattern: pattern,
        };
        self
    }

    #[must_use]
    pub fn with_individual_analyses(mut self, analyses: Vec<IndividualAnalysis>) -> Self {
        self.individual_analyses = analyses;
        self
    }

    #[must_use]
    pub fn with_bias_types(mut self, bias_types: Vec<BiasTypeEntry>) -> Self {
        self.bias_analysis = BiasAnalysis { bias_types };
        self
    }

    /// Check metric ranges and the sample-size invariant.
    ///
    /// # Errors
    /// Returns `CalibrationError::ValidationError` on the first violation.
    pub fn validate(&self) -> CalibrationResult<()> {
        self.overall_metrics.validate()?;

        if self.overall_metrics.sample_size < self.individual_analyses.len() {
            return Err(CalibrationError::validation(
                "overall_metrics.sample_size",
                format!(
                    "sample size {} is smaller than {} individual analyses",
                    self.overall_metrics.sample_size,
                    self.individual_analyses.len()
                ),
            ));
        }

        let pattern = &self.discrepancy_analysis.bias_pattern;
        if pattern.magnitude.is_nan() || pattern.magnitude < 0.0 {
            return Err(CalibrationError::validation(
                "bias_pattern.magnitude",
                "must be non-negative",
            ));
        }
        if !(0.0..=1.0).contains(&pattern.consistency) {
            return Err(CalibrationError::validation(
                "bias_pattern.consistency",
                format!("{} outside [0, 1]", pattern.consistency),
            ));
        }

        for analysis in &self.individual_analyses {
            if !(0.0..=1.0).contains(&analysis.algorithmic_confidence) {
                return Err(CalibrationError::validation(
                    "individual_analyses.algorithmic_confidence",
                    format!("item {} confidence outside [0, 1]", analysis.item_id),
                ));
            }
        }
        Ok(())
    }
}

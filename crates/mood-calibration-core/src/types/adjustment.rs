//! The calibration adjustment unit of work and its lifecycle.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CalibrationError, CalibrationResult};

/// Scoring component whose parameters a calibration may touch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetComponent {
    SentimentAnalysis,
    ConfidenceCalculator,
    PsychologicalIndicators,
}

impl TargetComponent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SentimentAnalysis => "sentiment_analysis",
            Self::ConfidenceCalculator => "confidence_calculator",
            Self::PsychologicalIndicators => "psychological_indicators",
        }
    }
}

impl fmt::Display for TargetComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    WeightAdjustment,
    ThresholdAdjustment,
    BiasCorrection,
}

/// Lifecycle status. `Rejected` and `Validated` are terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentStatus {
    #[default]
    Pending,
    Applied,
    Validated,
    Rejected,
}

impl AdjustmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Applied => "applied",
            Self::Validated => "validated",
            Self::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Validated | Self::Rejected)
    }

    /// Whether `self -> next` is an edge of the lifecycle.
    pub fn can_transition_to(&self, next: AdjustmentStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Applied)
                | (Self::Pending, Self::Rejected)
                | (Self::Applied, Self::Validated)
                | (Self::Applied, Self::Rejected)
        )
    }
}

impl fmt::Display for AdjustmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named parameter change. Pure data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterAdjustment {
    pub parameter: String,
    pub current_value: f32,
    pub recommended_value: f32,
    pub rationale: String,
    pub expected_impact: String,
}

impl ParameterAdjustment {
    pub fn delta(&self) -> f32 {
        self.recommended_value - self.current_value
    }
}

/// Generation-time heuristic estimates. Never compared against as measurements.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictedImprovements {
    pub correlation_delta: f32,
    pub bias_reduction: f32,
    pub accuracy_delta: f32,
}

/// Audit record written by the applier on a committed application.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub applied_at: DateTime<Utc>,
    /// Parameter values read from the store before the write, in write order
    pub previous_values: Vec<(String, f32)>,
}

/// Measured effect of an applied adjustment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub actual_correlation_delta: f32,
    pub actual_bias_reduction: f32,
    pub actual_accuracy_delta: f32,
    pub evaluated_at: DateTime<Utc>,
    /// Study the effect was measured against
    pub evaluated_against: Uuid,
    /// Both deltas reached the configured minimum improvement
    pub meets_min_improvement: bool,
    /// `None` when no revert was needed
    pub revert_succeeded: Option<bool>,
}

/// A proposed, then tracked, change to one or more parameters of one component.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationAdjustment {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Study that motivated this adjustment
    pub source_validation_id: Uuid,
    pub kind: AdjustmentKind,
    pub target: TargetComponent,
    pub parameters: Vec<ParameterAdjustment>,
    pub predicted: PredictedImprovements,
    pub status: AdjustmentStatus,
    pub application: Option<ApplicationRecord>,
    pub outcome: Option<ValidationOutcome>,
    /// Failure detail when the adjustment was rejected
    pub rejection_reason: Option<String>,
}

impl CalibrationAdjustment {
    /// Create a pending adjustment.
    ///
    /// # Panics
    /// Panics if `parameters` is empty.
    pub fn new(
        source_validation_id: Uuid,
        kind: AdjustmentKind,
        target: TargetComponent,
        parameters: Vec<ParameterAdjustment>,
        predicted: PredictedImprovements,
    ) -> Self {
        assert!(
            !parameters.is_empty(),
            "CalibrationAdjustment requires at least one parameter adjustment"
        );
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            source_validation_id,
            kind,
            target,
            parameters,
            predicted,
            status: AdjustmentStatus::Pending,
            application: None,
            outcome: None,
            rejection_reason: None,
        }
    }

    /// `(component, parameter)` keys this adjustment writes.
    pub fn parameter_keys(&self) -> impl Iterator<Item = (TargetComponent, &str)> + '_ {
        self.parameters
            .iter()
            .map(move |p| (self.target, p.parameter.as_str()))
    }

    /// Fail unless the adjustment is currently in `expected`.
    ///
    /// # Errors
    /// Returns `CalibrationError::InvalidTransition`.
    pub fn ensure_status(&self, expected: AdjustmentStatus) -> CalibrationResult<()> {
        if self.status != expected {
            return Err(CalibrationError::InvalidTransition {
                id: self.id,
                expected,
                actual: self.status,
            });
        }
        Ok(())
    }

    fn transition(&mut self, next: AdjustmentStatus) -> CalibrationResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(CalibrationError::InvalidTransition {
                id: self.id,
                expected: next,
                actual: self.status,
            });
        }
        self.status = next;
        Ok(())
    }

    pub(crate) fn mark_applied(&mut self, record: ApplicationRecord) -> CalibrationResult<()> {
        self.transition(AdjustmentStatus::Applied)?;
        self.application = Some(record);
        Ok(())
    }

    pub(crate) fn mark_rejected(&mut self, reason: impl Into<String>) -> CalibrationResult<()> {
        self.transition(AdjustmentStatus::Rejected)?;
        self.rejection_reason = Some(reason.into());
        Ok(())
    }

    pub(crate) fn mark_validated(&mut self, outcome: ValidationOutcome) -> CalibrationResult<()> {
        self.transition(AdjustmentStatus::Validated)?;
        self.outcome = Some(outcome);
        Ok(())
    }
}

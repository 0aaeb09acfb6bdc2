//! Domain types shared by the calibration services.

mod adjustment;
mod metrics;
mod tracking;
mod validation;

pub use adjustment::{
    AdjustmentKind, AdjustmentStatus, ApplicationRecord, CalibrationAdjustment,
    ParameterAdjustment, PredictedImprovements, TargetComponent, ValidationOutcome,
};
pub use metrics::{ConcordanceLevel, SignificanceTest, ValidationMetrics};
pub use tracking::{PerformanceTracking, TrendEntry};
pub use validation::{
    BiasAnalysis, BiasDirection, BiasPattern, BiasSeverity, BiasTypeEntry, DiscrepancyAnalysis,
    DiscrepancyType, IndividualAnalysis, SessionMetadata, SystematicBias, ValidationResult,
};

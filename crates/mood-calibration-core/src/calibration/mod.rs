//! Calibration services.
//!
//! Control flow of one cycle:
//!
//! 1. `AdjustmentGenerator` turns a `ValidationResult` into pending adjustments
//! 2. `ParameterApplier` commits them to the parameter store (all-or-nothing each)
//! 3. After a later study, `EffectivenessValidator` decides keep or revert
//! 4. `PerformanceTracker` records the trend and answers summary queries
//!
//! `CalibrationManager` owns the active/history collections and wires the
//! services together.

pub mod applier;
pub mod generator;
pub mod manager;
pub mod tracker;
pub mod validator;

pub use applier::{ApplicationReport, ApplyFailure, ParameterApplier};
pub use generator::{get_bias_correction_factor, target_for_bias_type, AdjustmentGenerator};
pub use manager::{CalibrationManager, SessionReport};
pub use tracker::{PerformanceSummary, PerformanceTracker};
pub use validator::{calculate_bias_reduction, EffectivenessDecision, EffectivenessValidator};

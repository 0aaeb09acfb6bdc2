//! Mood Calibration Core Library
//!
//! Closed-loop self-calibration for the mood scoring algorithm. Human-vs-algorithm
//! validation studies come in, bounded parameter adjustments go out, and every
//! adjustment is later re-measured and either kept or reverted.
//!
//! # Architecture
//!
//! This crate defines:
//! - Statistical snapshots and study results (`ValidationMetrics`, `ValidationResult`)
//! - The adjustment unit of work and its lifecycle (`CalibrationAdjustment`, `AdjustmentStatus`)
//! - The parameter store capability (`ParameterStore`) plus in-memory and simulated stores
//! - Calibration services: generator, applier, effectiveness validator, performance tracker
//! - `CalibrationManager`, which owns the active/history collections and drives a cycle
//!
//! # Example
//!
//! ```
//! use mood_calibration_core::calibration::get_bias_correction_factor;
//! use mood_calibration_core::types::BiasSeverity;
//!
//! let low = get_bias_correction_factor(BiasSeverity::Low, 10);
//! let high = get_bias_correction_factor(BiasSeverity::High, 10);
//! assert!(high > low);
//! ```

pub mod calibration;
pub mod config;
pub mod error;
pub mod logging;
pub mod stubs;
pub mod traits;
pub mod types;

// Re-exports for convenience
pub use calibration::{
    ApplicationReport, CalibrationManager, PerformanceSummary, SessionReport,
};
pub use config::{CalibrationConfig, Config};
pub use error::{CalibrationError, CalibrationResult};
pub use traits::{ParameterStore, StoreError};
pub use types::{
    AdjustmentKind, AdjustmentStatus, CalibrationAdjustment, TargetComponent, ValidationMetrics,
    ValidationResult,
};

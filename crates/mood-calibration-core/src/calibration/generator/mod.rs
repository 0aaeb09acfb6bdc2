//! Bias analysis and adjustment generation.
//!
//! Candidates are produced in fixed priority order and truncated to the
//! session limit:
//!
//! 1. Systematic bias -> `weight_adjustment` on `sentiment_analysis`
//! 2. Overconfidence -> `threshold_adjustment` on `confidence_calculator`
//! 3. One `bias_correction` per reported bias type

mod correction;
mod service;
#[cfg(test)]
mod tests;
mod types;

pub use correction::{get_bias_correction_factor, severity_multiplier, SAMPLE_SCALE};
pub use service::AdjustmentGenerator;
pub use types::{
    correction_parameter_name, target_for_bias_type, OverconfidenceScan,
    HIGH_CONFIDENCE_LEVEL, HIGH_CONFIDENCE_THRESHOLD_PARAM, LARGE_ERROR_THRESHOLD,
    MAX_CONFIDENCE_THRESHOLD, MAX_CORRECTION_FACTOR, MAX_WEIGHT_STEP, OVERCONFIDENCE_MIN_SHARE,
    SENTIMENT_WEIGHT_PARAM, WEIGHT_STEP_PER_POINT,
};

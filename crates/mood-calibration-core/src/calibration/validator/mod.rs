//! Effectiveness validation: keep or revert an applied adjustment.

mod bias_reduction;
mod service;

pub use bias_reduction::{
    calculate_bias_reduction, AGREEMENT_WEIGHT, CORRELATION_WEIGHT, ERROR_WEIGHT,
};
pub use service::{EffectivenessDecision, EffectivenessValidator};

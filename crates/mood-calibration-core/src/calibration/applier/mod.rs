//! Parameter applier: commits adjustments to the live parameter store.
//!
//! Each adjustment is applied all-or-nothing. Store refusals, store faults and
//! panics inside a store are absorbed here and surface as `rejected` outcomes.

mod lanes;
mod service;
mod types;

pub use lanes::plan_lanes;
pub use service::{ParameterApplier, STALE_TOLERANCE};
pub use types::{ApplicationReport, ApplyFailure};

//! Calibration manager: owns the adjustment collections and drives a cycle.

mod service;
#[cfg(test)]
mod tests;
mod types;

pub use service::CalibrationManager;
pub use types::SessionReport;

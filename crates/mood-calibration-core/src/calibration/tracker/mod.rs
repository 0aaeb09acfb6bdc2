//! Longitudinal performance tracking.

mod service;
#[cfg(test)]
mod tests;

pub use service::{PerformanceSummary, PerformanceTracker};

//! Core trait definitions for the calibration engine.

mod parameter_store;

pub use parameter_store::{ParameterStore, StoreError};

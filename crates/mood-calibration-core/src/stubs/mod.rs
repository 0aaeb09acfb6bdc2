//! Parameter store implementations for tests and for hosts without a live store.
//!
//! - `InMemoryParameterStore`: deterministic, with scripted failures
//! - `SimulatedParameterStore`: success decided by an injected random source

mod in_memory_parameter_store;
mod simulated_parameter_store;

pub use in_memory_parameter_store::InMemoryParameterStore;
pub use simulated_parameter_store::{SimulatedParameterStore, DEFAULT_SUCCESS_PROBABILITY};

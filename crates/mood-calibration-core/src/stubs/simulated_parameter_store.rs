//! Parameter store whose write success is drawn from an injected random source.
//!
//! Stands in for a live store during development; a production deployment
//! replaces it with a real write-and-verify implementation.

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use super::InMemoryParameterStore;
use crate::traits::{ParameterStore, StoreError};
use crate::types::TargetComponent;

/// Default probability that a simulated write commits.
pub const DEFAULT_SUCCESS_PROBABILITY: f64 = 0.9;

pub struct SimulatedParameterStore {
    inner: InMemoryParameterStore,
    rng: Mutex<Box<dyn RngCore + Send>>,
    success_probability: f64,
}

impl SimulatedParameterStore {
    /// Simulated store drawing from an entropy-seeded generator.
    pub fn new(inner: InMemoryParameterStore, success_probability: f64) -> Self {
        Self::with_rng(inner, success_probability, ChaCha8Rng::from_entropy())
    }

    /// Deterministic simulated store for reproducible runs.
    pub fn with_seed(inner: InMemoryParameterStore, success_probability: f64, seed: u64) -> Self {
        Self::with_rng(inner, success_probability, ChaCha8Rng::seed_from_u64(seed))
    }

    /// Simulated store drawing from any uniform random source.
    ///
    /// # Panics
    /// Panics if `success_probability` is outside [0.0, 1.0].
    pub fn with_rng(
        inner: InMemoryParameterStore,
        success_probability: f64,
        rng: impl RngCore + Send + 'static,
    ) -> Self {
        assert!(
            (0.0..=1.0).contains(&success_probability),
            "success_probability must be in [0.0, 1.0]"
        );
        Self {
            inner,
            rng: Mutex::new(Box::new(rng)),
            success_probability,
        }
    }

    /// The wrapped deterministic store.
    pub fn inner(&self) -> &InMemoryParameterStore {
        &self.inner
    }

    pub fn success_probability(&self) -> f64 {
        self.success_probability
    }
}

impl std::fmt::Debug for SimulatedParameterStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedParameterStore")
            .field("inner", &self.inner)
            .field("success_probability", &self.success_probability)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ParameterStore for SimulatedParameterStore {
    async fn read(&self, component: TargetComponent, parameter: &str) -> Result<f32, StoreError> {
        self.inner.read(component, parameter).await
    }

    async fn write(
        &self,
        component: TargetComponent,
        parameter: &str,
        value: f32,
    ) -> Result<(), StoreError> {
        let draw: f64 = self.rng.lock().gen();
        if draw >= self.success_probability {
            debug!(
                "Simulated write failure for {}.{} (draw {:.3})",
                component, parameter, draw
            );
            return Err(StoreError::Rejected {
                component,
                parameter: parameter.to_string(),
                reason: "simulated write failure".into(),
            });
        }
        self.inner.write(component, parameter, value).await
    }

    /// Restoring writes are never drawn: the simulation decides whether an
    /// application commits, not whether it can be undone.
    async fn restore(
        &self,
        component: TargetComponent,
        parameter: &str,
        value: f32,
    ) -> Result<(), StoreError> {
        self.inner.write(component, parameter, value).await
    }
}

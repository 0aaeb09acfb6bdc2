//! In-memory parameter store with deterministic fault injection.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::calibration::generator::{HIGH_CONFIDENCE_THRESHOLD_PARAM, SENTIMENT_WEIGHT_PARAM};
use crate::config::ParameterDefaultsConfig;
use crate::traits::{ParameterStore, StoreError};
use crate::types::TargetComponent;

type ParameterKey = (TargetComponent, String);

/// HashMap-backed parameter store.
///
/// # Thread Safety
///
/// All operations are thread-safe via `parking_lot` locks; no lock is held
/// across the optional simulated latency.
#[derive(Debug, Default)]
pub struct InMemoryParameterStore {
    values: RwLock<HashMap<ParameterKey, f32>>,
    /// Persistent scripted failures per parameter
    failing: RwLock<HashMap<ParameterKey, StoreError>>,
    /// Failures consumed by the next writes, whatever their target
    one_shot: Mutex<VecDeque<StoreError>>,
    unavailable: AtomicBool,
    write_count: AtomicUsize,
    write_log: Mutex<Vec<(TargetComponent, String, f32)>>,
    latency: Option<Duration>,
}

impl InMemoryParameterStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with the known scoring parameters.
    pub fn with_defaults(defaults: &ParameterDefaultsConfig) -> Self {
        let store = Self::new();
        store.set(
            TargetComponent::SentimentAnalysis,
            SENTIMENT_WEIGHT_PARAM,
            defaults.sentiment_weight,
        );
        store.set(
            TargetComponent::ConfidenceCalculator,
            HIGH_CONFIDENCE_THRESHOLD_PARAM,
            defaults.high_confidence_threshold,
        );
        store
    }

    /// Delay every read and write by `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Set a value directly, bypassing fault injection and the write log.
    pub fn set(&self, component: TargetComponent, parameter: &str, value: f32) {
        self.values
            .write()
            .insert((component, parameter.to_string()), value);
    }

    /// Current value without going through the async interface.
    pub fn get(&self, component: TargetComponent, parameter: &str) -> Option<f32> {
        self.values
            .read()
            .get(&(component, parameter.to_string()))
            .copied()
    }

    /// Make every write to `component.parameter` fail with `error`.
    pub fn fail_writes_to(&self, component: TargetComponent, parameter: &str, error: StoreError) {
        self.failing
            .write()
            .insert((component, parameter.to_string()), error);
    }

    /// Stop failing writes to `component.parameter`.
    pub fn clear_failure(&self, component: TargetComponent, parameter: &str) {
        self.failing
            .write()
            .remove(&(component, parameter.to_string()));
    }

    /// Fail the next write, whatever its target, with `error`.
    ///
    /// Queued failures are consumed in the order they were queued.
    pub fn fail_next_write(&self, error: StoreError) {
        self.one_shot.lock().push_back(error);
    }

    /// Toggle whole-store unavailability.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of committed writes.
    pub fn write_count(&self) -> usize {
        self.write_count.load(Ordering::SeqCst)
    }

    /// Committed writes in commit order.
    pub fn write_log(&self) -> Vec<(TargetComponent, String, f32)> {
        self.write_log.lock().clone()
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store marked unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ParameterStore for InMemoryParameterStore {
    async fn read(&self, component: TargetComponent, parameter: &str) -> Result<f32, StoreError> {
        self.simulate_latency().await;
        self.check_available()?;
        self.get(component, parameter)
            .ok_or_else(|| StoreError::UnknownParameter {
                component,
                parameter: parameter.to_string(),
            })
    }

    async fn write(
        &self,
        component: TargetComponent,
        parameter: &str,
        value: f32,
    ) -> Result<(), StoreError> {
        self.simulate_latency().await;
        self.check_available()?;

        let one_shot = self.one_shot.lock().pop_front();
        if let Some(error) = one_shot {
            debug!("Scripted one-shot failure for {}.{}", component, parameter);
            return Err(error);
        }
        let scripted = self
            .failing
            .read()
            .get(&(component, parameter.to_string()))
            .cloned();
        if let Some(error) = scripted {
            debug!("Scripted failure for {}.{}", component, parameter);
            return Err(error);
        }

        self.set(component, parameter, value);
        self.write_count.fetch_add(1, Ordering::SeqCst);
        self.write_log
            .lock()
            .push((component, parameter.to_string(), value));
        debug!("Wrote {}.{} = {:.4}", component, parameter, value);
        Ok(())
    }
}

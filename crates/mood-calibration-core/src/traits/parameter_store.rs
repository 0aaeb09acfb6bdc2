//! Live parameter store of the scoring components.

use async_trait::async_trait;
use thiserror::Error;

use crate::types::TargetComponent;

/// Failure reported by a parameter store.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum StoreError {
    /// The store refused to commit the write.
    #[error("Write rejected for {component}.{parameter}: {reason}")]
    Rejected {
        component: TargetComponent,
        parameter: String,
        reason: String,
    },

    /// The store could not be reached or failed unexpectedly.
    #[error("Parameter store unavailable: {0}")]
    Unavailable(String),

    #[error("Unknown parameter: {component}.{parameter}")]
    UnknownParameter {
        component: TargetComponent,
        parameter: String,
    },
}

impl StoreError {
    /// Whether this is an expected refusal rather than an unexpected fault.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// Read/write access to named parameters of the scoring components.
///
/// Writes follow last-writer-wins semantics; callers are responsible for
/// serializing read-modify-write sequences on the same parameter.
///
/// # Example
///
/// ```
/// use mood_calibration_core::config::ParameterDefaultsConfig;
/// use mood_calibration_core::stubs::InMemoryParameterStore;
/// use mood_calibration_core::{ParameterStore, StoreError, TargetComponent};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), StoreError> {
/// let store = InMemoryParameterStore::with_defaults(&ParameterDefaultsConfig::default());
/// let weight = store.read(TargetComponent::SentimentAnalysis, "sentiment_weight").await?;
/// store.write(TargetComponent::SentimentAnalysis, "sentiment_weight", weight * 0.9).await?;
///
/// let updated = store.read(TargetComponent::SentimentAnalysis, "sentiment_weight").await?;
/// assert!((updated - 0.9).abs() < 1e-6);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Read the current value of `component.parameter`.
    async fn read(&self, component: TargetComponent, parameter: &str) -> Result<f32, StoreError>;

    /// Commit `value` to `component.parameter`.
    async fn write(
        &self,
        component: TargetComponent,
        parameter: &str,
        value: f32,
    ) -> Result<(), StoreError>;

    /// Put back a value that was read before an application.
    ///
    /// Used for rollback and revert. Stores that inject failures into
    /// `write` to model unreliable applications must not inject them here.
    async fn restore(
        &self,
        component: TargetComponent,
        parameter: &str,
        value: f32,
    ) -> Result<(), StoreError> {
        self.write(component, parameter, value).await
    }
}

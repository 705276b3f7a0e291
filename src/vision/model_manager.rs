// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Model registry for the breed and disease classifiers
//!
//! Each model is loaded at most once per process. The first caller spawns a
//! task that runs the loader on a blocking thread while concurrent callers
//! wait on the same `OnceCell`; afterwards every read is lock-free. A failed
//! load is cached too, so a broken model file is reported on every request
//! instead of being retried.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{error, info};

use super::classifier::{ClassifierBackend, ScoreActivation, BREED_CLASS_NAMES, DISEASE_CLASS_NAMES};
use super::errors::ModelLoadError;
use super::preprocessing::InputTransform;

/// The two model families served by the node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Breed,
    Disease,
}

impl ModelKind {
    pub const ALL: [ModelKind; 2] = [ModelKind::Breed, ModelKind::Disease];

    /// Fixed, ordered class names of this model
    pub fn class_names(&self) -> &'static [&'static str] {
        match self {
            ModelKind::Breed => &BREED_CLASS_NAMES,
            ModelKind::Disease => &DISEASE_CLASS_NAMES,
        }
    }

    /// How raw model scores become probabilities
    pub fn activation(&self) -> ScoreActivation {
        match self {
            ModelKind::Breed => ScoreActivation::Softmax,
            ModelKind::Disease => ScoreActivation::Probabilities,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Breed => "breed",
            ModelKind::Disease => "disease",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a model runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionDevice {
    Cpu,
    Cuda,
}

impl fmt::Display for ExecutionDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionDevice::Cpu => f.write_str("cpu"),
            ExecutionDevice::Cuda => f.write_str("cuda"),
        }
    }
}

/// A loaded, ready-to-run model plus its execution context
///
/// Immutable after construction and shared across requests via `Arc`.
pub struct ModelHandle {
    kind: ModelKind,
    backend: Arc<dyn ClassifierBackend>,
    transform: InputTransform,
    device: ExecutionDevice,
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelHandle")
            .field("kind", &self.kind)
            .field("backend", &self.backend.describe())
            .field("transform", &self.transform)
            .field("device", &self.device)
            .finish()
    }
}

impl ModelHandle {
    pub fn new(
        kind: ModelKind,
        backend: Arc<dyn ClassifierBackend>,
        transform: InputTransform,
        device: ExecutionDevice,
    ) -> Self {
        Self {
            kind,
            backend,
            transform,
            device,
        }
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    pub fn backend(&self) -> &dyn ClassifierBackend {
        self.backend.as_ref()
    }

    pub fn transform(&self) -> &InputTransform {
        &self.transform
    }

    pub fn device(&self) -> ExecutionDevice {
        self.device
    }

    pub fn class_names(&self) -> &'static [&'static str] {
        self.kind.class_names()
    }
}

/// Loads a model from persistent storage
///
/// Called from a blocking thread, at most once per model kind per registry.
#[cfg_attr(test, mockall::automock)]
pub trait ModelLoader: Send + Sync {
    fn load(&self, kind: ModelKind) -> Result<ModelHandle, ModelLoadError>;
}

/// Load state of one model, as reported by `/health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelStatus {
    /// Model kind ("breed" or "disease")
    pub model: ModelKind,
    /// Whether the model is loaded and usable
    pub loaded: bool,
    /// Execution device, once loaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<ExecutionDevice>,
    /// Load failure, if the load was attempted and failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

type LoadResult = Result<Arc<ModelHandle>, ModelLoadError>;
type LoadSlot = Arc<OnceCell<LoadResult>>;

/// Lazily-initialized, load-once cache of model handles
pub struct ModelRegistry {
    loader: Arc<dyn ModelLoader>,
    breed: LoadSlot,
    disease: LoadSlot,
}

impl ModelRegistry {
    pub fn new(loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            loader,
            breed: Arc::new(OnceCell::new()),
            disease: Arc::new(OnceCell::new()),
        }
    }

    /// Get the breed model, loading it on first use
    pub async fn load_breed(&self) -> Result<Arc<ModelHandle>, ModelLoadError> {
        self.load(ModelKind::Breed).await
    }

    /// Get the disease model, loading it on first use
    pub async fn load_disease(&self) -> Result<Arc<ModelHandle>, ModelLoadError> {
        self.load(ModelKind::Disease).await
    }

    /// Get a model, loading it on first use
    ///
    /// Initialization runs on a detached task, so dropping the caller mid-load
    /// does not abandon the load or let a later caller start a second one.
    pub async fn load(&self, kind: ModelKind) -> Result<Arc<ModelHandle>, ModelLoadError> {
        if let Some(result) = self.slot(kind).get() {
            return result.clone();
        }

        let slot = self.slot(kind).clone();
        let loader = self.loader.clone();
        let init = tokio::spawn(async move {
            slot.get_or_init(|| load_uncached(loader, kind))
                .await
                .clone()
        });

        match init.await {
            Ok(result) => result,
            Err(e) => Err(ModelLoadError::new(kind, format!("load task failed: {}", e))),
        }
    }

    /// Load both models concurrently, returning the failures
    pub async fn warm_up(&self) -> Vec<ModelLoadError> {
        let (breed, disease) = tokio::join!(self.load_breed(), self.load_disease());
        [breed.err(), disease.err()].into_iter().flatten().collect()
    }

    /// Whether a model is loaded, without triggering a load
    pub fn is_loaded(&self, kind: ModelKind) -> bool {
        matches!(self.slot(kind).get(), Some(Ok(_)))
    }

    /// Cached load failure, if any
    pub fn load_error(&self, kind: ModelKind) -> Option<ModelLoadError> {
        match self.slot(kind).get() {
            Some(Err(e)) => Some(e.clone()),
            _ => None,
        }
    }

    /// Status of every model, without triggering loads
    pub fn list_models(&self) -> Vec<ModelStatus> {
        ModelKind::ALL
            .iter()
            .map(|&kind| {
                let (loaded, device, error) = match self.slot(kind).get() {
                    Some(Ok(handle)) => (true, Some(handle.device()), None),
                    Some(Err(e)) => (false, None, Some(e.to_string())),
                    None => (false, None, None),
                };
                ModelStatus {
                    model: kind,
                    loaded,
                    device,
                    error,
                }
            })
            .collect()
    }

    fn slot(&self, kind: ModelKind) -> &LoadSlot {
        match kind {
            ModelKind::Breed => &self.breed,
            ModelKind::Disease => &self.disease,
        }
    }
}

async fn load_uncached(loader: Arc<dyn ModelLoader>, kind: ModelKind) -> LoadResult {
    info!("Loading {} model", kind);

    let result = match tokio::task::spawn_blocking(move || loader.load(kind)).await {
        Ok(result) => result,
        Err(e) => Err(ModelLoadError::new(kind, format!("loader task failed: {}", e))),
    };

    match result {
        Ok(handle) if handle.kind() != kind => {
            let err = ModelLoadError::new(kind, format!("loader returned a {} model", handle.kind()));
            error!("✗ {}", err);
            Err(err)
        }
        Ok(handle) => {
            info!(
                "✅ {} model loaded ({}, {})",
                kind,
                handle.device(),
                handle.backend().describe()
            );
            Ok(Arc::new(handle))
        }
        Err(e) => {
            error!("✗ {}", e);
            Err(e)
        }
    }
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! End-to-end classification service
//!
//! Validates an upload, fetches the model from the registry, runs decoding,
//! preprocessing and inference on the worker pool, then attaches reference
//! data. Shared by the HTTP handlers and the CLI.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::{CrossInfoTable, ReferenceCatalog, StaticRecord};
use crate::config::ServerConfig;
use crate::crossbreed::{CrossbreedSummary, ParentInput};
use crate::vision::{
    check_upload_headers, classify_image, decode_validated, ClassificationError, ImageBlob,
    InferencePool, ModelKind, ModelRegistry, OnnxModelLoader, PredictionResult,
};

/// Prediction with its reference data, as returned to clients
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedPrediction {
    pub filename: String,
    pub predicted_class: String,
    pub confidence: f32,
    pub static_data: StaticRecord,
    #[serde(skip)]
    pub kind: ModelKind,
    #[serde(skip)]
    pub result: PredictionResult,
}

impl EnrichedPrediction {
    /// Class names paired with their probabilities
    pub fn distribution(&self) -> Vec<(&'static str, f32)> {
        self.result.labelled_distribution(self.kind.class_names())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CrossbreedReport {
    pub parent_a: EnrichedPrediction,
    pub parent_b: EnrichedPrediction,
    pub crossbreed: CrossbreedSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parent {
    A,
    B,
}

impl Parent {
    pub fn field_name(&self) -> &'static str {
        match self {
            Parent::A => "parent_a",
            Parent::B => "parent_b",
        }
    }
}

impl fmt::Display for Parent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// A crossbreed request failed on one of its parents
#[derive(Debug, Error)]
#[error("{parent}: {source}")]
pub struct CrossbreedError {
    pub parent: Parent,
    #[source]
    pub source: ClassificationError,
}

pub struct ClassificationService {
    registry: Arc<ModelRegistry>,
    pool: InferencePool,
    catalog: Arc<ReferenceCatalog>,
    cross_info: Arc<CrossInfoTable>,
}

impl ClassificationService {
    pub fn new(
        registry: Arc<ModelRegistry>,
        pool: InferencePool,
        catalog: ReferenceCatalog,
        cross_info: CrossInfoTable,
    ) -> Self {
        Self {
            registry,
            pool,
            catalog: Arc::new(catalog),
            cross_info: Arc::new(cross_info),
        }
    }

    /// Build the service with ONNX models and the configured reference data
    pub fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let loader = OnnxModelLoader {
            breed_model_path: config.breed_model_path.clone(),
            disease_model_path: config.disease_model_path.clone(),
            device: config.device,
            intra_threads: config.intra_threads,
        };

        let catalog = match &config.catalog_path {
            Some(path) => ReferenceCatalog::from_json_file(path)?,
            None => ReferenceCatalog::builtin(),
        };

        let cross_info = match &config.cross_info_path {
            Some(path) => CrossInfoTable::from_json_file(path)?,
            None => CrossInfoTable::new(),
        };

        Ok(Self::new(
            Arc::new(ModelRegistry::new(Arc::new(loader))),
            InferencePool::new(config.max_concurrent_inferences),
            catalog,
            cross_info,
        ))
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    pub fn catalog(&self) -> &ReferenceCatalog {
        &self.catalog
    }

    /// Classify one upload
    ///
    /// Upload validation failures take precedence over model load failures.
    pub async fn classify(
        &self,
        kind: ModelKind,
        blob: ImageBlob,
    ) -> Result<PredictionResult, ClassificationError> {
        check_upload_headers(&blob.bytes, &blob.content_type)?;

        let handle = self.registry.load(kind).await;

        self.pool
            .run(move || {
                let (image, info) = decode_validated(&blob.bytes, &blob.content_type)?;
                let handle = handle?;
                debug!(
                    "Classifying {} ({}x{} {:?}, {} bytes) with {} model",
                    blob.display_name(),
                    info.width,
                    info.height,
                    info.format,
                    info.size_bytes,
                    kind
                );
                classify_image(&handle, &image)
            })
            .await
    }

    /// Classify one upload and attach its reference data
    pub async fn predict(
        &self,
        kind: ModelKind,
        blob: ImageBlob,
    ) -> Result<EnrichedPrediction, ClassificationError> {
        let filename = blob.display_name().to_string();
        let result = self.classify(kind, blob).await?;
        let static_data = self.catalog.lookup(kind, &result.label);

        info!(
            "{} prediction for {}: {} ({:.4})",
            kind, filename, result.label, result.confidence
        );

        Ok(EnrichedPrediction {
            filename,
            predicted_class: result.label.clone(),
            confidence: result.confidence,
            static_data,
            kind,
            result,
        })
    }

    /// Predict both parents concurrently and merge their breed attributes
    ///
    /// Either parent failing fails the whole request.
    pub async fn crossbreed(
        &self,
        parent_a: ImageBlob,
        parent_b: ImageBlob,
    ) -> Result<CrossbreedReport, CrossbreedError> {
        let predict_parent = |parent: Parent, blob: ImageBlob| async move {
            self.predict(ModelKind::Breed, blob)
                .await
                .map_err(|source| CrossbreedError { parent, source })
        };

        let (a, b) = tokio::try_join!(
            predict_parent(Parent::A, parent_a),
            predict_parent(Parent::B, parent_b)
        )?;

        let known_cross = self
            .cross_info
            .profile_for(&a.predicted_class, &b.predicted_class);

        let crossbreed = CrossbreedSummary::combine(
            ParentInput {
                prediction: &a.result,
                record: &a.static_data,
            },
            ParentInput {
                prediction: &b.result,
                record: &b.static_data,
            },
        )
        .with_known_cross(known_cross);

        Ok(CrossbreedReport {
            parent_a: a,
            parent_b: b,
            crossbreed,
        })
    }
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error types for the classification pipeline
//!
//! Each stage of the pipeline has its own error type so the HTTP layer can
//! map them onto distinct status codes:
//! - `ValidationError` - bad upload, user-correctable (400)
//! - `PreprocessingError` - decode/transform failure after validation (500)
//! - `InferenceError` - model execution failure (500)
//! - `ModelLoadError` - model could not be loaded (503)

use thiserror::Error;

use super::model_manager::ModelKind;

/// Rejection reasons for an uploaded image
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Image data is empty")]
    EmptyData,

    #[error("Image data is too large: {0} bytes (max: {1} bytes)")]
    TooLarge(usize, usize),

    #[error("Unsupported media type '{0}', file must be an image")]
    UnsupportedMediaType(String),

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Image dimensions {width}x{height} exceed the maximum of {max} pixels")]
    DimensionsTooLarge { width: u32, height: u32, max: u32 },
}

/// Failure while turning image bytes into a model tensor
#[derive(Debug, Error)]
pub enum PreprocessingError {
    #[error("Failed to decode image for preprocessing: {0}")]
    DecodeFailed(String),

    #[error("Invalid target shape: {0}")]
    InvalidTargetShape(String),
}

/// Failure while running a model or interpreting its output
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Input tensor has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Model produced {actual} scores but has {expected} classes")]
    ClassCountMismatch { expected: usize, actual: usize },

    #[error("Model produced an empty output")]
    EmptyOutput,

    #[error("Model produced non-finite scores")]
    NonFiniteOutput,

    #[error("Inference backend failed: {0}")]
    Backend(String),

    #[error("Inference worker failed: {0}")]
    Worker(String),
}

/// A model could not be loaded
///
/// Cloneable because the registry caches the failure and hands the same
/// error to every caller instead of retrying the load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to load {model} model: {reason}")]
pub struct ModelLoadError {
    pub model: ModelKind,
    pub reason: String,
}

impl ModelLoadError {
    pub fn new(model: ModelKind, reason: impl Into<String>) -> Self {
        Self {
            model,
            reason: reason.into(),
        }
    }
}

/// Any failure of the end-to-end classification pipeline
#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Preprocessing(#[from] PreprocessingError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    ModelLoad(#[from] ModelLoadError),
}

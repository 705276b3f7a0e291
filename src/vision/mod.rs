// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image classification for cattle photos
//!
//! This module provides:
//! - Upload validation and decoding (`image_utils`)
//! - Per-model tensor preprocessing (`preprocessing`)
//! - Load-once model registry (`model_manager`) backed by ONNX Runtime (`onnx_model`)
//! - Uniform prediction results (`classifier`)
//! - A bounded blocking worker pool for inference (`pool`)

pub mod classifier;
pub mod errors;
pub mod image_utils;
pub mod model_manager;
pub mod onnx_model;
pub mod pool;
pub mod preprocessing;

pub use classifier::{
    classify_image, classify_tensor, ClassifierBackend, PredictionResult, ScoreActivation,
    BREED_CLASS_NAMES, DISEASE_CLASS_NAMES,
};
pub use errors::{
    ClassificationError, InferenceError, ModelLoadError, PreprocessingError, ValidationError,
};
pub use image_utils::{
    check_upload_headers, decode_validated, detect_format, validate_image, ImageBlob, ImageInfo,
    MAX_IMAGE_DIMENSION, MAX_IMAGE_SIZE,
};
pub use model_manager::{
    ExecutionDevice, ModelHandle, ModelKind, ModelLoader, ModelRegistry, ModelStatus,
};
pub use onnx_model::{DevicePreference, OnnxClassifier, OnnxModelLoader};
pub use pool::InferencePool;
pub use preprocessing::{InputShape, InputTransform};

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX Runtime backend for the cattle classifiers
//!
//! Both trained models are served from ONNX exports:
//! - Breed: EfficientNet-B3 backbone with a 1024 -> 512 -> 256 -> 5 fully
//!   connected head, NCHW input `[1, 3, 300, 300]`, logits output `[1, 5]`
//! - Disease: Keras CNN, NHWC input `[1, H, W, 3]`, softmax output `[1, 3]`
//!
//! Features:
//! - GPU acceleration via CUDA (with automatic CPU fallback)
//! - Expected input shape derived from the model's declared input
//! - Thread-safe shared session

use anyhow::{Context, Result};
use ndarray::{ArrayD, Axis};
use ort::execution_providers::{CPUExecutionProvider, CUDAExecutionProvider, ExecutionProvider};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::{Value, ValueType};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use super::classifier::ClassifierBackend;
use super::errors::{InferenceError, ModelLoadError};
use super::model_manager::{ExecutionDevice, ModelHandle, ModelKind, ModelLoader};
use super::preprocessing::{InputShape, InputTransform, BREED_INPUT_SIZE};

/// Requested execution device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePreference {
    /// CUDA when available, otherwise CPU
    #[default]
    Auto,
    Cpu,
    Cuda,
}

impl FromStr for DevicePreference {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(DevicePreference::Auto),
            "cpu" => Ok(DevicePreference::Cpu),
            "cuda" | "gpu" => Ok(DevicePreference::Cuda),
            other => anyhow::bail!("unknown device '{}', expected auto, cpu or cuda", other),
        }
    }
}

/// ONNX-based image classifier
///
/// # Thread Safety
/// The session is wrapped in `Arc<Mutex>` so one loaded model can serve
/// concurrent requests; inference calls are serialized per model.
#[derive(Clone)]
pub struct OnnxClassifier {
    /// ONNX Runtime session
    session: Arc<Mutex<Session>>,
    /// Model input name
    input_name: String,
    /// Declared input dimensions (-1 for dynamic axes)
    input_dims: Vec<i64>,
    /// Declared output dimensions (-1 for dynamic axes)
    output_dims: Vec<i64>,
    /// Model file the session was created from
    model_path: PathBuf,
    /// Device the session runs on
    device: ExecutionDevice,
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("input_name", &self.input_name)
            .field("input_dims", &self.input_dims)
            .field("output_dims", &self.output_dims)
            .field("model_path", &self.model_path)
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}

impl OnnxClassifier {
    /// Load a classifier from an ONNX file
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found
    /// - ONNX Runtime initialization fails
    /// - Model has no inputs or outputs
    pub fn load<P: AsRef<Path>>(
        model_path: P,
        device: DevicePreference,
        intra_threads: usize,
    ) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("ONNX model file not found: {}", model_path.display());
        }

        info!("Loading ONNX classifier from {}", model_path.display());

        let (session, device) = match device {
            DevicePreference::Cpu => (
                build_session(model_path, ExecutionDevice::Cpu, intra_threads)?,
                ExecutionDevice::Cpu,
            ),
            DevicePreference::Cuda => (
                build_session(model_path, ExecutionDevice::Cuda, intra_threads)?,
                ExecutionDevice::Cuda,
            ),
            DevicePreference::Auto => {
                let cuda_available = CUDAExecutionProvider::default()
                    .is_available()
                    .unwrap_or(false);

                if cuda_available {
                    info!("   Attempting CUDA execution provider...");
                    match build_session(model_path, ExecutionDevice::Cuda, intra_threads) {
                        Ok(s) => {
                            info!("✅ CUDA execution provider initialized successfully!");
                            (s, ExecutionDevice::Cuda)
                        }
                        Err(e) => {
                            warn!("⚠️  CUDA execution provider failed: {:#}", e);
                            warn!("   Falling back to CPU execution provider");
                            (
                                build_session(model_path, ExecutionDevice::Cpu, intra_threads)?,
                                ExecutionDevice::Cpu,
                            )
                        }
                    }
                } else {
                    debug!("CUDA not available, using CPU execution provider");
                    (
                        build_session(model_path, ExecutionDevice::Cpu, intra_threads)?,
                        ExecutionDevice::Cpu,
                    )
                }
            }
        };

        let input = session
            .inputs
            .first()
            .context("Model declares no inputs")?;
        let input_name = input.name.clone();
        let input_dims = tensor_dims(&input.input_type);

        let output_dims = session
            .outputs
            .first()
            .map(|output| tensor_dims(&output.output_type))
            .context("Model declares no outputs")?;

        debug!(
            "Classifier loaded - input: {} {:?}, output: {:?}",
            input_name, input_dims, output_dims
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            input_dims,
            output_dims,
            model_path: model_path.to_path_buf(),
            device,
        })
    }

    /// Declared input dimensions, -1 marks a dynamic axis
    pub fn input_dims(&self) -> &[i64] {
        &self.input_dims
    }

    /// Declared output dimensions, -1 marks a dynamic axis
    pub fn output_dims(&self) -> &[i64] {
        &self.output_dims
    }

    pub fn device(&self) -> ExecutionDevice {
        self.device
    }
}

impl ClassifierBackend for OnnxClassifier {
    fn run(&self, input: ArrayD<f32>) -> Result<Vec<f32>, InferenceError> {
        if !dims_compatible(&self.input_dims, input.shape()) {
            return Err(InferenceError::ShapeMismatch {
                expected: self
                    .input_dims
                    .iter()
                    .map(|&d| d.max(0) as usize)
                    .collect(),
                actual: input.shape().to_vec(),
            });
        }

        let input_value = Value::from_array(input)
            .map_err(|e| InferenceError::Backend(format!("failed to create input tensor: {}", e)))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| InferenceError::Backend("session lock poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .map_err(|e| InferenceError::Backend(e.to_string()))?;

        let output = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| InferenceError::Backend(format!("failed to extract output: {}", e)))?;

        // [1, classes] for batched outputs, [classes] otherwise
        let scores: Vec<f32> = match output.ndim() {
            0 => return Err(InferenceError::EmptyOutput),
            1 => output.iter().copied().collect(),
            _ => output.index_axis(Axis(0), 0).iter().copied().collect(),
        };

        Ok(scores)
    }

    fn describe(&self) -> String {
        format!("onnx:{}", self.model_path.display())
    }
}

fn build_session(path: &Path, device: ExecutionDevice, intra_threads: usize) -> Result<Session> {
    let builder = Session::builder().context("Failed to create session builder")?;

    let builder = match device {
        ExecutionDevice::Cuda => builder
            .with_execution_providers([CUDAExecutionProvider::default().build().error_on_failure()])
            .context("Failed to set CUDA execution provider")?,
        ExecutionDevice::Cpu => builder
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?,
    };

    builder
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .context("Failed to set optimization level")?
        .with_intra_threads(intra_threads)
        .context("Failed to set intra threads")?
        .commit_from_file(path)
        .context(format!("Failed to load ONNX model from {}", path.display()))
}

fn tensor_dims(value_type: &ValueType) -> Vec<i64> {
    match value_type {
        ValueType::Tensor { shape, .. } => shape.iter().copied().collect(),
        _ => Vec::new(),
    }
}

/// Whether a concrete tensor shape fits a declared shape with dynamic axes
pub fn dims_compatible(declared: &[i64], actual: &[usize]) -> bool {
    declared.len() == actual.len()
        && declared
            .iter()
            .zip(actual)
            .all(|(&d, &a)| d < 0 || d as usize == a)
}

/// Derive (H, W, C) from a declared NHWC input shape
///
/// The batch axis may be dynamic; the spatial and channel axes must be fixed.
pub fn derive_nhwc_shape(dims: &[i64]) -> Result<InputShape, String> {
    match dims {
        [_, h, w, c] if *h > 0 && *w > 0 && *c > 0 => {
            Ok(InputShape::new(*h as u32, *w as u32, *c as u32))
        }
        [_, _, _, _] => Err(format!(
            "input shape {:?} has dynamic spatial or channel axes",
            dims
        )),
        _ => Err(format!(
            "expected a 4-D NHWC input, model declares {:?}",
            dims
        )),
    }
}

/// Check a declared output shape against the number of classes
fn check_output_classes(dims: &[i64], classes: usize) -> Result<(), String> {
    match dims.last() {
        Some(&n) if n > 0 && n as usize != classes => Err(format!(
            "model outputs {} scores, expected {} classes",
            n, classes
        )),
        None => Err("model declares a scalar output".to_string()),
        _ => Ok(()),
    }
}

/// Loads the breed and disease ONNX exports from disk
#[derive(Debug, Clone)]
pub struct OnnxModelLoader {
    pub breed_model_path: PathBuf,
    pub disease_model_path: PathBuf,
    pub device: DevicePreference,
    pub intra_threads: usize,
}

impl OnnxModelLoader {
    fn load_breed(&self) -> Result<ModelHandle, ModelLoadError> {
        let kind = ModelKind::Breed;
        let classifier = OnnxClassifier::load(&self.breed_model_path, self.device, self.intra_threads)
            .map_err(|e| ModelLoadError::new(kind, format!("{:#}", e)))?;

        let transform = InputTransform::breed();
        let expected: Vec<usize> = transform.output_shape();
        if !dims_compatible(classifier.input_dims(), &expected) {
            return Err(ModelLoadError::new(
                kind,
                format!(
                    "model input {:?} does not accept [1, 3, {}, {}]",
                    classifier.input_dims(),
                    BREED_INPUT_SIZE,
                    BREED_INPUT_SIZE
                ),
            ));
        }
        check_output_classes(classifier.output_dims(), kind.class_names().len())
            .map_err(|reason| ModelLoadError::new(kind, reason))?;

        let device = classifier.device();
        Ok(ModelHandle::new(kind, Arc::new(classifier), transform, device))
    }

    fn load_disease(&self) -> Result<ModelHandle, ModelLoadError> {
        let kind = ModelKind::Disease;
        let classifier =
            OnnxClassifier::load(&self.disease_model_path, self.device, self.intra_threads)
                .map_err(|e| ModelLoadError::new(kind, format!("{:#}", e)))?;

        let shape = derive_nhwc_shape(classifier.input_dims())
            .map_err(|reason| ModelLoadError::new(kind, reason))?;
        if shape.channels != 3 {
            return Err(ModelLoadError::new(
                kind,
                format!("model expects {} channels, only RGB is supported", shape.channels),
            ));
        }
        check_output_classes(classifier.output_dims(), kind.class_names().len())
            .map_err(|reason| ModelLoadError::new(kind, reason))?;

        info!(
            "Disease model expects input {}x{}x{}",
            shape.height, shape.width, shape.channels
        );

        let device = classifier.device();
        Ok(ModelHandle::new(
            kind,
            Arc::new(classifier),
            InputTransform::ResizeScale(shape),
            device,
        ))
    }
}

impl ModelLoader for OnnxModelLoader {
    fn load(&self, kind: ModelKind) -> Result<ModelHandle, ModelLoadError> {
        match kind {
            ModelKind::Breed => self.load_breed(),
            ModelKind::Disease => self.load_disease(),
        }
    }
}

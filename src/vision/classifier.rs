// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Classifier adapters
//!
//! Both models are reduced to the same contract: a `ClassifierBackend` that
//! turns an input tensor into raw scores, and a `PredictionResult` built from
//! those scores. Downstream code never sees model-library specific outputs.

use image::DynamicImage;
use ndarray::ArrayD;
use serde::{Deserialize, Serialize};

use super::errors::{ClassificationError, InferenceError};
use super::model_manager::ModelHandle;

/// Breed labels in the order of the breed model's output logits
pub const BREED_CLASS_NAMES: [&str; 5] = ["ayshire", "brown_swiss", "holstein", "jersey", "RedDane"];

/// Disease labels in the order of the disease model's output probabilities
pub const DISEASE_CLASS_NAMES: [&str; 3] = ["IBK", "FMD", "LSD"];

/// A loaded model that can score a preprocessed tensor
///
/// Implementations must be safe to share across concurrent requests.
pub trait ClassifierBackend: Send + Sync {
    /// Run one forward pass and return the raw scores for the single batch item
    fn run(&self, input: ArrayD<f32>) -> Result<Vec<f32>, InferenceError>;

    /// Short human-readable description (model file, runtime)
    fn describe(&self) -> String {
        "classifier".to_string()
    }
}

/// How a model's raw output maps to a probability distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreActivation {
    /// Raw logits, softmax is applied
    Softmax,
    /// Output is already a probability distribution
    Probabilities,
}

impl ScoreActivation {
    pub fn apply(&self, scores: &[f32]) -> Vec<f32> {
        match self {
            ScoreActivation::Softmax => softmax(scores),
            ScoreActivation::Probabilities => scores.to_vec(),
        }
    }
}

/// Uniform prediction result for every model family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Predicted class name, always one of the model's class names
    pub label: String,
    /// Probability of the predicted class (equals the maximum of `distribution`)
    pub confidence: f32,
    /// Probability for every class, in class-name order
    pub distribution: Vec<f32>,
}

impl PredictionResult {
    /// Build a result from a probability distribution
    ///
    /// Ties resolve to the lowest index.
    pub fn from_probabilities(
        distribution: Vec<f32>,
        class_names: &[&str],
    ) -> Result<Self, InferenceError> {
        if distribution.is_empty() {
            return Err(InferenceError::EmptyOutput);
        }
        if distribution.len() != class_names.len() {
            return Err(InferenceError::ClassCountMismatch {
                expected: class_names.len(),
                actual: distribution.len(),
            });
        }
        if distribution.iter().any(|p| !p.is_finite()) {
            return Err(InferenceError::NonFiniteOutput);
        }

        let index = argmax(&distribution).ok_or(InferenceError::EmptyOutput)?;

        Ok(Self {
            label: class_names[index].to_string(),
            confidence: distribution[index],
            distribution,
        })
    }

    /// Class names paired with their probabilities
    pub fn labelled_distribution<'a>(&self, class_names: &[&'a str]) -> Vec<(&'a str, f32)> {
        class_names
            .iter()
            .copied()
            .zip(self.distribution.iter().copied())
            .collect()
    }
}

/// Numerically stable softmax
pub fn softmax(scores: &[f32]) -> Vec<f32> {
    if scores.is_empty() {
        return Vec::new();
    }

    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();

    exps.into_iter().map(|e| e / sum).collect()
}

/// Index of the maximum value, first occurrence wins
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Score an already-preprocessed tensor
pub fn classify_tensor(
    handle: &ModelHandle,
    tensor: ArrayD<f32>,
) -> Result<PredictionResult, InferenceError> {
    let expected = handle.transform().output_shape();
    if tensor.shape() != expected.as_slice() {
        return Err(InferenceError::ShapeMismatch {
            expected,
            actual: tensor.shape().to_vec(),
        });
    }

    let scores = handle.backend().run(tensor)?;
    let distribution = handle.kind().activation().apply(&scores);

    PredictionResult::from_probabilities(distribution, handle.class_names())
}

/// Preprocess a decoded image with the handle's transform and score it
pub fn classify_image(
    handle: &ModelHandle,
    image: &DynamicImage,
) -> Result<PredictionResult, ClassificationError> {
    let tensor = handle.transform().apply(image)?;
    Ok(classify_tensor(handle, tensor)?)
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for the breed and disease classifiers
//!
//! The two models were trained with different input pipelines:
//! - Breed (EfficientNet-B3 backbone): shorter side resized to 300, center
//!   crop 300x300, ImageNet mean/std normalization, NCHW `[1, 3, 300, 300]`
//! - Disease (Keras CNN): direct resize to the model's declared (H, W),
//!   pixels scaled to [0, 1], NHWC `[1, H, W, 3]`
//!
//! All functions here are pure: the same bytes always give bit-identical tensors.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use ndarray::{Array4, ArrayD};

use super::errors::PreprocessingError;

/// Square input size of the breed model
pub const BREED_INPUT_SIZE: u32 = 300;

/// Mean values for normalization (ImageNet)
pub const MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// Std values for normalization (ImageNet)
pub const STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Spatial input shape declared by a channel-last model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputShape {
    pub height: u32,
    pub width: u32,
    pub channels: u32,
}

impl InputShape {
    pub fn new(height: u32, width: u32, channels: u32) -> Self {
        Self {
            height,
            width,
            channels,
        }
    }
}

/// The deterministic transform a loaded model expects its input to go through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTransform {
    /// Resize shorter side, center crop, ImageNet-normalize, NCHW
    CenterCropNormalize { size: u32 },
    /// Resize to exact (H, W), scale to [0, 1], NHWC
    ResizeScale(InputShape),
}

impl InputTransform {
    /// Transform used by the breed classifier
    pub fn breed() -> Self {
        InputTransform::CenterCropNormalize {
            size: BREED_INPUT_SIZE,
        }
    }

    /// Full tensor shape (batch dimension included) this transform produces
    pub fn output_shape(&self) -> Vec<usize> {
        match *self {
            InputTransform::CenterCropNormalize { size } => {
                vec![1, 3, size as usize, size as usize]
            }
            InputTransform::ResizeScale(shape) => vec![
                1,
                shape.height as usize,
                shape.width as usize,
                shape.channels as usize,
            ],
        }
    }

    /// Apply the transform to an already-decoded image
    pub fn apply(&self, image: &DynamicImage) -> Result<ArrayD<f32>, PreprocessingError> {
        match *self {
            InputTransform::CenterCropNormalize { size } => {
                Ok(preprocess_for_breed(image, size)?.into_dyn())
            }
            InputTransform::ResizeScale(shape) => {
                Ok(preprocess_for_disease(image, shape)?.into_dyn())
            }
        }
    }

    /// Decode raw bytes and apply the transform
    pub fn apply_bytes(&self, bytes: &[u8]) -> Result<ArrayD<f32>, PreprocessingError> {
        let image = decode_for_preprocessing(bytes)?;
        self.apply(&image)
    }
}

/// Preprocess an image for the breed classifier
///
/// Steps:
/// 1. Convert to RGB
/// 2. Crop the centered square whose side is the shorter image side
/// 3. Resize the square to `size` x `size` (bilinear)
/// 4. Normalize with ImageNet mean/std: (pixel/255 - mean) / std
/// 5. Convert to NCHW tensor format [1, 3, size, size]
pub fn preprocess_for_breed(
    image: &DynamicImage,
    size: u32,
) -> Result<Array4<f32>, PreprocessingError> {
    if size == 0 {
        return Err(PreprocessingError::InvalidTargetShape(
            "crop size must be non-zero".to_string(),
        ));
    }
    check_source(image)?;

    // Crop first, the intermediate never exceeds the source
    let square = center_square(image);
    let rgb = square
        .resize_exact(size, size, FilterType::Triangle)
        .to_rgb8();

    let side = size as usize;
    let mut tensor = Array4::zeros((1, 3, side, side));

    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            let normalized = (pixel[c] as f32 / 255.0 - MEAN[c]) / STD[c];
            tensor[[0, c, y as usize, x as usize]] = normalized;
        }
    }

    Ok(tensor)
}

/// Preprocess an image for the disease classifier
///
/// Steps:
/// 1. Convert to RGB
/// 2. Resize to exactly (height, width)
/// 3. Scale pixel values to [0, 1]
/// 4. Keep NHWC layout [1, height, width, 3]
pub fn preprocess_for_disease(
    image: &DynamicImage,
    shape: InputShape,
) -> Result<Array4<f32>, PreprocessingError> {
    if shape.channels != 3 {
        return Err(PreprocessingError::InvalidTargetShape(format!(
            "expected 3 channels, model declares {}",
            shape.channels
        )));
    }
    if shape.height == 0 || shape.width == 0 {
        return Err(PreprocessingError::InvalidTargetShape(format!(
            "zero-sized target {}x{}",
            shape.height, shape.width
        )));
    }
    check_source(image)?;

    let resized = image.resize_exact(shape.width, shape.height, FilterType::CatmullRom);
    let rgb = resized.to_rgb8();

    let mut tensor = Array4::zeros((1, shape.height as usize, shape.width as usize, 3));

    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, y as usize, x as usize, c]] = pixel[c] as f32 / 255.0;
        }
    }

    Ok(tensor)
}

/// Decode bytes and run the breed preprocessing
pub fn preprocess_breed_bytes(bytes: &[u8]) -> Result<Array4<f32>, PreprocessingError> {
    let image = decode_for_preprocessing(bytes)?;
    preprocess_for_breed(&image, BREED_INPUT_SIZE)
}

/// Decode bytes and run the disease preprocessing
pub fn preprocess_disease_bytes(
    bytes: &[u8],
    shape: InputShape,
) -> Result<Array4<f32>, PreprocessingError> {
    let image = decode_for_preprocessing(bytes)?;
    preprocess_for_disease(&image, shape)
}

/// Crop the centered square whose side is the shorter image side
///
/// Same region as resizing the shorter side to N then center cropping N x N.
pub fn center_square(image: &DynamicImage) -> DynamicImage {
    let (w, h) = image.dimensions();
    let side = w.min(h);
    let left = (w - side) / 2;
    let top = (h - side) / 2;
    image.crop_imm(left, top, side, side)
}

fn decode_for_preprocessing(bytes: &[u8]) -> Result<DynamicImage, PreprocessingError> {
    image::load_from_memory(bytes).map_err(|e| PreprocessingError::DecodeFailed(e.to_string()))
}

fn check_source(image: &DynamicImage) -> Result<(), PreprocessingError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(PreprocessingError::DecodeFailed(
            "image has no pixels".to_string(),
        ));
    }
    Ok(())
}

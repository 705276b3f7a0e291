// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Preprocessing tests: exact output shapes, value ranges and determinism

use cattle_vision_node::vision::preprocessing::{
    preprocess_breed_bytes, preprocess_disease_bytes, BREED_INPUT_SIZE, MEAN, STD,
};
use cattle_vision_node::vision::{InputShape, InputTransform, PreprocessingError};
use image::{ImageFormat, Rgb, RgbImage};

use crate::common::{encode, jpeg_bytes, png_bytes};

#[test]
fn test_disease_shape_matches_declared_input() {
    let shape = InputShape::new(64, 64, 3);
    let tensor = preprocess_disease_bytes(&jpeg_bytes(300, 200), shape).unwrap();
    assert_eq!(tensor.shape(), &[1, 64, 64, 3]);
    assert!(tensor.iter().all(|v| (0.0..=1.0).contains(v)));
}

#[test]
fn test_disease_non_square_target() {
    let shape = InputShape::new(128, 96, 3);
    let tensor = preprocess_disease_bytes(&png_bytes(50, 50), shape).unwrap();
    assert_eq!(tensor.shape(), &[1, 128, 96, 3]);
}

#[test]
fn test_breed_shape_and_normalization() {
    let tensor = preprocess_breed_bytes(&png_bytes(640, 480)).unwrap();
    let side = BREED_INPUT_SIZE as usize;
    assert_eq!(tensor.shape(), &[1, 3, side, side]);

    // Every value is a normalized 8-bit pixel
    for c in 0..3 {
        let min = (0.0 - MEAN[c]) / STD[c];
        let max = (1.0 - MEAN[c]) / STD[c];
        let channel = tensor.index_axis(ndarray::Axis(1), c);
        assert!(channel.iter().all(|v| *v >= min - 1e-4 && *v <= max + 1e-4));
    }
}

#[test]
fn test_breed_solid_colour_normalizes_exactly() {
    let solid = RgbImage::from_pixel(400, 300, Rgb([255, 0, 128]));
    let tensor = preprocess_breed_bytes(&encode(&solid, ImageFormat::Png)).unwrap();

    let expected_r = (1.0 - MEAN[0]) / STD[0];
    let expected_g = (0.0 - MEAN[1]) / STD[1];
    assert!((tensor[[0, 0, 150, 150]] - expected_r).abs() < 1e-4);
    assert!((tensor[[0, 1, 10, 290]] - expected_g).abs() < 1e-4);
}

#[test]
fn test_preprocessing_is_deterministic() {
    let bytes = jpeg_bytes(333, 257);
    let transform = InputTransform::breed();
    let first = transform.apply_bytes(&bytes).unwrap();
    let second = transform.apply_bytes(&bytes).unwrap();
    assert_eq!(first, second);

    let disease = InputTransform::ResizeScale(InputShape::new(64, 64, 3));
    assert_eq!(
        disease.apply_bytes(&bytes).unwrap(),
        disease.apply_bytes(&bytes).unwrap()
    );
}

#[test]
fn test_transform_output_shape_matches_tensor() {
    let bytes = png_bytes(90, 120);
    for transform in [
        InputTransform::breed(),
        InputTransform::ResizeScale(InputShape::new(48, 32, 3)),
    ] {
        let tensor = transform.apply_bytes(&bytes).unwrap();
        assert_eq!(tensor.shape(), transform.output_shape().as_slice());
    }
}

#[test]
fn test_malformed_bytes_are_preprocessing_errors() {
    let result = preprocess_breed_bytes(b"garbage");
    assert!(matches!(result, Err(PreprocessingError::DecodeFailed(_))));
}

#[test]
fn test_rejects_non_rgb_target() {
    let result = preprocess_disease_bytes(&png_bytes(10, 10), InputShape::new(64, 64, 1));
    assert!(matches!(
        result,
        Err(PreprocessingError::InvalidTargetShape(_))
    ));
}

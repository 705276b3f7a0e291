// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Upload validation and image decoding
//!
//! Every uploaded image passes through `decode_validated` before a model
//! sees it. The checks run cheapest first: byte size, declared media type,
//! magic bytes, header dimensions, then the full decode.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, ImageReader};

use super::errors::ValidationError;

/// Maximum upload size (10MB)
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// Maximum width or height of an accepted image
pub const MAX_IMAGE_DIMENSION: u32 = 4096;

/// Media types accepted by the prediction endpoints
pub const ALLOWED_MEDIA_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "image/gif",
    "image/bmp",
    "image/tiff",
];

/// An uploaded image as received from the client
#[derive(Debug, Clone)]
pub struct ImageBlob {
    /// Raw file bytes
    pub bytes: Vec<u8>,
    /// Declared media type (multipart Content-Type)
    pub content_type: String,
    /// Original filename, if the client sent one
    pub filename: Option<String>,
}

impl ImageBlob {
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
            filename: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Filename to echo back in responses
    pub fn display_name(&self) -> &str {
        self.filename.as_deref().unwrap_or("upload")
    }
}

/// Image information extracted during validation
#[derive(Debug, Clone)]
pub struct ImageInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Detected format
    pub format: ImageFormat,
    /// Size in bytes
    pub size_bytes: usize,
}

/// Check an upload without keeping the decoded image
///
/// Pure gate: succeeds or fails with the first violated rule.
pub fn validate_image(bytes: &[u8], content_type: &str) -> Result<(), ValidationError> {
    decode_validated(bytes, content_type).map(|_| ())
}

/// Validate an upload and return the decoded image
///
/// Runs the same checks as `validate_image` but keeps the decoded result so
/// the pipeline does not have to decode the bytes a second time.
pub fn decode_validated(
    bytes: &[u8],
    content_type: &str,
) -> Result<(DynamicImage, ImageInfo), ValidationError> {
    check_upload_headers(bytes, content_type)?;

    // Detect format from magic bytes
    let format = detect_format(bytes)?;

    // Reject oversized images from the header before allocating pixel buffers
    let (width, height) = ImageReader::with_format(Cursor::new(bytes), format)
        .into_dimensions()
        .map_err(|e| ValidationError::DecodeFailed(e.to_string()))?;
    check_dimensions(width, height)?;

    let img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| ValidationError::DecodeFailed(e.to_string()))?;
    check_dimensions(img.width(), img.height())?;

    let info = ImageInfo {
        width: img.width(),
        height: img.height(),
        format,
        size_bytes: bytes.len(),
    };

    Ok((img, info))
}

/// Size and media type checks that need no decoding
///
/// Used by the HTTP layer to reject obviously bad uploads before they are
/// queued for the worker pool.
pub fn check_upload_headers(bytes: &[u8], content_type: &str) -> Result<(), ValidationError> {
    if bytes.len() > MAX_IMAGE_SIZE {
        return Err(ValidationError::TooLarge(bytes.len(), MAX_IMAGE_SIZE));
    }

    if bytes.is_empty() {
        return Err(ValidationError::EmptyData);
    }

    if !is_allowed_media_type(content_type) {
        return Err(ValidationError::UnsupportedMediaType(
            content_type.to_string(),
        ));
    }

    Ok(())
}

/// Whether a declared media type is on the allowlist
///
/// Matching ignores case and any `; param=value` suffix.
pub fn is_allowed_media_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    ALLOWED_MEDIA_TYPES.contains(&essence.as_str())
}

fn check_dimensions(width: u32, height: u32) -> Result<(), ValidationError> {
    if width > MAX_IMAGE_DIMENSION || height > MAX_IMAGE_DIMENSION {
        return Err(ValidationError::DimensionsTooLarge {
            width,
            height,
            max: MAX_IMAGE_DIMENSION,
        });
    }
    if width == 0 || height == 0 {
        return Err(ValidationError::DecodeFailed(format!(
            "image has zero-sized dimensions {}x{}",
            width, height
        )));
    }
    Ok(())
}

/// Detect image format from magic bytes
///
/// # Returns
/// * `Ok(ImageFormat)` - Detected format
/// * `Err(ValidationError::DecodeFailed)` - If the bytes are not a known image format
pub fn detect_format(bytes: &[u8]) -> Result<ImageFormat, ValidationError> {
    if bytes.len() < 4 {
        return Err(ValidationError::DecodeFailed(
            "data too short to be an image".to_string(),
        ));
    }

    match bytes {
        // PNG: 89 50 4E 47 (0x89 P N G)
        [0x89, 0x50, 0x4E, 0x47, ..] => Ok(ImageFormat::Png),

        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Ok(ImageFormat::Jpeg),

        // WebP: RIFF .... WEBP
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Ok(ImageFormat::WebP),

        // GIF: GIF87a or GIF89a
        [0x47, 0x49, 0x46, 0x38, x, ..] if *x == 0x37 || *x == 0x39 => Ok(ImageFormat::Gif),

        // BMP: BM
        [0x42, 0x4D, ..] => Ok(ImageFormat::Bmp),

        // TIFF: II (little-endian) or MM (big-endian)
        [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => Ok(ImageFormat::Tiff),

        _ => Err(ValidationError::DecodeFailed(
            "unrecognized image format".to_string(),
        )),
    }
}

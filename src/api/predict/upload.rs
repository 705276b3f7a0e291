// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Multipart upload extraction

use axum_extra::extract::Multipart;
use std::collections::HashMap;
use tracing::debug;

use crate::api::errors::ApiError;
use crate::vision::ImageBlob;

/// Media type assumed when a part declares none; rejected by validation
const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

/// File parts of a multipart form, keyed by field name
#[derive(Debug, Default)]
pub struct UploadedFiles {
    files: HashMap<String, ImageBlob>,
}

impl UploadedFiles {
    /// Read every named part of the form into memory
    ///
    /// Only the first part of a repeated field is kept.
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut files = HashMap::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::InvalidRequest(format!("Malformed multipart body: {}", e)))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let filename = field.file_name().map(str::to_string);
            let content_type = field
                .content_type()
                .unwrap_or(UNKNOWN_MEDIA_TYPE)
                .to_string();

            let bytes = field.bytes().await.map_err(|e| {
                ApiError::InvalidRequest(format!("Failed to read field '{}': {}", name, e))
            })?;

            debug!(
                "Received field '{}' ({} bytes, {})",
                name,
                bytes.len(),
                content_type
            );

            let mut blob = ImageBlob::new(bytes.to_vec(), content_type);
            if let Some(filename) = filename {
                blob = blob.with_filename(filename);
            }
            files.entry(name).or_insert(blob);
        }

        Ok(Self { files })
    }

    /// Remove a required file field
    pub fn take(&mut self, field: &str) -> Result<ImageBlob, ApiError> {
        self.files
            .remove(field)
            .ok_or_else(|| ApiError::InvalidRequest(format!("Missing form field '{}'", field)))
    }
}

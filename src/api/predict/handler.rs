// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prediction endpoint handlers

use axum::{extract::State, Json};
use axum_extra::extract::Multipart;
use tracing::debug;

use super::upload::UploadedFiles;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::pipeline::{CrossbreedReport, EnrichedPrediction, Parent};
use crate::vision::ModelKind;

/// Form field carrying the image for single-image endpoints
pub const FILE_FIELD: &str = "file";

/// POST /predict_breed - Classify the breed of one cattle photo
///
/// # Request
/// Multipart form with an image in field `file`.
///
/// # Response
/// `{filename, predicted_class, confidence, static_data}`
///
/// # Errors
/// - 400 Bad Request: missing field, unsupported type, oversized or undecodable image
/// - 503 Service Unavailable: breed model failed to load
/// - 500 Internal Server Error: preprocessing or inference failed
pub async fn predict_breed_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<EnrichedPrediction>, ApiError> {
    predict_single(state, ModelKind::Breed, multipart).await
}

/// POST /predict_disease - Classify visible disease signs in one cattle photo
///
/// Same request, response and error shape as `/predict_breed`.
pub async fn predict_disease_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<EnrichedPrediction>, ApiError> {
    predict_single(state, ModelKind::Disease, multipart).await
}

/// POST /predict_crossbreed - Predict two parents and summarize the cross
///
/// # Request
/// Multipart form with images in fields `parent_a` and `parent_b`.
///
/// # Response
/// `{parent_a: {...}, parent_b: {...}, crossbreed: {cross_name, expected_*, notes}}`
///
/// Either parent failing fails the whole request.
pub async fn predict_crossbreed_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<CrossbreedReport>, ApiError> {
    let mut uploads = UploadedFiles::read(multipart).await?;
    let parent_a = uploads.take(Parent::A.field_name())?;
    let parent_b = uploads.take(Parent::B.field_name())?;

    debug!(
        "Crossbreed request: {} x {}",
        parent_a.display_name(),
        parent_b.display_name()
    );

    let report = state.service.crossbreed(parent_a, parent_b).await?;
    Ok(Json(report))
}

async fn predict_single(
    state: AppState,
    kind: ModelKind,
    multipart: Multipart,
) -> Result<Json<EnrichedPrediction>, ApiError> {
    let mut uploads = UploadedFiles::read(multipart).await?;
    let blob = uploads.take(FILE_FIELD)?;

    debug!("{} prediction request for {}", kind, blob.display_name());

    state
        .service
        .predict(kind, blob)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_classification(&e, FILE_FIELD))
}

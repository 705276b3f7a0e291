// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Endpoint tests for POST /predict_breed and POST /predict_disease
//!
//! The router is driven in-process with fake models.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use cattle_vision_node::api::{create_router, AppState};
use cattle_vision_node::vision::{BREED_CLASS_NAMES, MAX_IMAGE_SIZE};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use crate::common::{
    default_service, jpeg_bytes, multipart_body, multipart_content_type, png_bytes, service_with,
    FakeBehavior, FakeLoader, Part,
};

fn router() -> Router {
    create_router(AppState::new(default_service()))
}

async fn post(app: Router, uri: &str, parts: &[Part<'_>]) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, multipart_content_type())
        .body(Body::from(multipart_body(parts)))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_predict_breed_end_to_end_jpeg() {
    let image = jpeg_bytes(300, 300);
    let (status, json) = post(
        router(),
        "/predict_breed",
        &[Part::new("file", "holstein.jpg", "image/jpeg", &image)],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["filename"], "holstein.jpg");

    let label = json["predicted_class"].as_str().unwrap();
    assert!(BREED_CLASS_NAMES.contains(&label));

    let confidence = json["confidence"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&confidence));

    let static_data = json["static_data"].as_object().unwrap();
    assert!(!static_data.is_empty());
    assert_eq!(static_data["origin"], "Netherlands");
}

#[tokio::test]
async fn test_trailing_slash_route() {
    let image = png_bytes(100, 100);
    let (status, json) = post(
        router(),
        "/predict_disease/",
        &[Part::new("file", "eye.png", "image/png", &image)],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["predicted_class"], "LSD");
    assert_eq!(json["static_data"]["severity"], "High");
}

#[tokio::test]
async fn test_unsupported_type_is_400() {
    let (status, json) = post(
        router(),
        "/predict_breed",
        &[Part::new("file", "notes.txt", "text/plain", b"hello")],
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error_type"], "validation_error");
    assert!(json["detail"].as_str().unwrap().contains("text/plain"));
    assert_eq!(json["details"]["field"], "file");
}

#[tokio::test]
async fn test_corrupt_image_is_400() {
    let (status, json) = post(
        router(),
        "/predict_disease",
        &[Part::new("file", "cow.jpg", "image/jpeg", b"\xFF\xD8\xFF\xE0garbage")],
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error_type"], "validation_error");
}

#[tokio::test]
async fn test_oversized_upload_is_400() {
    let mut image = jpeg_bytes(10, 10);
    image.resize(MAX_IMAGE_SIZE + 1, 0);

    let (status, json) = post(
        router(),
        "/predict_breed",
        &[Part::new("file", "huge.jpg", "image/jpeg", &image)],
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["detail"].as_str().unwrap().contains("too large"));
}

#[tokio::test]
async fn test_missing_file_field_is_400() {
    let image = jpeg_bytes(50, 50);
    let (status, json) = post(
        router(),
        "/predict_breed",
        &[Part::new("image", "cow.jpg", "image/jpeg", &image)],
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error_type"], "invalid_request");
    assert!(json["detail"].as_str().unwrap().contains("file"));
}

#[tokio::test]
async fn test_model_load_failure_is_503() {
    let loader = Arc::new(FakeLoader::new().with_breed(FakeBehavior::FailLoad));
    let app = create_router(AppState::new(service_with(loader)));
    let image = jpeg_bytes(64, 64);

    let (status, json) = post(
        app,
        "/predict_breed",
        &[Part::new("file", "cow.jpg", "image/jpeg", &image)],
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error_type"], "model_unavailable");
    assert_eq!(json["details"]["model"], "breed");
}

#[tokio::test]
async fn test_inference_failure_is_500() {
    let loader = Arc::new(FakeLoader::new().with_disease(FakeBehavior::FailInference));
    let app = create_router(AppState::new(service_with(loader)));
    let image = jpeg_bytes(64, 64);

    let (status, json) = post(
        app,
        "/predict_disease",
        &[Part::new("file", "cow.jpg", "image/jpeg", &image)],
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error_type"], "inference_error");
    assert!(json["detail"].as_str().unwrap().contains("device lost"));
}

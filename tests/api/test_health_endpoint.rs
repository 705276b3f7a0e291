// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Endpoint tests for GET /health

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use cattle_vision_node::api::{create_router, AppState, HealthResponse};
use cattle_vision_node::pipeline::ClassificationService;
use std::sync::Arc;
use tower::ServiceExt;

use crate::common::{service_with, FakeBehavior, FakeLoader};

async fn get_health(service: Arc<ClassificationService>) -> HealthResponse {
    let app = create_router(AppState::new(service));
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_before_load_is_degraded() {
    let loader = Arc::new(FakeLoader::new());
    let health = get_health(service_with(loader.clone())).await;

    assert_eq!(health.status, "degraded");
    assert!(!health.breed_model_loaded);
    assert!(!health.disease_model_loaded);
    assert_eq!(health.issues.len(), 2);

    // Health never triggers a load
    assert_eq!(loader.load_count(cattle_vision_node::ModelKind::Breed), 0);
}

#[tokio::test]
async fn test_health_after_warm_up() {
    let service = service_with(Arc::new(FakeLoader::new()));
    assert!(service.registry().warm_up().await.is_empty());

    let health = get_health(service).await;
    assert_eq!(health.status, "healthy");
    assert!(health.breed_model_loaded);
    assert!(health.disease_model_loaded);
    assert!(health.issues.is_empty());
}

#[tokio::test]
async fn test_health_reports_load_failure() {
    let service = service_with(Arc::new(
        FakeLoader::new().with_disease(FakeBehavior::FailLoad),
    ));
    service.registry().warm_up().await;

    let health = get_health(service).await;
    assert_eq!(health.status, "degraded");
    assert!(health.breed_model_loaded);
    assert!(!health.disease_model_loaded);
    assert_eq!(health.issues.len(), 1);
    assert!(health.issues[0].contains("model file not found"));
}

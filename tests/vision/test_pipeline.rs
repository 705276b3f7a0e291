// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Classification service tests: ordering of failures, enrichment and crossbreeding

use cattle_vision_node::catalog::{CrossInfoTable, CrossProfile, ReferenceCatalog};
use cattle_vision_node::pipeline::{ClassificationService, Parent};
use cattle_vision_node::vision::{
    ClassificationError, ImageBlob, InferencePool, ModelKind, ModelRegistry, ValidationError,
};
use std::sync::Arc;

use crate::common::{default_service, jpeg_bytes, png_bytes, service_with, FakeBehavior, FakeLoader};

fn jpeg_blob(name: &str) -> ImageBlob {
    ImageBlob::new(jpeg_bytes(300, 300), "image/jpeg").with_filename(name)
}

#[tokio::test]
async fn test_predict_enriches_breed() {
    let service = default_service();
    let prediction = service
        .predict(ModelKind::Breed, jpeg_blob("cow.jpg"))
        .await
        .unwrap();

    assert_eq!(prediction.filename, "cow.jpg");
    assert_eq!(prediction.predicted_class, "holstein");
    assert!(!prediction.static_data.is_empty());

    let json = serde_json::to_value(&prediction).unwrap();
    assert_eq!(json["static_data"]["breed"], "Holstein Friesian");
    assert!(json.get("result").is_none());
}

#[tokio::test]
async fn test_predict_enriches_disease() {
    let service = default_service();
    let prediction = service
        .predict(ModelKind::Disease, ImageBlob::new(png_bytes(80, 60), "image/png"))
        .await
        .unwrap();

    assert_eq!(prediction.predicted_class, "LSD");
    assert_eq!(prediction.filename, "upload");
    let json = serde_json::to_value(&prediction).unwrap();
    assert_eq!(json["static_data"]["name"], "Lumpy Skin Disease");
}

#[tokio::test]
async fn test_unknown_label_has_empty_static_data() {
    let service = Arc::new(ClassificationService::new(
        Arc::new(ModelRegistry::new(Arc::new(FakeLoader::new()))),
        InferencePool::new(1),
        ReferenceCatalog::from_json_str(r#"{"breeds": {}}"#).unwrap(),
        CrossInfoTable::new(),
    ));

    let prediction = service
        .predict(ModelKind::Breed, jpeg_blob("cow.jpg"))
        .await
        .unwrap();
    assert!(prediction.static_data.is_empty());
    assert_eq!(
        serde_json::to_value(&prediction).unwrap()["static_data"],
        serde_json::json!({})
    );
}

#[tokio::test]
async fn test_validation_error_precedes_model_failure() {
    let loader = Arc::new(FakeLoader::new().with_breed(FakeBehavior::FailLoad));
    let service = service_with(loader);

    let err = service
        .classify(ModelKind::Breed, ImageBlob::new(b"not an image".to_vec(), "image/png"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClassificationError::Validation(ValidationError::DecodeFailed(_))
    ));

    let err = service
        .classify(ModelKind::Breed, jpeg_blob("cow.jpg"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClassificationError::ModelLoad(_)));
}

#[tokio::test]
async fn test_header_rejection_skips_model_load() {
    let loader = Arc::new(FakeLoader::new());
    let service = service_with(loader.clone());

    let err = service
        .classify(ModelKind::Disease, ImageBlob::new(png_bytes(8, 8), "text/plain"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClassificationError::Validation(ValidationError::UnsupportedMediaType(_))
    ));
    assert_eq!(loader.load_count(ModelKind::Disease), 0);
}

#[tokio::test]
async fn test_inference_failure_is_per_request() {
    let loader = Arc::new(FakeLoader::new().with_disease(FakeBehavior::FailInference));
    let service = service_with(loader);

    let err = service
        .predict(ModelKind::Disease, jpeg_blob("sick.jpg"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClassificationError::Inference(_)));

    // The breed model keeps working
    service
        .predict(ModelKind::Breed, jpeg_blob("cow.jpg"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_crossbreed_merges_parents() {
    let service = default_service();
    let report = service
        .crossbreed(jpeg_blob("a.jpg"), jpeg_blob("b.jpg"))
        .await
        .unwrap();

    let summary = &report.crossbreed;
    assert_eq!(summary.cross_name, "holstein x holstein");
    assert_eq!(
        summary.expected_milk_type,
        "Very high yield, lower fat / Very high yield, lower fat"
    );
    assert_eq!(summary.expected_size, "Large / Large");
    assert!(summary.notes.starts_with("Parent A: holstein ("));
    assert!(summary.known_cross.is_none());

    assert_eq!(report.parent_a.filename, "a.jpg");
    assert_eq!(report.parent_b.filename, "b.jpg");
}

#[tokio::test]
async fn test_crossbreed_attaches_known_cross() {
    let mut cross_info = CrossInfoTable::new();
    cross_info.insert(
        "Holstein",
        "Holstein",
        CrossProfile {
            parents: vec!["Holstein".into(), "Holstein".into()],
            calf_size: Some("Large".into()),
            ..Default::default()
        },
    );

    let service = ClassificationService::new(
        Arc::new(ModelRegistry::new(Arc::new(FakeLoader::new()))),
        InferencePool::new(2),
        ReferenceCatalog::builtin(),
        cross_info,
    );

    let report = service
        .crossbreed(jpeg_blob("a.jpg"), jpeg_blob("b.jpg"))
        .await
        .unwrap();
    let known = report.crossbreed.known_cross.unwrap();
    assert_eq!(known.calf_size.as_deref(), Some("Large"));
}

#[tokio::test]
async fn test_crossbreed_unlisted_pair_gets_placeholder() {
    let mut cross_info = CrossInfoTable::new();
    cross_info.insert("Holstein", "Jersey", CrossProfile::default());

    let service = ClassificationService::new(
        Arc::new(ModelRegistry::new(Arc::new(FakeLoader::new()))),
        InferencePool::new(2),
        ReferenceCatalog::builtin(),
        cross_info,
    );

    let report = service
        .crossbreed(jpeg_blob("a.jpg"), jpeg_blob("b.jpg"))
        .await
        .unwrap();
    let known = report.crossbreed.known_cross.unwrap();
    assert_eq!(known.parents, vec!["holstein", "holstein"]);
    assert_eq!(known.calf_size.as_deref(), Some("Unknown"));
    assert_eq!(
        known.notes.as_deref(),
        Some("No static mapping available for this parent pair.")
    );
}

#[tokio::test]
async fn test_crossbreed_fails_when_one_parent_fails() {
    let service = default_service();
    let err = service
        .crossbreed(
            jpeg_blob("a.jpg"),
            ImageBlob::new(Vec::new(), "image/jpeg").with_filename("b.jpg"),
        )
        .await
        .unwrap_err();

    assert_eq!(err.parent, Parent::B);
    assert!(matches!(
        err.source,
        ClassificationError::Validation(ValidationError::EmptyData)
    ));
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Model registry tests: load-once under concurrency and cached failures

use cattle_vision_node::vision::{ModelKind, ModelRegistry};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

use crate::common::{FakeBehavior, FakeLoader};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_access_loads_once() {
    let loader = Arc::new(FakeLoader::new().with_delay(Duration::from_millis(50)));
    let registry = Arc::new(ModelRegistry::new(loader.clone()));

    let tasks = (0..32).map(|i| {
        let registry = registry.clone();
        tokio::spawn(async move {
            let kind = if i % 2 == 0 {
                ModelKind::Breed
            } else {
                ModelKind::Disease
            };
            registry.load(kind).await.map(|handle| handle.kind())
        })
    });

    for result in join_all(tasks).await {
        result.unwrap().unwrap();
    }

    assert_eq!(loader.load_count(ModelKind::Breed), 1);
    assert_eq!(loader.load_count(ModelKind::Disease), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_dropped_first_caller_does_not_restart_load() {
    let loader = Arc::new(FakeLoader::new().with_delay(Duration::from_millis(300)));
    let registry = Arc::new(ModelRegistry::new(loader.clone()));

    let first = {
        let registry = registry.clone();
        tokio::spawn(async move { registry.load_breed().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    first.abort();
    let _ = first.await;

    let handle = registry.load_breed().await.unwrap();
    assert_eq!(handle.kind(), ModelKind::Breed);
    assert_eq!(loader.load_count(ModelKind::Breed), 1);
}

#[tokio::test]
async fn test_all_callers_share_one_handle() {
    let loader = Arc::new(FakeLoader::new());
    let registry = ModelRegistry::new(loader);

    let first = registry.load_breed().await.unwrap();
    let second = registry.load_breed().await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn test_failure_is_cached_not_retried() {
    let loader = Arc::new(FakeLoader::new().with_disease(FakeBehavior::FailLoad));
    let registry = ModelRegistry::new(loader.clone());

    let first = registry.load_disease().await.unwrap_err();
    let second = registry.load_disease().await.unwrap_err();

    assert_eq!(first, second);
    assert_eq!(first.model, ModelKind::Disease);
    assert_eq!(loader.load_count(ModelKind::Disease), 1);
    assert_eq!(registry.load_error(ModelKind::Disease), Some(first));
}

#[tokio::test]
async fn test_warm_up_reports_failures_and_status() {
    let loader = Arc::new(FakeLoader::new().with_breed(FakeBehavior::FailLoad));
    let registry = ModelRegistry::new(loader);

    assert!(!registry.is_loaded(ModelKind::Breed));
    assert!(!registry.is_loaded(ModelKind::Disease));

    let failures = registry.warm_up().await;
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].model, ModelKind::Breed);

    assert!(!registry.is_loaded(ModelKind::Breed));
    assert!(registry.is_loaded(ModelKind::Disease));

    let statuses = registry.list_models();
    let breed = statuses.iter().find(|s| s.model == ModelKind::Breed).unwrap();
    assert!(!breed.loaded);
    assert!(breed.error.as_deref().unwrap().contains("model file not found"));
}

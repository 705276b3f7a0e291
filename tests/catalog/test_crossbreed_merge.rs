// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Crossbreed attribute merge tests

use cattle_vision_node::catalog::{BreedProfile, ReferenceCatalog, StaticRecord};
use cattle_vision_node::crossbreed::{merge_attribute, CrossbreedSummary, ParentInput};
use cattle_vision_node::{ModelKind, PredictionResult};

fn prediction(label: &str, confidence: f32) -> PredictionResult {
    PredictionResult {
        label: label.to_string(),
        confidence,
        distribution: vec![confidence, 1.0 - confidence],
    }
}

#[test]
fn test_merge_exact_strings() {
    assert_eq!(merge_attribute(Some("High fat"), None), "High fat");
    assert_eq!(merge_attribute(None, None), "N/A");
    assert_eq!(merge_attribute(Some("X"), Some("Y")), "X / Y");
}

#[test]
fn test_builtin_pair_summary() {
    let catalog = ReferenceCatalog::builtin();
    let a = prediction("jersey", 0.91);
    let b = prediction("RedDane", 0.734);
    let a_record = catalog.lookup(ModelKind::Breed, &a.label);
    let b_record = catalog.lookup(ModelKind::Breed, &b.label);

    let summary = CrossbreedSummary::combine(
        ParentInput {
            prediction: &a,
            record: &a_record,
        },
        ParentInput {
            prediction: &b,
            record: &b_record,
        },
    );

    assert_eq!(summary.cross_name, "jersey x RedDane");
    assert_eq!(
        summary.expected_milk_type,
        "High fat & protein / Balanced composition"
    );
    assert_eq!(
        summary.expected_average_milk_yield,
        "4,000–6,000 liters/year / 6,000–8,000 liters/year"
    );
    assert_eq!(summary.expected_primary_color, "Fawn/light brown / Red");
    assert_eq!(summary.expected_size, "Small / Medium-Large");
    assert_eq!(
        summary.expected_temperament,
        "Alert & friendly / Robust & adaptable"
    );
    assert_eq!(
        summary.notes,
        "Parent A: jersey (0.91), Parent B: RedDane (0.73)."
    );
}

#[test]
fn test_unknown_parents_give_placeholders() {
    let a = prediction("angus", 0.5);
    let b = prediction("gir", 0.5);
    let partial = StaticRecord::Breed(BreedProfile {
        temperament: Some("Docile".to_string()),
        ..Default::default()
    });

    let summary = CrossbreedSummary::combine(
        ParentInput {
            prediction: &a,
            record: &StaticRecord::Empty,
        },
        ParentInput {
            prediction: &b,
            record: &partial,
        },
    );

    assert_eq!(summary.expected_milk_type, "N/A");
    assert_eq!(summary.expected_size, "N/A");
    assert_eq!(summary.expected_temperament, "Docile");
}

#[test]
fn test_summary_serializes_without_known_cross() {
    let a = prediction("holstein", 0.8);
    let summary = CrossbreedSummary::combine(
        ParentInput {
            prediction: &a,
            record: &StaticRecord::Empty,
        },
        ParentInput {
            prediction: &a,
            record: &StaticRecord::Empty,
        },
    );

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["cross_name"], "holstein x holstein");
    assert_eq!(json["expected_temperament"], "N/A");
    assert!(json.get("known_cross").is_none());
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Heuristic crossbreed summary
//!
//! Merges the static attributes of two independently predicted parent breeds.
//! This is a placeholder combination rule, no inheritance model is implied.

use serde::{Deserialize, Serialize};

use crate::catalog::{CrossProfile, StaticRecord};
use crate::vision::PredictionResult;

/// Placeholder used when neither parent defines an attribute
pub const NOT_AVAILABLE: &str = "N/A";

/// Breed attributes merged into the summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossAttribute {
    MilkType,
    AverageMilkYield,
    PrimaryColor,
    Size,
    Temperament,
}

/// Merge one attribute from both parents
///
/// Both defined gives `"A / B"`, one defined gives that value, neither gives
/// `"N/A"`. Empty strings count as undefined.
pub fn merge_attribute(a: Option<&str>, b: Option<&str>) -> String {
    let a = a.filter(|v| !v.is_empty());
    let b = b.filter(|v| !v.is_empty());
    match (a, b) {
        (Some(a), Some(b)) => format!("{} / {}", a, b),
        (Some(v), None) | (None, Some(v)) => v.to_string(),
        (None, None) => NOT_AVAILABLE.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossbreedSummary {
    pub cross_name: String,
    pub expected_milk_type: String,
    pub expected_average_milk_yield: String,
    pub expected_primary_color: String,
    pub expected_size: String,
    pub expected_temperament: String,
    pub notes: String,
    /// Curated profile when the parent pair is a known cross
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_cross: Option<CrossProfile>,
}

/// One parent's prediction and its reference data
#[derive(Debug, Clone, Copy)]
pub struct ParentInput<'a> {
    pub prediction: &'a PredictionResult,
    pub record: &'a StaticRecord,
}

impl CrossbreedSummary {
    pub fn combine(parent_a: ParentInput<'_>, parent_b: ParentInput<'_>) -> Self {
        let merged = |attr: CrossAttribute| {
            merge_attribute(parent_a.record.attribute(attr), parent_b.record.attribute(attr))
        };

        let a = parent_a.prediction;
        let b = parent_b.prediction;

        Self {
            cross_name: format!("{} x {}", a.label, b.label),
            expected_milk_type: merged(CrossAttribute::MilkType),
            expected_average_milk_yield: merged(CrossAttribute::AverageMilkYield),
            expected_primary_color: merged(CrossAttribute::PrimaryColor),
            expected_size: merged(CrossAttribute::Size),
            expected_temperament: merged(CrossAttribute::Temperament),
            notes: format!(
                "Parent A: {} ({:.2}), Parent B: {} ({:.2}).",
                a.label, a.confidence, b.label, b.confidence
            ),
            known_cross: None,
        }
    }

    pub fn with_known_cross(mut self, profile: Option<CrossProfile>) -> Self {
        self.known_cross = profile;
        self
    }
}

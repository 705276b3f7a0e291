// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Known parent-pair profiles
//!
//! Loaded from a JSON object keyed `"<A> x <B>"`. A pair matches in either
//! parent order and regardless of case.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrossProfile {
    #[serde(default)]
    pub parents: Vec<String>,
    /// Number or range string, `null` when unknown
    #[serde(default)]
    pub estimated_milk_yield_l_per_year: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disease_resistance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calf_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calf_temperament: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_use_case: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CrossProfile {
    /// Placeholder reported for a pair missing from a configured table
    pub fn unmapped(parent_a: &str, parent_b: &str) -> Self {
        Self {
            parents: vec![parent_a.to_string(), parent_b.to_string()],
            estimated_milk_yield_l_per_year: None,
            disease_resistance: Some("Unknown".to_string()),
            calf_size: Some("Unknown".to_string()),
            calf_temperament: Some("Unknown".to_string()),
            recommended_use_case: Some("General dairy".to_string()),
            notes: Some("No static mapping available for this parent pair.".to_string()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CrossInfoTable {
    pairs: HashMap<(String, String), CrossProfile>,
}

impl CrossInfoTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: HashMap<String, CrossProfile> =
            serde_json::from_str(json).context("Invalid cross info JSON")?;

        let mut table = Self::new();
        for (key, profile) in raw {
            let (a, b) = split_pair_key(&key)
                .with_context(|| format!("Cross info key '{}' is not of the form 'A x B'", key))?;
            table.insert(a, b, profile);
        }
        Ok(table)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read cross info file {}", path.display()))?;
        let table = Self::from_json_str(&json)?;
        info!("Loaded {} known crosses from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn insert(&mut self, parent_a: &str, parent_b: &str, profile: CrossProfile) {
        self.pairs.insert(pair_key(parent_a, parent_b), profile);
    }

    pub fn lookup(&self, parent_a: &str, parent_b: &str) -> Option<&CrossProfile> {
        self.pairs
            .get(&pair_key(parent_a, parent_b))
            .or_else(|| self.pairs.get(&pair_key(parent_b, parent_a)))
    }

    /// Profile for a pair, or the unmapped placeholder on a miss
    ///
    /// `None` when no cross table is configured at all.
    pub fn profile_for(&self, parent_a: &str, parent_b: &str) -> Option<CrossProfile> {
        if self.is_empty() {
            return None;
        }
        Some(
            self.lookup(parent_a, parent_b)
                .cloned()
                .unwrap_or_else(|| CrossProfile::unmapped(parent_a, parent_b)),
        )
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

fn pair_key(a: &str, b: &str) -> (String, String) {
    (a.trim().to_lowercase(), b.trim().to_lowercase())
}

fn split_pair_key(key: &str) -> Option<(&str, &str)> {
    let (a, b) = key.split_once(" x ")?;
    let (a, b) = (a.trim(), b.trim());
    (!a.is_empty() && !b.is_empty()).then_some((a, b))
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Static reference data attached to predictions
//!
//! The catalog is built once at startup, either from the built-in tables or
//! from a JSON file, and never mutated afterwards. Lookups are case-folded and
//! a miss yields `StaticRecord::Empty` rather than an error.

pub mod breeds;
pub mod cross;
pub mod diseases;

use anyhow::{Context, Result};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use crate::crossbreed::CrossAttribute;
use crate::vision::ModelKind;

pub use breeds::{builtin_breeds, BreedProfile};
pub use cross::{CrossInfoTable, CrossProfile};
pub use diseases::{builtin_diseases, DiseaseProfile};

/// Reference data for one predicted label
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaticRecord {
    Breed(BreedProfile),
    Disease(DiseaseProfile),
    /// No reference data for the label, serialized as `{}`
    Empty,
}

impl StaticRecord {
    pub fn is_empty(&self) -> bool {
        matches!(self, StaticRecord::Empty)
    }

    /// Value of a mergeable attribute, only breed records carry them
    pub fn attribute(&self, attribute: CrossAttribute) -> Option<&str> {
        match self {
            StaticRecord::Breed(profile) => profile.attribute(attribute),
            _ => None,
        }
    }
}

impl Serialize for StaticRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StaticRecord::Breed(profile) => profile.serialize(serializer),
            StaticRecord::Disease(profile) => profile.serialize(serializer),
            StaticRecord::Empty => serializer.serialize_map(Some(0))?.end(),
        }
    }
}

/// On-disk catalog layout
#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    breeds: HashMap<String, BreedProfile>,
    #[serde(default)]
    diseases: HashMap<String, DiseaseProfile>,
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceCatalog {
    breeds: HashMap<String, BreedProfile>,
    diseases: HashMap<String, DiseaseProfile>,
}

impl ReferenceCatalog {
    /// Catalog with the built-in breed and disease tables
    pub fn builtin() -> Self {
        Self::from_entries(builtin_breeds(), builtin_diseases())
    }

    pub fn from_entries(
        breeds: impl IntoIterator<Item = (String, BreedProfile)>,
        diseases: impl IntoIterator<Item = (String, DiseaseProfile)>,
    ) -> Self {
        Self {
            breeds: breeds
                .into_iter()
                .map(|(key, profile)| (fold_key(&key), profile))
                .collect(),
            diseases: diseases
                .into_iter()
                .map(|(key, profile)| (fold_key(&key), profile))
                .collect(),
        }
    }

    /// Replace the built-in tables with `{"breeds": {...}, "diseases": {...}}`
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: CatalogFile =
            serde_json::from_str(json).context("Invalid reference catalog JSON")?;
        Ok(Self::from_entries(file.breeds, file.diseases))
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read reference catalog {}", path.display()))?;
        let catalog = Self::from_json_str(&json)?;
        info!(
            "Loaded reference catalog from {} ({} breeds, {} diseases)",
            path.display(),
            catalog.breeds.len(),
            catalog.diseases.len()
        );
        Ok(catalog)
    }

    /// Reference data for a predicted label, `Empty` on a miss
    pub fn lookup(&self, kind: ModelKind, label: &str) -> StaticRecord {
        let key = fold_key(label);
        match kind {
            ModelKind::Breed => self
                .breeds
                .get(&key)
                .cloned()
                .map(StaticRecord::Breed)
                .unwrap_or(StaticRecord::Empty),
            ModelKind::Disease => self
                .diseases
                .get(&key)
                .cloned()
                .map(StaticRecord::Disease)
                .unwrap_or(StaticRecord::Empty),
        }
    }

    pub fn breed(&self, label: &str) -> Option<&BreedProfile> {
        self.breeds.get(&fold_key(label))
    }

    pub fn disease(&self, label: &str) -> Option<&DiseaseProfile> {
        self.diseases.get(&fold_key(label))
    }
}

fn fold_key(label: &str) -> String {
    label.trim().to_lowercase()
}

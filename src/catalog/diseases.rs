// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Built-in disease reference table

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseaseProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pathogen: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub symptoms: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transmission: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prevention: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub danger_level: Option<String>,
}

struct DiseaseRow {
    key: &'static str,
    name: &'static str,
    severity: &'static str,
    pathogen: &'static str,
    symptoms: [&'static str; 4],
    transmission: &'static str,
    treatment: &'static str,
    prevention: &'static str,
    danger_level: &'static str,
}

const DISEASE_ROWS: [DiseaseRow; 3] = [
    DiseaseRow {
        key: "fmd",
        name: "Foot-and-Mouth Disease",
        severity: "High",
        pathogen: "Aphthovirus",
        symptoms: [
            "Blisters on mouth & feet",
            "Lameness",
            "High fever",
            "Severe drooling",
        ],
        transmission: "Airborne, direct contact, equipment",
        treatment: "Supportive only – no direct cure",
        prevention: "Vaccination, isolation, biosecurity",
        danger_level: "Extremely contagious",
    },
    DiseaseRow {
        key: "ibk",
        name: "Pinkeye (IBK)",
        severity: "Medium",
        pathogen: "Moraxella bovis",
        symptoms: [
            "Red swollen eyes",
            "Light sensitivity",
            "Corneal ulcer",
            "Watery discharge",
        ],
        transmission: "Flies, dust, environment",
        treatment: "Antibiotics + eye protection",
        prevention: "Fly control, sanitation",
        danger_level: "Can cause permanent blindness",
    },
    DiseaseRow {
        key: "lsd",
        name: "Lumpy Skin Disease",
        severity: "High",
        pathogen: "Capripoxvirus",
        symptoms: [
            "Hard skin nodules",
            "Fever",
            "Swollen lymph nodes",
            "Drop in milk production",
        ],
        transmission: "Mosquitoes & biting flies",
        treatment: "Supportive only",
        prevention: "Vaccination & insect control",
        danger_level: "Rapid farm-wide spread",
    },
];

/// Built-in disease profiles keyed by lowercase label
pub fn builtin_diseases() -> Vec<(String, DiseaseProfile)> {
    DISEASE_ROWS
        .iter()
        .map(|row| {
            (
                row.key.to_string(),
                DiseaseProfile {
                    name: Some(row.name.to_string()),
                    severity: Some(row.severity.to_string()),
                    pathogen: Some(row.pathogen.to_string()),
                    symptoms: row.symptoms.iter().map(|s| s.to_string()).collect(),
                    transmission: Some(row.transmission.to_string()),
                    treatment: Some(row.treatment.to_string()),
                    prevention: Some(row.prevention.to_string()),
                    danger_level: Some(row.danger_level.to_string()),
                },
            )
        })
        .collect()
}

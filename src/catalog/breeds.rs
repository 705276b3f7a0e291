// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Built-in breed reference table

use serde::{Deserialize, Serialize};

use crate::crossbreed::CrossAttribute;

/// Descriptive attributes for one breed
///
/// Every field is optional so partial records from a catalog file are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreedProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milk_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_milk_yield: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperament: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_case: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fun_fact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_breeding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub future_potential: Option<String>,
}

impl BreedProfile {
    pub fn attribute(&self, attribute: CrossAttribute) -> Option<&str> {
        let value = match attribute {
            CrossAttribute::MilkType => &self.milk_type,
            CrossAttribute::AverageMilkYield => &self.average_milk_yield,
            CrossAttribute::PrimaryColor => &self.primary_color,
            CrossAttribute::Size => &self.size,
            CrossAttribute::Temperament => &self.temperament,
        };
        value.as_deref()
    }
}

// key, breed, origin, milk_type, average_milk_yield, primary_color, size,
// temperament, use_case, fun_fact, history, cross_breeding, future_potential
type BreedRow = [&'static str; 13];

const BREED_ROWS: [BreedRow; 5] = [
    [
        "ayshire",
        "Ayrshire",
        "Scotland",
        "Moderate fat, high quality",
        "5,000–7,000 liters/year",
        "Red and white",
        "Medium",
        "Hardy, active grazer",
        "Pasture-based dairy",
        "Known for strong feet—excellent for grazing pastures.",
        "Developed in Ayr, Scotland in the 18th century.",
        "Improves grazing efficiency & udder quality.",
        "Perfect for sustainable & low-input dairy farming.",
    ],
    [
        "brown_swiss",
        "Brown Swiss",
        "Switzerland",
        "Ideal for cheese, high protein",
        "6,000–9,000 liters/year",
        "Brown with light muzzle",
        "Large",
        "Calm",
        "Cheese and dairy farms",
        "One of the world's oldest dairy breeds.",
        "Originated in the Swiss Alps.",
        "Improves robustness and cheese yield quality.",
        "High tolerance to heat and stress.",
    ],
    [
        "holstein",
        "Holstein Friesian",
        "Netherlands",
        "Very high yield, lower fat",
        "8,000–12,000+ liters/year",
        "Black & white pattern",
        "Large",
        "Calm",
        "High-production dairy farms",
        "World's highest milk-producing breed.",
        "Selective breeding for milk yield for 100+ years.",
        "Boosts yield efficiency in mixed herds.",
        "Essential for precision dairy automation.",
    ],
    [
        "jersey",
        "Jersey",
        "Jersey Island",
        "High fat & protein",
        "4,000–6,000 liters/year",
        "Fawn/light brown",
        "Small",
        "Alert & friendly",
        "Ghee, butter, premium dairy",
        "Milk appears golden due to beta-carotene.",
        "Closed herd book since 1800s.",
        "Improves fat %, fertility, calving ease.",
        "Great for premium dairy startups.",
    ],
    [
        "reddane",
        "Red Dane",
        "Denmark",
        "Balanced composition",
        "6,000–8,000 liters/year",
        "Red",
        "Medium-Large",
        "Robust & adaptable",
        "Health-focused dairy systems",
        "Built for longevity and fertility.",
        "Improved using European dairy lines.",
        "Boosts fertility and long life.",
        "Ideal for low-antibiotic dairy systems.",
    ],
];

/// Built-in breed profiles keyed by lowercase label
pub fn builtin_breeds() -> Vec<(String, BreedProfile)> {
    BREED_ROWS
        .iter()
        .map(|row| {
            let field = |i: usize| Some(row[i].to_string());
            (
                row[0].to_string(),
                BreedProfile {
                    breed: field(1),
                    origin: field(2),
                    milk_type: field(3),
                    average_milk_yield: field(4),
                    primary_color: field(5),
                    size: field(6),
                    temperament: field(7),
                    use_case: field(8),
                    fun_fact: field(9),
                    history: field(10),
                    cross_breeding: field(11),
                    future_potential: field(12),
                },
            )
        })
        .collect()
}

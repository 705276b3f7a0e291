// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the Cattle Vision Node

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-onnx-classifiers-2025-11-02";

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = "2025-11-02";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "breed-classification",
    "disease-classification",
    "crossbreed-summary",
    "static-enrichment",
    "known-cross-pairs",
    "cuda-fallback",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Cattle Vision Node {} ({})", VERSION_NUMBER, BUILD_DATE)
}

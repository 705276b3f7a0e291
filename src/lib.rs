// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod crossbreed;
pub mod logging;
pub mod pipeline;
pub mod version;
pub mod vision;

// Re-export main types
pub use catalog::{ReferenceCatalog, StaticRecord};
pub use config::ServerConfig;
pub use crossbreed::{merge_attribute, CrossbreedSummary};
pub use pipeline::{ClassificationService, CrossbreedReport, EnrichedPrediction};
pub use vision::{ModelKind, ModelRegistry, PredictionResult};

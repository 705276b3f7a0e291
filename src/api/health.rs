// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Health endpoint

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::http_server::AppState;
use crate::vision::{ModelKind, ModelStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy` when both models are loaded, `degraded` otherwise
    pub status: String,
    pub breed_model_loaded: bool,
    pub disease_model_loaded: bool,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub models: Vec<ModelStatus>,
    #[serde(default)]
    pub version: String,
}

impl HealthResponse {
    pub fn from_statuses(models: Vec<ModelStatus>) -> Self {
        let loaded = |kind: ModelKind| models.iter().any(|m| m.model == kind && m.loaded);
        let breed_model_loaded = loaded(ModelKind::Breed);
        let disease_model_loaded = loaded(ModelKind::Disease);

        let issues = models
            .iter()
            .filter(|m| !m.loaded)
            .map(|m| match &m.error {
                Some(error) => error.clone(),
                None => format!("{} model not loaded yet", m.model),
            })
            .collect();

        let status = if breed_model_loaded && disease_model_loaded {
            "healthy"
        } else {
            "degraded"
        };

        Self {
            status: status.to_string(),
            breed_model_loaded,
            disease_model_loaded,
            issues,
            models,
            version: crate::version::VERSION_NUMBER.to_string(),
        }
    }
}

/// GET /health - Report whether both models are loaded
///
/// Never triggers a model load.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let statuses = state.service.registry().list_models();
    Json(HealthResponse::from_statuses(statuses))
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

use crate::pipeline::CrossbreedError;
use crate::vision::ClassificationError;

/// JSON body of every failed request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    /// Human-readable reason
    pub detail: String,
    pub error_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    /// Malformed multipart body or missing form field
    InvalidRequest(String),
    /// Upload rejected by the image validator
    ValidationError {
        field: String,
        message: String,
    },
    /// Model could not be loaded
    ModelUnavailable {
        model: String,
        message: String,
    },
    PreprocessingFailed(String),
    InferenceFailed(String),
    InternalError(String),
}

impl ApiError {
    /// Map a pipeline failure for the upload in form field `field`
    pub fn from_classification(err: &ClassificationError, field: &str) -> Self {
        match err {
            ClassificationError::Validation(e) => ApiError::ValidationError {
                field: field.to_string(),
                message: e.to_string(),
            },
            ClassificationError::Preprocessing(e) => ApiError::PreprocessingFailed(e.to_string()),
            ClassificationError::Inference(e) => ApiError::InferenceFailed(e.to_string()),
            ClassificationError::ModelLoad(e) => ApiError::ModelUnavailable {
                model: e.model.to_string(),
                message: e.to_string(),
            },
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        let (error_type, detail, details) = match self {
            ApiError::InvalidRequest(msg) => ("invalid_request", msg.clone(), None),
            ApiError::ValidationError { field, message } => {
                let mut details = HashMap::new();
                details.insert(
                    "field".to_string(),
                    serde_json::Value::String(field.clone()),
                );
                ("validation_error", message.clone(), Some(details))
            }
            ApiError::ModelUnavailable { model, message } => {
                let mut details = HashMap::new();
                details.insert(
                    "model".to_string(),
                    serde_json::Value::String(model.clone()),
                );
                ("model_unavailable", message.clone(), Some(details))
            }
            ApiError::PreprocessingFailed(msg) => ("preprocessing_error", msg.clone(), None),
            ApiError::InferenceFailed(msg) => ("inference_error", msg.clone(), None),
            ApiError::InternalError(msg) => ("internal_error", msg.clone(), None),
        };

        ErrorResponse {
            detail,
            error_type: error_type.to_string(),
            details,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidRequest(_) | ApiError::ValidationError { .. } => 400,
            ApiError::ModelUnavailable { .. } => 503,
            ApiError::PreprocessingFailed(_)
            | ApiError::InferenceFailed(_)
            | ApiError::InternalError(_) => 500,
        }
    }
}

impl From<CrossbreedError> for ApiError {
    fn from(err: CrossbreedError) -> Self {
        let mut api_error = ApiError::from_classification(&err.source, err.parent.field_name());
        if let ApiError::PreprocessingFailed(msg) | ApiError::InferenceFailed(msg) = &mut api_error
        {
            *msg = format!("Crossbreed prediction failed for {}: {}", err.parent, msg);
        }
        api_error
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::ValidationError { field, message } => {
                write!(f, "Validation error for {}: {}", field, message)
            }
            ApiError::ModelUnavailable { message, .. } => {
                write!(f, "Model unavailable: {}", message)
            }
            ApiError::PreprocessingFailed(msg) => write!(f, "Preprocessing failed: {}", msg),
            ApiError::InferenceFailed(msg) => write!(f, "Inference failed: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        warn!("Request failed ({}): {}", status.as_u16(), self);

        (status, Json(self.to_response())).into_response()
    }
}

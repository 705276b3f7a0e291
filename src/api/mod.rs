// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod health;
pub mod http_server;
pub mod predict;

pub use errors::{ApiError, ErrorResponse};
pub use health::{health_handler, HealthResponse};
pub use http_server::{create_router, start_server, AppState, MAX_BODY_SIZE};
pub use predict::{
    predict_breed_handler, predict_crossbreed_handler, predict_disease_handler, UploadedFiles,
};

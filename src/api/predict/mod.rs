// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prediction API endpoints
//!
//! Provides POST /predict_breed, /predict_disease and /predict_crossbreed.

pub mod handler;
pub mod upload;

pub use handler::{
    predict_breed_handler, predict_crossbreed_handler, predict_disease_handler, FILE_FIELD,
};
pub use upload::UploadedFiles;

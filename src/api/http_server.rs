// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use super::health::health_handler;
use super::predict::{predict_breed_handler, predict_crossbreed_handler, predict_disease_handler};
use crate::pipeline::ClassificationService;
use crate::vision::MAX_IMAGE_SIZE;

/// Request body cap: two maximum-size images plus form overhead
pub const MAX_BODY_SIZE: usize = 2 * MAX_IMAGE_SIZE + 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ClassificationService>,
}

impl AppState {
    pub fn new(service: Arc<ClassificationService>) -> Self {
        Self { service }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_handler))
        // Prediction endpoints, with and without trailing slash
        .route("/predict_breed", post(predict_breed_handler))
        .route("/predict_breed/", post(predict_breed_handler))
        .route("/predict_disease", post(predict_disease_handler))
        .route("/predict_disease/", post(predict_disease_handler))
        .route("/predict_crossbreed", post(predict_crossbreed_handler))
        .route("/predict_crossbreed/", post(predict_crossbreed_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Serve the API until Ctrl+C
pub async fn start_server(addr: SocketAddr, service: Arc<ClassificationService>) -> Result<()> {
    let app = create_router(AppState::new(service));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("🚀 Cattle vision API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!("⚠️  Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

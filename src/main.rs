// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use cattle_vision_node::{
    api::start_server,
    config::ServerConfig,
    logging,
    pipeline::ClassificationService,
    version,
};
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_server()?;

    println!("📦 BUILD VERSION: {}", version::VERSION);
    info!("🚀 Starting {}", version::get_version_string());
    info!("📦 Features: {}", version::FEATURES.join(", "));

    let config = ServerConfig::load()?;
    let addr = config.socket_addr()?;

    info!("🧠 Breed model: {}", config.breed_model_path.display());
    info!("🧠 Disease model: {}", config.disease_model_path.display());
    info!(
        "   Device: {:?}, {} intra-op threads, {} concurrent inferences",
        config.device, config.intra_threads, config.max_concurrent_inferences
    );

    let service = Arc::new(ClassificationService::from_config(&config)?);

    if config.require_models {
        // Models are mandatory, refuse to serve until both are loaded
        let failures = service.registry().warm_up().await;
        if !failures.is_empty() {
            for failure in &failures {
                error!("✗ {}", failure);
            }
            anyhow::bail!("{} model(s) failed to load", failures.len());
        }
        info!("✅ Both models loaded");
    } else {
        // Load in the background, requests wait on the same load
        let registry = service.registry().clone();
        tokio::spawn(async move {
            let failures = registry.warm_up().await;
            if failures.is_empty() {
                info!("✅ Both models loaded");
            } else {
                for failure in failures {
                    warn!("⚠️  {} (affected endpoints will return 503)", failure);
                }
            }
        });
    }

    start_server(addr, service).await
}

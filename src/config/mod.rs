// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Server configuration
//!
//! Values come from environment variables (a `.env` file is honoured),
//! optionally overlaid by a TOML file named by `CATTLE_CONFIG`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::vision::DevicePreference;

/// Environment variable naming an optional TOML config file
pub const CONFIG_FILE_ENV: &str = "CATTLE_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub breed_model_path: PathBuf,
    pub disease_model_path: PathBuf,
    pub device: DevicePreference,
    /// ONNX Runtime intra-op threads per session
    pub intra_threads: usize,
    pub max_concurrent_inferences: usize,
    /// JSON file replacing the built-in reference tables
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
    /// JSON file with known parent-pair profiles
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cross_info_path: Option<PathBuf>,
    /// Refuse to start unless both models load
    pub require_models: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            breed_model_path: PathBuf::from("./models/breed_classifier.onnx"),
            disease_model_path: PathBuf::from("./models/disease_classifier.onnx"),
            device: DevicePreference::Auto,
            intra_threads: 4,
            max_concurrent_inferences: 4,
            catalog_path: None,
            cross_info_path: None,
            require_models: false,
        }
    }
}

impl ServerConfig {
    /// Load `.env`, environment variables and the optional TOML overlay
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let mut config = Self::from_env()?;

        if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
            config = config.overlay_file(&path)?;
            info!("Applied configuration file {}", path);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup, unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("API_LISTEN_ADDR") {
            config.listen_addr = addr;
        }
        if let Some(path) = lookup("BREED_MODEL_PATH") {
            config.breed_model_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("DISEASE_MODEL_PATH") {
            config.disease_model_path = PathBuf::from(path);
        }
        if let Some(device) = lookup("INFERENCE_DEVICE") {
            config.device = device.parse().context("Invalid INFERENCE_DEVICE")?;
        }
        if let Some(threads) = lookup("INFERENCE_THREADS") {
            config.intra_threads = threads
                .trim()
                .parse()
                .context("INFERENCE_THREADS must be a positive integer")?;
        }
        if let Some(max) = lookup("MAX_CONCURRENT_INFERENCES") {
            config.max_concurrent_inferences = max
                .trim()
                .parse()
                .context("MAX_CONCURRENT_INFERENCES must be a positive integer")?;
        }
        if let Some(path) = lookup("REFERENCE_CATALOG_PATH").filter(|p| !p.is_empty()) {
            config.catalog_path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup("CROSS_INFO_PATH").filter(|p| !p.is_empty()) {
            config.cross_info_path = Some(PathBuf::from(path));
        }
        if let Some(flag) = lookup("REQUIRE_MODELS") {
            config.require_models = parse_flag(&flag);
        }

        Ok(config)
    }

    /// Overlay keys present in a TOML file on top of this config
    pub fn overlay_file<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        self.overlay_toml(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn overlay_toml(self, content: &str) -> Result<Self> {
        let overlay: toml::Value = toml::from_str(content)?;
        let toml::Value::Table(overlay) = overlay else {
            anyhow::bail!("config root must be a table");
        };

        let mut base = toml::Value::try_from(&self)?;
        if let toml::Value::Table(base) = &mut base {
            for (key, value) in overlay {
                if !base.contains_key(&key) && !is_optional_key(&key) {
                    warn!("⚠️  Ignoring unknown config key '{}'", key);
                    continue;
                }
                base.insert(key, value);
            }
        }

        Ok(base.try_into()?)
    }

    pub fn validate(&self) -> Result<()> {
        self.socket_addr()?;
        if self.intra_threads == 0 {
            anyhow::bail!("intra_threads must be at least 1");
        }
        if self.max_concurrent_inferences == 0 {
            anyhow::bail!("max_concurrent_inferences must be at least 1");
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.listen_addr
            .parse()
            .with_context(|| format!("Invalid listen address '{}'", self.listen_addr))
    }
}

fn is_optional_key(key: &str) -> bool {
    matches!(key, "catalog_path" | "cross_info_path")
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

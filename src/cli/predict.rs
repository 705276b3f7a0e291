// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::pipeline::{ClassificationService, EnrichedPrediction};
use crate::vision::{detect_format, DevicePreference, ImageBlob, ModelKind};

/// Model and data options shared by every prediction command
#[derive(Args, Debug, Clone, Default)]
pub struct ModelArgs {
    /// Breed model (ONNX)
    #[arg(long, env = "BREED_MODEL_PATH")]
    pub breed_model: Option<PathBuf>,

    /// Disease model (ONNX)
    #[arg(long, env = "DISEASE_MODEL_PATH")]
    pub disease_model: Option<PathBuf>,

    /// Execution device (auto/cpu/cuda)
    #[arg(long, env = "INFERENCE_DEVICE")]
    pub device: Option<DevicePreference>,

    /// Reference catalog JSON replacing the built-in tables
    #[arg(long, env = "REFERENCE_CATALOG_PATH")]
    pub catalog: Option<PathBuf>,

    /// Known cross pairs JSON
    #[arg(long, env = "CROSS_INFO_PATH")]
    pub cross_info: Option<PathBuf>,

    /// Include the per-class probability distribution
    #[arg(long)]
    pub distribution: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

impl ModelArgs {
    /// Server configuration with command-line overrides applied
    pub fn to_config(&self) -> Result<ServerConfig> {
        let mut config = ServerConfig::load()?;

        if let Some(path) = &self.breed_model {
            config.breed_model_path = path.clone();
        }
        if let Some(path) = &self.disease_model {
            config.disease_model_path = path.clone();
        }
        if let Some(device) = self.device {
            config.device = device;
        }
        if let Some(path) = &self.catalog {
            config.catalog_path = Some(path.clone());
        }
        if let Some(path) = &self.cross_info {
            config.cross_info_path = Some(path.clone());
        }

        Ok(config)
    }
}

/// Arguments for the breed and disease commands
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Image to classify
    pub image: PathBuf,

    #[command(flatten)]
    pub models: ModelArgs,
}

/// Arguments for the crossbreed command
#[derive(Args, Debug)]
pub struct CrossbreedArgs {
    /// Photo of parent A
    pub parent_a: PathBuf,

    /// Photo of parent B
    pub parent_b: PathBuf,

    #[command(flatten)]
    pub models: ModelArgs,
}

/// Classify a single image and print the enriched prediction
pub async fn predict(kind: ModelKind, args: PredictArgs) -> Result<()> {
    let config = args.models.to_config()?;
    let service = ClassificationService::from_config(&config)?;

    let blob = read_image(&args.image)?;
    info!("Classifying {} with the {} model", args.image.display(), kind);

    let prediction = service.predict(kind, blob).await?;
    let output = prediction_json(&prediction, args.models.distribution)?;

    print_json(&output, args.models.pretty)
}

/// Classify two parents and print the crossbreed report
pub async fn crossbreed(args: CrossbreedArgs) -> Result<()> {
    let config = args.models.to_config()?;
    let service = ClassificationService::from_config(&config)?;

    let parent_a = read_image(&args.parent_a)?;
    let parent_b = read_image(&args.parent_b)?;

    let report = service.crossbreed(parent_a, parent_b).await?;

    let output = serde_json::json!({
        "parent_a": prediction_json(&report.parent_a, args.models.distribution)?,
        "parent_b": prediction_json(&report.parent_b, args.models.distribution)?,
        "crossbreed": report.crossbreed,
    });

    print_json(&output, args.models.pretty)
}

/// Print the class labels of both models
pub fn list_classes() -> Result<()> {
    let output: Map<String, Value> = ModelKind::ALL
        .iter()
        .map(|kind| {
            (
                kind.as_str().to_string(),
                Value::from(kind.class_names().to_vec()),
            )
        })
        .collect();

    print_json(&Value::Object(output), true)
}

/// Load an image file, declaring the media type its content sniffs as
pub fn read_image(path: &Path) -> Result<ImageBlob> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let content_type = detect_format(&bytes)
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| "application/octet-stream".to_string());
    debug!("{}: {} bytes, {}", path.display(), bytes.len(), content_type);

    let mut blob = ImageBlob::new(bytes, content_type);
    if let Some(name) = path.file_name() {
        blob = blob.with_filename(name.to_string_lossy());
    }
    Ok(blob)
}

/// Prediction as JSON, optionally with a `distribution` object
pub fn prediction_json(prediction: &EnrichedPrediction, with_distribution: bool) -> Result<Value> {
    let mut value = serde_json::to_value(prediction)?;

    if with_distribution {
        let distribution: Map<String, Value> = prediction
            .distribution()
            .into_iter()
            .map(|(label, p)| (label.to_string(), Value::from(p)))
            .collect();
        if let Value::Object(fields) = &mut value {
            fields.insert("distribution".to_string(), Value::Object(distribution));
        }
    }

    Ok(value)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", text);
    Ok(())
}

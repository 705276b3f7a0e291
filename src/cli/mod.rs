// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod predict;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::vision::ModelKind;

/// Cattle Vision CLI
#[derive(Parser, Debug)]
#[command(name = "cattle-cli")]
#[command(version)]
#[command(about = "Offline breed, disease and crossbreed predictions", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Predict the breed shown in an image
    Breed(predict::PredictArgs),

    /// Predict the disease shown in an image
    Disease(predict::PredictArgs),

    /// Predict both parents and summarize the cross
    Crossbreed(predict::CrossbreedArgs),

    /// List the class labels of both models
    Classes,
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Breed(args) => predict::predict(ModelKind::Breed, args).await,
        Commands::Disease(args) => predict::predict(ModelKind::Disease, args).await,
        Commands::Crossbreed(args) => predict::crossbreed(args).await,
        Commands::Classes => predict::list_classes(),
    }
}

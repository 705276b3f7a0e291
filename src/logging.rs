// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Log setup shared by the server and the CLI

use std::io;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Build the log filter from a `RUST_LOG` style directive, or `default_level`
/// when it is absent or unparsable
pub fn log_filter(directive: Option<&str>, default_level: &str) -> EnvFilter {
    directive
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level))
}

/// Install the global subscriber, honouring `RUST_LOG`
pub fn init<W>(default_level: &str, writer: W) -> anyhow::Result<()>
where
    W: for<'w> fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    let directive = std::env::var("RUST_LOG").ok();
    tracing_subscriber::registry()
        .with(log_filter(directive.as_deref(), default_level))
        .with(fmt::layer().with_writer(writer))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to init logging: {}", e))
}

/// Server logging: stdout, `info` by default
pub fn init_server() -> anyhow::Result<()> {
    init("info", io::stdout)
}

/// CLI logging: stderr so stdout stays pure JSON, `warn` by default
pub fn init_cli() -> anyhow::Result<()> {
    init("warn", io::stderr)
}

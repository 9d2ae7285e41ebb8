// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava-Sync command line entry point
//!
//! Meant to run from cron: renews the access token if needed, then pulls
//! new activities into the local JSON file.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use strava_sync::{config::Config, SyncEngine, SyncMode};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "strava-sync")]
#[command(about = "Mirror your Strava activities into a local JSON file")]
#[command(version)]
struct Cli {
    /// Replace the local file with the most recent activities instead of appending new ones
    #[arg(long)]
    full_refresh: bool,

    /// Maximum number of activities to fetch
    #[arg(long, default_value_t = 30)]
    limit: usize,

    /// Env file holding CLIENT_ID, CLIENT_SECRET and the OAuth tokens
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,

    /// Activity store (overrides ACTIVITIES_FILE)
    #[arg(long)]
    activities_file: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_logging()?;

    let cli = Cli::parse();

    let mut config = Config::from_env_file(&cli.env_file).context("Configuration error")?;
    if let Some(path) = cli.activities_file {
        config.activities_file = path;
    }

    let mode = if cli.full_refresh {
        SyncMode::FullRefresh
    } else {
        SyncMode::Incremental
    };

    tracing::info!(
        %mode,
        limit = cli.limit,
        activities_file = %config.activities_file.display(),
        "Starting Strava activities update"
    );

    let mut engine = SyncEngine::from_config(&config)?;
    match engine.synchronize(mode, cli.limit).await {
        Ok(report) => {
            tracing::info!(
                added = report.added,
                skipped = report.skipped,
                total = report.total,
                "Update finished"
            );
            Ok(())
        }
        Err(e) => {
            if e.requires_reauthorization() {
                tracing::error!(error = %e, "Stored credentials are unusable, re-run authorization");
            } else if e.is_retryable() {
                tracing::error!(error = %e, "Update failed, safe to retry later");
            } else {
                tracing::error!(error = %e, "Update failed");
            }
            Err(e.into())
        }
    }
}

/// Initialize structured JSON logging.
fn init_logging() -> anyhow::Result<()> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("strava_sync=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}

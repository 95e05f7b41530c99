//! Startup sequence: logging, upstream login, and the metrics listener.

use std::sync::Arc;

use clap::Parser;
use qbt_exporter_client::QbittorrentClient;
use qbt_exporter_telemetry::{GlobalContextGuard, LoggingConfig, build_sha};
use tracing::{error, info};

use crate::cli::Cli;
use crate::error::{AppError, AppResult};
use crate::http::ExporterServer;
use crate::scrape::exporter_metrics;

/// Entry point for the exporter binary.
///
/// # Errors
///
/// Returns an error if logging cannot be installed, login fails, or the listener stops.
pub async fn run_app() -> AppResult<()> {
    run_app_with(Cli::parse()).await
}

/// Boot the exporter with pre-parsed flags.
///
/// # Errors
///
/// Returns an error if logging cannot be installed, login fails, or the listener stops.
pub async fn run_app_with(cli: Cli) -> AppResult<()> {
    let logging = LoggingConfig {
        level: &cli.log_level,
        format: cli.resolved_log_format(),
        build_sha: build_sha(),
    };
    qbt_exporter_telemetry::init_logging(&logging)
        .map_err(|err| AppError::telemetry("telemetry.init", err))?;
    let _context = GlobalContextGuard::new(cli.address.clone());

    info!("qBittorrent exporter starting");
    let result = launch(&cli).await;
    if let Err(err) = &result {
        error!(error = %err, "exporter terminated with error");
    }
    result
}

pub(crate) async fn launch(cli: &Cli) -> AppResult<()> {
    let addr = cli.bind_addr().await?;
    let telemetry =
        exporter_metrics().map_err(|err| AppError::telemetry("telemetry.metrics", err))?;

    let client = QbittorrentClient::new(&cli.address)
        .map_err(|err| AppError::client("client.new", err))?;
    client
        .login(&cli.username, &cli.password)
        .await
        .map_err(|err| AppError::client("client.login", err))?;
    info!(upstream = %client.base_url(), "logged in to qBittorrent");

    info!(addr = %addr, "launching metrics listener");
    ExporterServer::new(Arc::new(client), telemetry)
        .serve(addr)
        .await
}

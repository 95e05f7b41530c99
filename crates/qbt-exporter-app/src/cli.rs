//! Command-line flags for the exporter; every flag can also come from the environment.

use std::net::SocketAddr;

use clap::Parser;
use qbt_exporter_telemetry::{DEFAULT_LOG_LEVEL, LogFormat};
use tokio::net::lookup_host;

use crate::error::{AppError, AppResult};

const DEFAULT_ADDRESS: &str = "localhost:8080";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8885;
const DEFAULT_USERNAME: &str = "admin";
const DEFAULT_PASSWORD: &str = "adminadmin";

/// Prometheus exporter for the qBittorrent Web API.
#[derive(Debug, Clone, Parser)]
#[command(name = "qbittorrent-exporter", version)]
pub struct Cli {
    /// qBittorrent address to connect (`host:port`).
    #[arg(long, env = "QBITTORRENT_EXPORTER_ADDRESS", default_value = DEFAULT_ADDRESS)]
    pub address: String,
    /// Host name or IP address the metrics listener binds to.
    #[arg(long, env = "QBITTORRENT_EXPORTER_HOST", default_value = DEFAULT_HOST)]
    pub host: String,
    /// Port the metrics listener binds to; must be non-zero.
    #[arg(long, env = "QBITTORRENT_EXPORTER_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// qBittorrent Web UI username.
    #[arg(long, env = "QBITTORRENT_EXPORTER_USERNAME", default_value = DEFAULT_USERNAME)]
    pub username: String,
    /// qBittorrent Web UI password.
    #[arg(
        long,
        env = "QBITTORRENT_EXPORTER_PASSWORD",
        default_value = DEFAULT_PASSWORD,
        hide_env_values = true,
        hide_default_value = true
    )]
    pub password: String,
    /// Log output format (`json` or `pretty`); defaults to the build profile's choice.
    #[arg(long, env = "QBITTORRENT_EXPORTER_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,
    /// Log level used when `RUST_LOG` is unset.
    #[arg(long, env = "QBITTORRENT_EXPORTER_LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,
}

impl Cli {
    /// Socket address for the metrics listener; the first resolved address wins.
    ///
    /// # Errors
    ///
    /// Returns an error when the port is zero, the host cannot be resolved, or
    /// it resolves to no address.
    pub async fn bind_addr(&self) -> AppResult<SocketAddr> {
        if self.port == 0 {
            return Err(AppError::InvalidConfig {
                field: "port",
                reason: "port 0 would bind a random port that scrapers cannot be pointed at",
                value: Some(self.port.to_string()),
            });
        }
        let mut resolved = lookup_host((self.host.as_str(), self.port))
            .await
            .map_err(|source| AppError::Resolve {
                host: self.host.clone(),
                source,
            })?;
        resolved.next().ok_or_else(|| AppError::InvalidConfig {
            field: "host",
            reason: "host resolved to no addresses",
            value: Some(self.host.clone()),
        })
    }

    /// Log format requested on the command line, or the build default.
    #[must_use]
    pub fn resolved_log_format(&self) -> LogFormat {
        self.log_format.unwrap_or_else(LogFormat::infer)
    }
}

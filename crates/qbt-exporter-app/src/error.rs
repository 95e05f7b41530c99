//! # Design
//!
//! - Centralize application-level errors for bootstrap and serving.
//! - Keep error messages constant while carrying context fields for debugging.
//! - Preserve source errors without re-logging at call sites.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Telemetry operations failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: qbt_exporter_telemetry::TelemetryError,
    },
    /// qBittorrent client operations failed.
    #[error("qbittorrent client operation failed")]
    Client {
        /// Operation identifier.
        operation: &'static str,
        /// Source client error.
        source: qbt_exporter_client::ClientError,
    },
    /// Configuration values were invalid.
    #[error("invalid configuration")]
    InvalidConfig {
        /// Field name that failed validation.
        field: &'static str,
        /// Machine-readable reason for the failure.
        reason: &'static str,
        /// Optional value associated with the failure.
        value: Option<String>,
    },
    /// Resolving the listener host failed.
    #[error("failed to resolve listener host")]
    Resolve {
        /// Host name as configured.
        host: String,
        /// Underlying resolver error.
        source: io::Error,
    },
    /// Binding the metrics listener failed.
    #[error("failed to bind metrics listener")]
    Bind {
        /// Address attempted.
        addr: SocketAddr,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Serving the metrics endpoint failed.
    #[error("metrics server terminated unexpectedly")]
    Serve {
        /// Underlying IO error.
        source: io::Error,
    },
}

impl AppError {
    pub(crate) const fn telemetry(
        operation: &'static str,
        source: qbt_exporter_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) const fn client(
        operation: &'static str,
        source: qbt_exporter_client::ClientError,
    ) -> Self {
        Self::Client { operation, source }
    }
}

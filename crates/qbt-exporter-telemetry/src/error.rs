//! # Design
//!
//! - One error type for logging setup and the exporter registry.
//! - Registry failures name the series and the stage that failed.

use std::fmt::{self, Display, Formatter};

use thiserror::Error;

/// Result alias for telemetry operations.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Point in a series' lifecycle where the registry gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesStage {
    /// Building the collector from its options and label names.
    Build,
    /// Adding the collector to the exporter registry.
    Register,
}

impl Display for SeriesStage {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Build => "build",
            Self::Register => "register",
        })
    }
}

/// Errors raised while installing logging or maintaining the exporter registry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Installing the tracing subscriber failed.
    #[error("failed to install tracing subscriber")]
    SubscriberInstall {
        /// Underlying tracing subscriber error.
        source: tracing_subscriber::util::TryInitError,
    },
    /// A qBittorrent series could not be built or registered.
    #[error("series `{series}` failed to {stage}")]
    Series {
        /// Series name, e.g. `qbittorrent_torrent_state`.
        series: &'static str,
        /// Stage that failed.
        stage: SeriesStage,
        /// Underlying Prometheus error.
        source: prometheus::Error,
    },
    /// A labelled series was given no label values to pre-register.
    #[error("series `{series}` has no label values")]
    MissingLabels {
        /// Series name.
        series: &'static str,
    },
    /// Encoding the exposition failed.
    #[error("failed to encode the qbittorrent exposition")]
    Encode {
        /// Underlying Prometheus error.
        source: prometheus::Error,
    },
    /// The encoded exposition was not valid UTF-8.
    #[error("qbittorrent exposition was not valid utf-8")]
    NotUtf8 {
        /// Underlying UTF-8 conversion error.
        source: std::string::FromUtf8Error,
    },
}

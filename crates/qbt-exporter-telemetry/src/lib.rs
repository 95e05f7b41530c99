#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! Telemetry primitives for the qBittorrent exporter.
//!
//! This crate owns logging initialisation, request-id middleware, and the
//! Prometheus registry that carries every exported qBittorrent series.
//!
//! Layout: `init.rs` (subscriber setup), `context.rs` (application span),
//! `layers.rs` (request-id and trace layers), `metrics.rs` (registry), `error.rs`.

pub mod context;
pub mod error;
pub mod init;
pub mod layers;
pub mod metrics;

pub use context::GlobalContextGuard;
pub use error::{Result, SeriesStage, TelemetryError};
pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging};
pub use layers::{
    REQUEST_ID_HEADER, http_trace_layer, propagate_request_id_layer, set_request_id_layer,
};
pub use metrics::{Metrics, MetricsSnapshot, SeriesLabels};

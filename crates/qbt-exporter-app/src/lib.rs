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

//! qBittorrent exporter wiring.
//!
//! Layout:
//! - `cli.rs`: flags and environment overrides
//! - `bootstrap.rs`: logging, login, and listener startup
//! - `scrape.rs`: upstream fetch and fold into the metrics registry
//! - `http/`: router, handlers, and problem responses

/// Startup sequence for the exporter binary.
pub mod bootstrap;
/// Command-line configuration.
pub mod cli;
/// Application-level errors.
pub mod error;
/// HTTP surface serving the exposition.
pub mod http;
/// Upstream scrape and registry update.
pub mod scrape;

pub use bootstrap::run_app;
pub use error::{AppError, AppResult};

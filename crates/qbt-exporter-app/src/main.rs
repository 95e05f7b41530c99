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

//! Binary entrypoint for the qBittorrent Prometheus exporter.

use qbt_exporter_app::{AppResult, run_app};

/// Parses flags, logs in to qBittorrent, and serves `/metrics` until shutdown.
#[tokio::main]
async fn main() -> AppResult<()> {
    run_app().await
}

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

//! Typed client for the qBittorrent Web API (`/api/v2`).
//!
//! Layout:
//! - `client.rs`: authenticated session and one method per upstream endpoint
//! - `models.rs`: response payloads the exporter reads
//! - `error.rs`: transport, status, and decoding failures

pub mod client;
pub mod error;
pub mod models;

pub use client::QbittorrentClient;
pub use error::{ClientError, ClientResult};
pub use models::{
    ConnectionStatus, PeerLogEntry, TorrentProperties, TorrentState, TorrentSummary,
    TorrentTracker, TransferInfo,
};

//! Shared state handed to every handler.

use std::sync::Arc;

use qbt_exporter_telemetry::Metrics;

use crate::scrape::QbittorrentSource;

/// Upstream source and the registry it feeds.
pub(crate) struct ExporterState {
    pub(crate) source: Arc<dyn QbittorrentSource>,
    pub(crate) telemetry: Metrics,
}

impl ExporterState {
    pub(crate) const fn new(source: Arc<dyn QbittorrentSource>, telemetry: Metrics) -> Self {
        Self { source, telemetry }
    }
}

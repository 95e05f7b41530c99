//! Shared HTTP constants (content types, problem URIs, landing text).

pub(crate) const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

pub(crate) const PROBLEM_INTERNAL: &str = "urn:qbt-exporter:problem:internal";
pub(crate) const PROBLEM_UPSTREAM: &str = "urn:qbt-exporter:problem:upstream";

pub(crate) const INDEX_BODY: &str = "qBittorrent exporter\n\nMetrics are served at /metrics\n";

//! Prometheus-backed registry for the exported qBittorrent series.
//!
//! # Design
//! - Owns a dedicated [`Registry`]; nothing is registered on the process-wide default.
//! - Every series exists from construction so the exposition is stable before the first scrape.
//! - Scrapes are applied and rendered under one lock so a response reflects exactly one scrape.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use prometheus::core::Collector;
use prometheus::{Encoder, IntGauge, IntGaugeVec, Opts, Registry, TextEncoder};
use serde::Serialize;

use crate::error::{Result, SeriesStage, TelemetryError};

/// Label values pre-registered for the two labelled series.
///
/// Values outside these sets are never exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesLabels {
    /// Values of the `qbittorrent_status` label.
    pub connection_states: &'static [&'static str],
    /// Values of the `state` label on `qbittorrent_torrent_state`.
    pub torrent_states: &'static [&'static str],
}

const STATUS_METRIC: &str = "qbittorrent_status";
const TORRENT_STATE_METRIC: &str = "qbittorrent_torrent_state";

/// Registry of qBittorrent gauges shared with the HTTP surface.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    labels: SeriesLabels,
    scrape_lock: Mutex<()>,
    peers_blocked: IntGauge,
    status: IntGaugeVec,
    dht_nodes: IntGauge,
    dl_info_data: IntGauge,
    dl_info_speed: IntGauge,
    up_info_data: IntGauge,
    up_info_speed: IntGauge,
    torrent_state: IntGaugeVec,
}

/// Point-in-time copy of every exported value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Peers flagged as blocked in the peer log.
    pub peers_blocked: i64,
    /// Active connection state, when one is selected.
    pub connection_status: Option<String>,
    /// Connected DHT nodes.
    pub dht_nodes: i64,
    /// Session download total in bytes.
    pub dl_info_data: i64,
    /// Download rate in bytes per second.
    pub dl_info_speed: i64,
    /// Session upload total in bytes.
    pub up_info_data: i64,
    /// Upload rate in bytes per second.
    pub up_info_speed: i64,
    /// Torrent count per known state.
    pub torrent_states: BTreeMap<String, i64>,
}

impl Metrics {
    /// Construct the registry with every qBittorrent collector registered and
    /// one zeroed series per label value.
    ///
    /// # Errors
    ///
    /// Returns an error if a label set is empty or any of the Prometheus
    /// collectors cannot be built or registered.
    pub fn new(labels: SeriesLabels) -> Result<Self> {
        if labels.connection_states.is_empty() {
            return Err(TelemetryError::MissingLabels {
                series: STATUS_METRIC,
            });
        }
        if labels.torrent_states.is_empty() {
            return Err(TelemetryError::MissingLabels {
                series: TORRENT_STATE_METRIC,
            });
        }
        let registry = Registry::new();

        let peers_blocked = gauge("qbittorrent_peers_blocked", "Blocked peers in the peer log")?;
        let status = gauge_vec(
            STATUS_METRIC,
            "qBittorrent connection status",
            &[STATUS_METRIC],
        )?;
        let dht_nodes = gauge("qbittorrent_dht_nodes", "Connected DHT nodes")?;
        let dl_info_data = gauge(
            "qbittorrent_dl_info_data",
            "Data downloaded this session (bytes)",
        )?;
        let dl_info_speed = gauge(
            "qbittorrent_dl_info_speed",
            "Global download rate (bytes/s)",
        )?;
        let up_info_data = gauge(
            "qbittorrent_up_info_data",
            "Data uploaded this session (bytes)",
        )?;
        let up_info_speed = gauge("qbittorrent_up_info_speed", "Global upload rate (bytes/s)")?;
        let torrent_state = gauge_vec(
            TORRENT_STATE_METRIC,
            "Number of torrents per state",
            &["state"],
        )?;

        for state in labels.connection_states {
            status.with_label_values(&[*state]).set(0);
        }
        for state in labels.torrent_states {
            torrent_state.with_label_values(&[*state]).set(0);
        }

        register(&registry, "qbittorrent_peers_blocked", &peers_blocked)?;
        register(&registry, STATUS_METRIC, &status)?;
        register(&registry, "qbittorrent_dht_nodes", &dht_nodes)?;
        register(&registry, "qbittorrent_dl_info_data", &dl_info_data)?;
        register(&registry, "qbittorrent_dl_info_speed", &dl_info_speed)?;
        register(&registry, "qbittorrent_up_info_data", &up_info_data)?;
        register(&registry, "qbittorrent_up_info_speed", &up_info_speed)?;
        register(&registry, TORRENT_STATE_METRIC, &torrent_state)?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                labels,
                scrape_lock: Mutex::new(()),
                peers_blocked,
                status,
                dht_nodes,
                dl_info_data,
                dl_info_speed,
                up_info_data,
                up_info_speed,
                torrent_state,
            }),
        })
    }

    /// Set the blocked peer gauge.
    pub fn set_peers_blocked(&self, count: u64) {
        self.inner.peers_blocked.set(saturating_i64(count));
    }

    /// Select the active connection state; `None` clears every state.
    ///
    /// Values outside [`SeriesLabels::connection_states`] behave like `None`.
    pub fn set_connection_status(&self, status: Option<&str>) {
        for state in self.inner.labels.connection_states {
            let active = status == Some(*state);
            self.inner
                .status
                .with_label_values(&[*state])
                .set(i64::from(active));
        }
    }

    /// Set the DHT node gauge.
    pub fn set_dht_nodes(&self, nodes: u64) {
        self.inner.dht_nodes.set(saturating_i64(nodes));
    }

    /// Set the session download total.
    pub fn set_dl_info_data(&self, bytes: u64) {
        self.inner.dl_info_data.set(saturating_i64(bytes));
    }

    /// Set the global download rate.
    pub fn set_dl_info_speed(&self, bytes_per_sec: u64) {
        self.inner.dl_info_speed.set(saturating_i64(bytes_per_sec));
    }

    /// Set the session upload total.
    pub fn set_up_info_data(&self, bytes: u64) {
        self.inner.up_info_data.set(saturating_i64(bytes));
    }

    /// Set the global upload rate.
    pub fn set_up_info_speed(&self, bytes_per_sec: u64) {
        self.inner.up_info_speed.set(saturating_i64(bytes_per_sec));
    }

    /// Set the torrent count for one state. Labels outside
    /// [`SeriesLabels::torrent_states`] are ignored.
    pub fn set_torrent_state(&self, state: &str, count: u64) {
        let labels = self.inner.labels.torrent_states;
        if !labels.iter().any(|known| *known == state) {
            return;
        }
        self.inner
            .torrent_state
            .with_label_values(&[state])
            .set(saturating_i64(count));
    }

    /// Apply a scrape and render the registry while holding the scrape lock.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry cannot be encoded.
    pub fn apply_and_render<F>(&self, apply: F) -> Result<String>
    where
        F: FnOnce(&Self),
    {
        let _guard = self
            .inner
            .scrape_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        apply(self);
        self.render()
    }

    /// Render the metrics registry using the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if the metrics cannot be encoded or if the encoded
    /// buffer is not valid UTF-8.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|source| TelemetryError::Encode { source })?;
        String::from_utf8(buffer).map_err(|source| TelemetryError::NotUtf8 { source })
    }

    /// Take a point-in-time snapshot of every exported value.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let labels = self.inner.labels;
        let connection_status = labels
            .connection_states
            .iter()
            .copied()
            .find(|state| self.inner.status.with_label_values(&[*state]).get() == 1)
            .map(str::to_string);
        let torrent_states = labels
            .torrent_states
            .iter()
            .copied()
            .map(|state| {
                (
                    state.to_string(),
                    self.inner.torrent_state.with_label_values(&[state]).get(),
                )
            })
            .collect();

        MetricsSnapshot {
            peers_blocked: self.inner.peers_blocked.get(),
            connection_status,
            dht_nodes: self.inner.dht_nodes.get(),
            dl_info_data: self.inner.dl_info_data.get(),
            dl_info_speed: self.inner.dl_info_speed.get(),
            up_info_data: self.inner.up_info_data.get(),
            up_info_speed: self.inner.up_info_speed.get(),
            torrent_states,
        }
    }
}

fn gauge(series: &'static str, help: &str) -> Result<IntGauge> {
    IntGauge::with_opts(Opts::new(series, help)).map_err(|source| TelemetryError::Series {
        series,
        stage: SeriesStage::Build,
        source,
    })
}

fn gauge_vec(series: &'static str, help: &str, labels: &[&str]) -> Result<IntGaugeVec> {
    IntGaugeVec::new(Opts::new(series, help), labels).map_err(|source| TelemetryError::Series {
        series,
        stage: SeriesStage::Build,
        source,
    })
}

fn register<C>(registry: &Registry, series: &'static str, collector: &C) -> Result<()>
where
    C: Collector + Clone + 'static,
{
    registry
        .register(Box::new(collector.clone()))
        .map_err(|source| TelemetryError::Series {
            series,
            stage: SeriesStage::Register,
            source,
        })
}

/// Convert an upstream counter to a gauge value, saturating at `i64::MAX`.
fn saturating_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

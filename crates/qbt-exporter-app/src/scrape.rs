//! Upstream scrape and fold into the metrics registry.
//!
//! # Design
//! - Fetch all three upstream resources first, without holding any lock.
//! - Fold them into an immutable [`ScrapeSnapshot`]; the registry is only
//!   touched once the whole scrape has succeeded.

use std::collections::BTreeMap;

use async_trait::async_trait;
use qbt_exporter_client::{
    ClientResult, ConnectionStatus, PeerLogEntry, QbittorrentClient, TorrentState, TorrentSummary,
    TransferInfo,
};
use qbt_exporter_telemetry::{Metrics, SeriesLabels};
use tracing::warn;

/// Label values the registry exports, taken from the upstream models.
pub const SERIES_LABELS: SeriesLabels = SeriesLabels {
    connection_states: &ConnectionStatus::LABELS,
    torrent_states: &TorrentState::LABELS,
};

/// Registry carrying every series for the known upstream states.
///
/// # Errors
///
/// Returns an error if a collector cannot be built or registered.
pub fn exporter_metrics() -> qbt_exporter_telemetry::Result<Metrics> {
    Metrics::new(SERIES_LABELS)
}

/// Upstream resources read on every scrape.
#[async_trait]
pub trait QbittorrentSource: Send + Sync {
    /// Fetch the peer log.
    async fn peer_log(&self) -> ClientResult<Vec<PeerLogEntry>>;
    /// Fetch global transfer information.
    async fn transfer_info(&self) -> ClientResult<TransferInfo>;
    /// Fetch the torrent list.
    async fn torrents_info(&self) -> ClientResult<Vec<TorrentSummary>>;
}

#[async_trait]
impl QbittorrentSource for QbittorrentClient {
    async fn peer_log(&self) -> ClientResult<Vec<PeerLogEntry>> {
        Self::peer_log(self).await
    }

    async fn transfer_info(&self) -> ClientResult<TransferInfo> {
        Self::transfer_info(self).await
    }

    async fn torrents_info(&self) -> ClientResult<Vec<TorrentSummary>> {
        Self::torrents_info(self).await
    }
}

/// Values gathered by one complete scrape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeSnapshot {
    /// Blocked entries in the peer log.
    pub blocked_peers: u64,
    /// Transfer information as returned by the upstream.
    pub transfer: TransferInfo,
    /// Torrent count per known state; unknown states are absent.
    pub torrent_states: BTreeMap<TorrentState, u64>,
}

impl ScrapeSnapshot {
    /// Fold raw upstream responses into a snapshot.
    #[must_use]
    pub fn from_parts(
        peers: &[PeerLogEntry],
        transfer: TransferInfo,
        torrents: &[TorrentSummary],
    ) -> Self {
        Self {
            blocked_peers: count_blocked(peers),
            transfer,
            torrent_states: count_states(torrents),
        }
    }

    /// Overwrite every registry value with this snapshot.
    pub fn apply_to(&self, metrics: &Metrics) {
        metrics.set_peers_blocked(self.blocked_peers);

        let status = self.transfer.connection_status;
        if status == ConnectionStatus::Unknown {
            warn!("qBittorrent reported an unrecognised connection status");
        }
        metrics.set_connection_status(status.as_str());
        metrics.set_dht_nodes(self.transfer.dht_nodes);
        metrics.set_dl_info_data(self.transfer.dl_info_data);
        metrics.set_dl_info_speed(self.transfer.dl_info_speed);
        metrics.set_up_info_data(self.transfer.up_info_data);
        metrics.set_up_info_speed(self.transfer.up_info_speed);

        for state in TorrentState::KNOWN {
            if let Some(label) = state.as_str() {
                let count = self.torrent_states.get(&state).copied().unwrap_or(0);
                metrics.set_torrent_state(label, count);
            }
        }
    }
}

/// Fetch peer log, transfer info, and torrent list, in that order.
///
/// # Errors
///
/// Returns the first upstream failure; later calls are not attempted.
pub async fn scrape<S>(source: &S) -> ClientResult<ScrapeSnapshot>
where
    S: QbittorrentSource + ?Sized,
{
    let peers = source.peer_log().await?;
    let transfer = source.transfer_info().await?;
    let torrents = source.torrents_info().await?;
    Ok(ScrapeSnapshot::from_parts(&peers, transfer, &torrents))
}

/// Number of peer log entries flagged as blocked.
#[must_use]
pub fn count_blocked(peers: &[PeerLogEntry]) -> u64 {
    let blocked = peers.iter().filter(|entry| entry.blocked).count();
    u64::try_from(blocked).unwrap_or(u64::MAX)
}

/// Torrent count per known state. Unrecognised states are dropped.
#[must_use]
pub fn count_states(torrents: &[TorrentSummary]) -> BTreeMap<TorrentState, u64> {
    let mut counts = BTreeMap::new();
    for torrent in torrents {
        if torrent.state == TorrentState::Unknown {
            continue;
        }
        *counts.entry(torrent.state).or_insert(0) += 1;
    }
    counts
}

//! Response payloads returned by the qBittorrent Web API.
//!
//! Only the fields the exporter reads are typed; everything else is either
//! optional or captured raw so upstream additions never break decoding.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Entry from `log/peers`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PeerLogEntry {
    /// Whether the peer was blocked.
    pub blocked: bool,
    /// Log entry identifier.
    #[serde(default)]
    pub id: Option<i64>,
    /// Peer address.
    #[serde(default)]
    pub ip: Option<String>,
    /// Reason recorded for the block.
    #[serde(default)]
    pub reason: Option<String>,
    /// Milliseconds since the epoch.
    #[serde(default)]
    pub timestamp: Option<i64>,
}

/// Global transfer information from `transfer/info`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransferInfo {
    /// Connection status of the session.
    pub connection_status: ConnectionStatus,
    /// Connected DHT nodes.
    pub dht_nodes: u64,
    /// Data downloaded this session (bytes).
    pub dl_info_data: u64,
    /// Global download rate (bytes/s).
    pub dl_info_speed: u64,
    /// Data uploaded this session (bytes).
    pub up_info_data: u64,
    /// Global upload rate (bytes/s).
    pub up_info_speed: u64,
}

/// Connection status reported by qBittorrent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// Connected and reachable.
    Connected,
    /// Connected but not reachable from outside.
    Firewalled,
    /// No network connection.
    Disconnected,
    /// Any value this exporter does not recognise.
    #[serde(other)]
    Unknown,
}

impl ConnectionStatus {
    /// Every status the exporter selects between, in exposition order.
    pub const KNOWN: [Self; 3] = [Self::Connected, Self::Firewalled, Self::Disconnected];

    /// Wire labels of [`Self::KNOWN`], in the same order.
    pub const LABELS: [&'static str; 3] = {
        let mut labels = [""; 3];
        let mut index = 0;
        while index < labels.len() {
            if let Some(label) = Self::KNOWN[index].as_str() {
                labels[index] = label;
            }
            index += 1;
        }
        labels
    };

    /// Wire label for the status, `None` when unrecognised.
    #[must_use]
    pub const fn as_str(self) -> Option<&'static str> {
        match self {
            Self::Connected => Some("connected"),
            Self::Firewalled => Some("firewalled"),
            Self::Disconnected => Some("disconnected"),
            Self::Unknown => None,
        }
    }
}

/// Torrent entry from `torrents/info`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TorrentSummary {
    /// Current torrent state.
    pub state: TorrentState,
    /// Info hash.
    #[serde(default)]
    pub hash: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
}

/// Torrent states tracked by the exporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub enum TorrentState {
    /// Some error occurred.
    #[serde(rename = "error")]
    Error,
    /// Finished and paused.
    #[serde(rename = "pausedUP")]
    PausedUp,
    /// Paused before finishing.
    #[serde(rename = "pausedDL")]
    PausedDl,
    /// Queued for seeding.
    #[serde(rename = "queuedUP")]
    QueuedUp,
    /// Queued for download.
    #[serde(rename = "queuedDL")]
    QueuedDl,
    /// Seeding with data flowing.
    #[serde(rename = "uploading")]
    Uploading,
    /// Seeding without connections.
    #[serde(rename = "stalledUP")]
    StalledUp,
    /// Rechecking after finishing.
    #[serde(rename = "checkingUP")]
    CheckingUp,
    /// Rechecking before finishing.
    #[serde(rename = "checkingDL")]
    CheckingDl,
    /// Downloading with data flowing.
    #[serde(rename = "downloading")]
    Downloading,
    /// Downloading without connections.
    #[serde(rename = "stalledDL")]
    StalledDl,
    /// Fetching metadata.
    #[serde(rename = "metaDL")]
    MetaDl,
    /// Any other state string.
    #[serde(other)]
    Unknown,
}

impl TorrentState {
    /// Every state the exporter counts, in exposition order.
    pub const KNOWN: [Self; 12] = [
        Self::Error,
        Self::PausedUp,
        Self::PausedDl,
        Self::QueuedUp,
        Self::QueuedDl,
        Self::Uploading,
        Self::StalledUp,
        Self::CheckingUp,
        Self::CheckingDl,
        Self::Downloading,
        Self::StalledDl,
        Self::MetaDl,
    ];

    /// Wire labels of [`Self::KNOWN`], in the same order.
    pub const LABELS: [&'static str; 12] = {
        let mut labels = [""; 12];
        let mut index = 0;
        while index < labels.len() {
            if let Some(label) = Self::KNOWN[index].as_str() {
                labels[index] = label;
            }
            index += 1;
        }
        labels
    };

    /// Wire label for the state, `None` when unrecognised.
    #[must_use]
    pub const fn as_str(self) -> Option<&'static str> {
        match self {
            Self::Error => Some("error"),
            Self::PausedUp => Some("pausedUP"),
            Self::PausedDl => Some("pausedDL"),
            Self::QueuedUp => Some("queuedUP"),
            Self::QueuedDl => Some("queuedDL"),
            Self::Uploading => Some("uploading"),
            Self::StalledUp => Some("stalledUP"),
            Self::CheckingUp => Some("checkingUP"),
            Self::CheckingDl => Some("checkingDL"),
            Self::Downloading => Some("downloading"),
            Self::StalledDl => Some("stalledDL"),
            Self::MetaDl => Some("metaDL"),
            Self::Unknown => None,
        }
    }
}

/// Generic properties from `torrents/properties`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TorrentProperties {
    /// Save path of the torrent.
    #[serde(default)]
    pub save_path: Option<String>,
    /// Total size in bytes.
    #[serde(default)]
    pub total_size: Option<i64>,
    /// Remaining fields, untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Tracker entry from `torrents/trackers`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TorrentTracker {
    /// Tracker URL (pseudo-URLs such as `** [DHT] **` included).
    pub url: String,
    /// Tracker status code.
    #[serde(default)]
    pub status: Option<i64>,
    /// Last tracker message.
    #[serde(default)]
    pub msg: Option<String>,
    /// Remaining fields, untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

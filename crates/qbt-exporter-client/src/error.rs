//! # Design
//!
//! - One error type for every upstream call; the caller decides what is fatal.
//! - Carry the endpoint so failures can be traced to a single request.
//! - Upstream error payloads are never interpreted beyond the HTTP status.

use thiserror::Error;

/// Result alias for upstream client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Failures raised while talking to the qBittorrent Web API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configured address does not form a valid base URL.
    #[error("invalid qBittorrent address '{address}'")]
    InvalidAddress {
        /// Address supplied by the operator.
        address: String,
        /// Underlying URL parse error.
        source: url::ParseError,
    },
    /// Building the HTTP client failed.
    #[error("failed to build http client")]
    Build {
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
    /// The request could not be sent or the connection failed.
    #[error("request to {endpoint} failed")]
    Transport {
        /// Endpoint URL.
        endpoint: String,
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
    /// The upstream answered with a non-success status.
    #[error("{endpoint} returned status {status}")]
    Status {
        /// Endpoint URL.
        endpoint: String,
        /// HTTP status code returned by the upstream.
        status: u16,
    },
    /// The response body could not be read or decoded.
    #[error("failed to decode response from {endpoint}")]
    Decode {
        /// Endpoint URL.
        endpoint: String,
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
    /// The upstream accepted the request but rejected the credentials.
    #[error("qBittorrent rejected the credentials for user '{username}'")]
    LoginRejected {
        /// Username used for the attempt.
        username: String,
    },
}

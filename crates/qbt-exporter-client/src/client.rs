//! Authenticated session against the qBittorrent Web API.

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

use crate::error::{ClientError, ClientResult};
use crate::models::{PeerLogEntry, TorrentProperties, TorrentSummary, TorrentTracker, TransferInfo};

/// Body qBittorrent returns with `200 OK` when credentials are wrong.
const LOGIN_REJECTED_BODY: &str = "Fails.";

/// HTTP client holding the qBittorrent session cookie.
///
/// The session is established once through [`QbittorrentClient::login`] and
/// replayed on every later call; expiry is not detected or refreshed.
#[derive(Clone)]
pub struct QbittorrentClient {
    http: Client,
    base_url: Url,
}

impl QbittorrentClient {
    /// Build a client for the upstream at `address` (`host:port`).
    ///
    /// # Errors
    ///
    /// Returns an error if `address` does not form a valid URL or the HTTP
    /// client cannot be constructed.
    pub fn new(address: &str) -> ClientResult<Self> {
        let address = address.trim();
        // `http:///api/v2/` would otherwise parse with `api` as the host.
        if address.is_empty() || address.starts_with('/') {
            return Err(ClientError::InvalidAddress {
                address: address.to_string(),
                source: url::ParseError::EmptyHost,
            });
        }
        let base_url = Url::parse(&format!("http://{address}/api/v2/")).map_err(|source| {
            ClientError::InvalidAddress {
                address: address.to_string(),
                source,
            }
        })?;
        let http = Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|source| ClientError::Build { source })?;
        Ok(Self { http, base_url })
    }

    /// Base URL every endpoint is resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full URL for `api_name/method_name`.
    #[must_use]
    pub fn endpoint(&self, api_name: &str, method_name: &str) -> String {
        format!("{}{api_name}/{method_name}", self.base_url)
    }

    /// Authenticate and keep the session cookie for later calls.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or when
    /// qBittorrent rejects the credentials.
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<()> {
        let endpoint = self.endpoint("auth", "login");
        debug!(endpoint = %endpoint, username, "authenticating against qBittorrent");
        let request = self
            .http
            .post(&endpoint)
            .form(&[("username", username), ("password", password)]);
        let response = send(&endpoint, request).await?;
        let body = response
            .text()
            .await
            .map_err(|source| ClientError::Decode {
                endpoint: endpoint.clone(),
                source,
            })?;
        if body.trim() == LOGIN_REJECTED_BODY {
            return Err(ClientError::LoginRejected {
                username: username.to_string(),
            });
        }
        info!(username, "qBittorrent session established");
        Ok(())
    }

    /// Fetch the peer log.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or an
    /// undecodable body.
    pub async fn peer_log(&self) -> ClientResult<Vec<PeerLogEntry>> {
        self.get_json("log", "peers", None).await
    }

    /// Fetch global transfer information.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or an
    /// undecodable body.
    pub async fn transfer_info(&self) -> ClientResult<TransferInfo> {
        self.get_json("transfer", "info", None).await
    }

    /// Fetch the torrent list.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or an
    /// undecodable body.
    pub async fn torrents_info(&self) -> ClientResult<Vec<TorrentSummary>> {
        self.get_json("torrents", "info", None).await
    }

    /// Fetch generic properties for one torrent.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or an
    /// undecodable body.
    pub async fn torrents_properties(&self, hash: &str) -> ClientResult<TorrentProperties> {
        self.get_json("torrents", "properties", Some(&[("hash", hash)]))
            .await
    }

    /// Fetch the trackers of one torrent.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or an
    /// undecodable body.
    pub async fn torrents_trackers(&self, hash: &str) -> ClientResult<Vec<TorrentTracker>> {
        self.get_json("torrents", "trackers", Some(&[("hash", hash)]))
            .await
    }

    async fn get_json<T>(
        &self,
        api_name: &str,
        method_name: &str,
        form: Option<&[(&str, &str)]>,
    ) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        let endpoint = self.endpoint(api_name, method_name);
        debug!(endpoint = %endpoint, "fetching qBittorrent resource");
        let mut request = self.http.get(&endpoint);
        if let Some(form) = form {
            request = request.form(form);
        }
        let response = send(&endpoint, request).await?;
        response
            .json::<T>()
            .await
            .map_err(|source| ClientError::Decode { endpoint, source })
    }
}

async fn send(endpoint: &str, request: RequestBuilder) -> ClientResult<Response> {
    let response = request
        .send()
        .await
        .map_err(|source| ClientError::Transport {
            endpoint: endpoint.to_string(),
            source,
        })?;
    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use httpmock::MockServer;
    use httpmock::prelude::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use crate::models::{ConnectionStatus, TorrentState};

    fn client_for(server: &MockServer) -> Result<QbittorrentClient> {
        Ok(QbittorrentClient::new(&server.address().to_string())?)
    }

    #[test]
    fn endpoint_follows_api_v2_layout() -> Result<()> {
        let client = QbittorrentClient::new("localhost:8080")?;
        assert_eq!(
            client.endpoint("transfer", "info"),
            "http://localhost:8080/api/v2/transfer/info"
        );
        assert_eq!(client.base_url().as_str(), "http://localhost:8080/api/v2/");
        Ok(())
    }

    #[test]
    fn invalid_address_is_rejected() {
        let result = QbittorrentClient::new("not a host:80");
        assert!(matches!(result, Err(ClientError::InvalidAddress { .. })));
        let result = QbittorrentClient::new("");
        assert!(matches!(result, Err(ClientError::InvalidAddress { .. })));
    }

    #[tokio::test]
    async fn login_posts_form_and_replays_session_cookie() -> Result<()> {
        let server = MockServer::start_async().await;
        let login = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v2/auth/login")
                .header("content-type", "application/x-www-form-urlencoded")
                .body("username=admin&password=adminadmin");
            then.status(200)
                .header("set-cookie", "SID=session-token; HttpOnly; path=/")
                .body("Ok.");
        });
        let transfer = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v2/transfer/info")
                .header("cookie", "SID=session-token");
            then.status(200).json_body(json!({
                "connection_status": "connected",
                "dht_nodes": 10,
                "dl_info_data": 1,
                "dl_info_speed": 2,
                "up_info_data": 3,
                "up_info_speed": 4
            }));
        });

        let client = client_for(&server)?;
        client.login("admin", "adminadmin").await?;
        let info = client.transfer_info().await?;

        login.assert();
        transfer.assert();
        assert_eq!(info.connection_status, ConnectionStatus::Connected);
        assert_eq!(info.dl_info_speed, 2);
        Ok(())
    }

    #[tokio::test]
    async fn login_fails_on_non_success_status() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/api/v2/auth/login");
            then.status(403).body("Your IP address has been banned");
        });

        let client = client_for(&server)?;
        let err = client
            .login("admin", "adminadmin")
            .await
            .err()
            .ok_or_else(|| anyhow::anyhow!("expected login failure"))?;
        assert!(matches!(err, ClientError::Status { status: 403, .. }));
        Ok(())
    }

    #[tokio::test]
    async fn login_reports_rejected_credentials() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/api/v2/auth/login");
            then.status(200).body("Fails.");
        });

        let client = client_for(&server)?;
        let err = client
            .login("admin", "wrong")
            .await
            .err()
            .ok_or_else(|| anyhow::anyhow!("expected rejected login"))?;
        assert!(matches!(err, ClientError::LoginRejected { ref username } if username == "admin"));
        Ok(())
    }

    #[tokio::test]
    async fn peer_log_and_torrents_decode() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/v2/log/peers");
            then.status(200).json_body(json!([
                {"id": 1, "ip": "10.0.0.1", "timestamp": 1, "blocked": true, "reason": "ip filter"},
                {"id": 2, "ip": "10.0.0.2", "timestamp": 2, "blocked": false, "reason": ""}
            ]));
        });
        server.mock(|when, then| {
            when.method(GET).path("/api/v2/torrents/info");
            then.status(200).json_body(json!([
                {"hash": "aa", "name": "one", "state": "downloading"},
                {"hash": "bb", "name": "two", "state": "moving"}
            ]));
        });

        let client = client_for(&server)?;
        let peers = client.peer_log().await?;
        assert_eq!(peers.len(), 2);
        assert!(peers[0].blocked);

        let torrents = client.torrents_info().await?;
        assert_eq!(torrents[0].state, TorrentState::Downloading);
        assert_eq!(torrents[1].state, TorrentState::Unknown);
        assert_eq!(torrents[1].name.as_deref(), Some("two"));
        Ok(())
    }

    /// Answer one connection with `json` and hand back the raw request text.
    async fn capture_one_request(
        json: &'static str,
    ) -> Result<(String, JoinHandle<Result<String>>)> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let address = listener.local_addr()?.to_string();
        let captured = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await?;
            let mut raw = Vec::new();
            let mut chunk = [0_u8; 1024];
            while !request_complete(&raw) {
                let read = stream.read(&mut chunk).await?;
                if read == 0 {
                    break;
                }
                raw.extend_from_slice(&chunk[..read]);
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{json}",
                json.len()
            );
            stream.write_all(response.as_bytes()).await?;
            stream.shutdown().await?;
            Ok::<_, anyhow::Error>(String::from_utf8(raw)?)
        });
        Ok((address, captured))
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some((head, body)) = text.split_once("\r\n\r\n") else {
            return false;
        };
        let length = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        body.len() >= length
    }

    fn assert_hash_form_get(raw: &str, path: &str) {
        let (head, body) = raw.split_once("\r\n\r\n").unwrap_or((raw, ""));
        assert!(
            head.starts_with(&format!("GET {path} HTTP/1.1\r\n")),
            "unexpected request line in:\n{head}"
        );
        assert!(
            head.to_ascii_lowercase()
                .contains("content-type: application/x-www-form-urlencoded"),
            "missing form content type in:\n{head}"
        );
        assert_eq!(body, "hash=abcdef");
    }

    #[tokio::test]
    async fn torrents_properties_sends_hash_as_get_form_body() -> Result<()> {
        let (address, captured) =
            capture_one_request(r#"{"save_path":"/downloads","total_size":42,"seeds":3}"#).await?;

        let props = QbittorrentClient::new(&address)?
            .torrents_properties("abcdef")
            .await?;

        assert_hash_form_get(&captured.await??, "/api/v2/torrents/properties");
        assert_eq!(props.save_path.as_deref(), Some("/downloads"));
        assert_eq!(props.total_size, Some(42));
        assert_eq!(props.extra.get("seeds"), Some(&json!(3)));
        Ok(())
    }

    #[tokio::test]
    async fn torrents_trackers_sends_hash_as_get_form_body() -> Result<()> {
        let (address, captured) =
            capture_one_request(r#"[{"url":"** [DHT] **","status":2,"msg":"","num_peers":7}]"#)
                .await?;

        let trackers = QbittorrentClient::new(&address)?
            .torrents_trackers("abcdef")
            .await?;

        assert_hash_form_get(&captured.await??, "/api/v2/torrents/trackers");
        assert_eq!(trackers.len(), 1);
        assert_eq!(trackers[0].url, "** [DHT] **");
        assert_eq!(trackers[0].status, Some(2));
        assert_eq!(trackers[0].extra.get("num_peers"), Some(&json!(7)));
        Ok(())
    }

    #[tokio::test]
    async fn upstream_errors_surface_without_interpretation() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/v2/transfer/info");
            then.status(500).json_body(json!({"error": "boom"}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/api/v2/log/peers");
            then.status(200).body("not json");
        });

        let client = client_for(&server)?;
        let status_err = client.transfer_info().await.err();
        assert!(matches!(
            status_err,
            Some(ClientError::Status { status: 500, .. })
        ));
        let decode_err = client.peer_log().await.err();
        assert!(matches!(decode_err, Some(ClientError::Decode { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn transport_failure_is_reported() -> Result<()> {
        let client = QbittorrentClient::new("127.0.0.1:1")?;
        let err = client.torrents_info().await.err();
        assert!(matches!(err, Some(ClientError::Transport { .. })));
        Ok(())
    }
}

//! Route handlers for the exposition, health, and landing endpoints.

use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{StatusCode, header::CONTENT_TYPE},
    response::Response,
};
use qbt_exporter_telemetry::build_sha;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::http::constants::{INDEX_BODY, METRICS_CONTENT_TYPE};
use crate::http::errors::ApiError;
use crate::http::state::ExporterState;
use crate::scrape::scrape;

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) status: &'static str,
    pub(crate) build: &'static str,
}

/// Scrape qBittorrent, fold the result into the registry, and render it.
pub(crate) async fn metrics(
    State(state): State<Arc<ExporterState>>,
) -> Result<Response, ApiError> {
    let snapshot = match scrape(state.source.as_ref()).await {
        Ok(snapshot) => snapshot,
        Err(err) => {
            warn!(error = %err, "qBittorrent scrape failed");
            return Err(ApiError::bad_gateway("failed to scrape qBittorrent"));
        }
    };
    debug!(
        blocked_peers = snapshot.blocked_peers,
        torrents = snapshot.torrent_states.values().sum::<u64>(),
        "scrape complete"
    );

    let body = state
        .telemetry
        .apply_and_render(|metrics| snapshot.apply_to(metrics))
        .map_err(|err| {
            error!(error = %err, "failed to render metrics");
            ApiError::internal("failed to render metrics")
        })?;

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, METRICS_CONTENT_TYPE)
        .body(Body::from(body))
        .map_err(|err| {
            error!(error = %err, "failed to build metrics response");
            ApiError::internal("failed to build metrics response")
        })
}

pub(crate) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        build: build_sha(),
    })
}

pub(crate) async fn index() -> &'static str {
    INDEX_BODY
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape::exporter_metrics;
    use crate::scrape::tests::FakeSource;
    use anyhow::{Result, anyhow};
    use axum::body::to_bytes;
    use axum::response::IntoResponse;
    use qbt_exporter_client::{ConnectionStatus, TorrentState};
    use qbt_exporter_telemetry::Metrics;
    use serde_json::Value;

    fn state_with(source: FakeSource, telemetry: &Metrics) -> Arc<ExporterState> {
        Arc::new(ExporterState::new(Arc::new(source), telemetry.clone()))
    }

    async fn body_text(response: Response) -> Result<String> {
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    fn sample_line<'a>(body: &'a str, series: &str) -> Option<&'a str> {
        body.lines()
            .find(|line| line.starts_with(series))
            .and_then(|line| line.rsplit(' ').next())
    }

    #[tokio::test]
    async fn metrics_exposes_scraped_values() -> Result<()> {
        let telemetry = exporter_metrics()?;
        let source = FakeSource::new(
            &[true, false, true, false, true],
            ConnectionStatus::Firewalled,
            &[
                TorrentState::Downloading,
                TorrentState::Downloading,
                TorrentState::Error,
                TorrentState::Unknown,
            ],
        );

        let response = metrics(State(state_with(source, &telemetry)))
            .await
            .map_err(|err| anyhow!("{err:?}"))?;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).map(|v| v.as_bytes()),
            Some(METRICS_CONTENT_TYPE.as_bytes())
        );

        let body = body_text(response).await?;
        assert_eq!(sample_line(&body, "qbittorrent_peers_blocked "), Some("3"));
        assert_eq!(
            sample_line(&body, r#"qbittorrent_status{qbittorrent_status="firewalled"}"#),
            Some("1")
        );
        assert_eq!(
            sample_line(&body, r#"qbittorrent_status{qbittorrent_status="connected"}"#),
            Some("0")
        );
        assert_eq!(
            sample_line(&body, r#"qbittorrent_torrent_state{state="downloading"}"#),
            Some("2")
        );
        assert_eq!(
            sample_line(&body, r#"qbittorrent_torrent_state{state="error"}"#),
            Some("1")
        );
        assert_eq!(
            sample_line(&body, r#"qbittorrent_torrent_state{state="metaDL"}"#),
            Some("0")
        );
        assert_eq!(sample_line(&body, "qbittorrent_dht_nodes "), Some("340"));
        assert!(!body.contains("unknown"));
        Ok(())
    }

    #[tokio::test]
    async fn consecutive_scrapes_overwrite_previous_values() -> Result<()> {
        let telemetry = exporter_metrics()?;
        let first = FakeSource::new(
            &[true, true],
            ConnectionStatus::Connected,
            &[TorrentState::Uploading, TorrentState::Uploading],
        );
        metrics(State(state_with(first, &telemetry)))
            .await
            .map_err(|err| anyhow!("{err:?}"))?;

        let second = FakeSource::new(
            &[],
            ConnectionStatus::Disconnected,
            &[TorrentState::PausedDl],
        );
        metrics(State(state_with(second, &telemetry)))
            .await
            .map_err(|err| anyhow!("{err:?}"))?;

        let values = telemetry.snapshot();
        assert_eq!(values.peers_blocked, 0);
        assert_eq!(values.connection_status.as_deref(), Some("disconnected"));
        assert_eq!(values.torrent_states.get("uploading"), Some(&0));
        assert_eq!(values.torrent_states.get("pausedDL"), Some(&1));
        Ok(())
    }

    #[tokio::test]
    async fn upstream_failure_returns_bad_gateway_and_keeps_registry() -> Result<()> {
        let telemetry = exporter_metrics()?;
        let healthy = FakeSource::new(
            &[true],
            ConnectionStatus::Connected,
            &[TorrentState::StalledUp],
        );
        metrics(State(state_with(healthy, &telemetry)))
            .await
            .map_err(|err| anyhow!("{err:?}"))?;
        let before = telemetry.snapshot();

        let failing = FakeSource::new(&[true, true, true], ConnectionStatus::Firewalled, &[])
            .failing_transfer();
        let Err(err) = metrics(State(state_with(failing, &telemetry))).await else {
            return Err(anyhow!("expected the scrape to fail"));
        };
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert_eq!(telemetry.snapshot(), before);

        let body = body_text(err.into_response()).await?;
        let problem: Value = serde_json::from_str(&body)?;
        assert_eq!(problem["status"], 502);
        Ok(())
    }

    #[tokio::test]
    async fn health_reports_build() {
        let Json(response) = health().await;
        assert_eq!(response.status, "ok");
        assert_eq!(response.build, build_sha());
    }

    #[tokio::test]
    async fn index_points_at_metrics() {
        assert!(index().await.contains("/metrics"));
    }
}

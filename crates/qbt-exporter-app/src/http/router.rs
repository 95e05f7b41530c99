//! Router construction and listener host for the exporter.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{Router, http::Request, routing::get};
use qbt_exporter_telemetry::{Metrics, REQUEST_ID_HEADER, build_sha, http_trace_layer};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tracing::{Span, info, warn};

use crate::error::{AppError, AppResult};
use crate::http::handlers::{health, index, metrics};
use crate::http::state::ExporterState;
use crate::scrape::QbittorrentSource;

/// Axum router wrapper that serves the exposition endpoints.
pub struct ExporterServer {
    router: Router,
}

impl ExporterServer {
    /// Wire the routes, tracing, and request-id layers around a scrape source.
    #[must_use]
    pub fn new(source: Arc<dyn QbittorrentSource>, telemetry: Metrics) -> Self {
        let state = Arc::new(ExporterState::new(source, telemetry));
        let trace_layer = http_trace_layer()
            .make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("")
                    .to_string();

                tracing::info_span!(
                    "http.request",
                    method = %request.method(),
                    route = %request.uri().path(),
                    request_id = %request_id,
                    build_sha = %build_sha(),
                    status_code = tracing::field::Empty,
                    latency_ms = tracing::field::Empty
                )
            })
            .on_request(|_request: &Request<_>, _span: &Span| {})
            .on_response(
                |response: &axum::response::Response, latency: Duration, span: &Span| {
                    span.record("status_code", response.status().as_u16());
                    let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
                    span.record("latency_ms", latency_ms);
                },
            );
        let layered = ServiceBuilder::new()
            .layer(qbt_exporter_telemetry::propagate_request_id_layer())
            .layer(qbt_exporter_telemetry::set_request_id_layer())
            .layer(trace_layer);

        let router = Router::new()
            .route("/", get(index))
            .route("/health", get(health))
            .route("/metrics", get(metrics))
            .route_layer(layered)
            .with_state(state);

        Self { router }
    }

    /// Bind the listener and serve until SIGINT or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener fails to bind or the server terminates unexpectedly.
    pub async fn serve(self, addr: SocketAddr) -> AppResult<()> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| AppError::Bind { addr, source })?;
        info!(%addr, "serving metrics");
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|source| AppError::Serve { source })?;
        info!("metrics listener stopped");
        Ok(())
    }

    #[cfg(test)]
    pub(crate) const fn router(&self) -> &Router {
        &self.router
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("signal received, starting graceful shutdown");
}

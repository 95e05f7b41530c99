//! `x-request-id` handling for the exporter router.
//!
//! Scrapers rarely send a request id, so one is minted per request; an id
//! supplied by a proxy in front of the exporter is echoed back unchanged.

use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{HttpMakeClassifier, TraceLayer};

/// Header the request-id layers read and write.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Layer that mints a UUID request id when the scrape request has none.
#[must_use]
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

/// Layer that copies the request id onto the scrape response.
#[must_use]
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

/// Base HTTP trace layer; callers attach their own span and response hooks.
#[must_use]
pub fn http_trace_layer() -> TraceLayer<HttpMakeClassifier> {
    TraceLayer::new_for_http()
}

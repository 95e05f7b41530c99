//! Application-level span guard.

use tracing::{Span, span::Entered};

use crate::init::build_sha;

/// Guard that keeps the application-level span entered for the lifetime of the process.
pub struct GlobalContextGuard {
    _guard: Entered<'static>,
}

impl GlobalContextGuard {
    /// Enter the application-level tracing span, tagged with the upstream address.
    #[must_use]
    pub fn new(upstream: impl Into<String>) -> Self {
        let upstream = upstream.into();
        let span: &'static Span = Box::leak(Box::new(tracing::info_span!(
            "exporter",
            upstream = %upstream,
            build_sha = %build_sha()
        )));
        let guard = span.enter();
        Self { _guard: guard }
    }
}

//! HTTP surface: router, handlers, and problem responses.

pub(crate) mod constants;
pub(crate) mod errors;
pub(crate) mod handlers;
/// Router construction and listener host.
pub mod router;
pub(crate) mod state;

pub use router::ExporterServer;

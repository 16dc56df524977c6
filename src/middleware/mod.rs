//! Middleware layer.
//!
//! Cross-cutting concerns that wrap every dispatched request. For now that is
//! request tracing; the server applies it around each handler call.

mod trace;

pub(crate) use trace::trace;

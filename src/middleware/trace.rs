//! Per-request tracing span with method, path, status, and latency.

use std::future::Future;
use std::time::Instant;

use http::Method;
use tracing::{Instrument, info, info_span};

use crate::response::Response;

/// Runs `fut` inside a `request` span and logs the outcome when it resolves.
///
/// Events the handler emits (pipeline failures, cleanup warnings) inherit the
/// span's `method` and `path` fields.
pub(crate) async fn trace<F>(method: &Method, path: &str, fut: F) -> Response
where
    F: Future<Output = Response>,
{
    let span = info_span!("request", %method, path);
    let started = Instant::now();

    async move {
        let response = fut.await;
        info!(
            status = response.status_code().as_u16(),
            latency_ms = started.elapsed().as_millis() as u64,
            "request finished"
        );
        response
    }
    .instrument(span)
    .await
}

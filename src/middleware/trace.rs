use std::time::Instant;

use tracing::{Instrument, field, info, info_span};

use super::{Middleware, Next, from_fn};
use crate::request::Request;

/// Per-request span with method, path, status and latency.
///
/// Everything the route logs while serving the request is recorded inside
/// the span, followed by one `info` event when the response is ready.
pub fn trace() -> Middleware {
    from_fn(|req: Request, next: Next| {
        let span = info_span!(
            "request",
            method = %req.method(),
            path = %req.path(),
            status = field::Empty,
            latency_ms = field::Empty,
        );

        async move {
            let started = Instant::now();
            let res = next.run(req).instrument(span.clone()).await;

            let latency_ms = started.elapsed().as_millis() as u64;
            span.record("status", res.status().as_u16());
            span.record("latency_ms", latency_ms);
            info!(parent: &span, "request served");

            res
        }
    })
}

//! Outgoing HTTP response and the buffered [`ResponseWriter`] encoders write to.
//!
//! Encoders never talk to the connection directly. They set headers, write a
//! status, then write body bytes into a `ResponseWriter`; once the pipeline
//! is done the writer is turned into a [`Response`] and handed to hyper.

use bytes::{Bytes, BytesMut};
use http::header::{CONTENT_TYPE, HeaderValue};
use http::{HeaderMap, StatusCode};
use http_body_util::Full;
use tracing::warn;

/// The response type produced by every route, middleware and the router.
pub type Response = http::Response<Full<Bytes>>;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Content types written by the built-in encoders.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContentType {
    Json, // application/json; charset=utf-8
    Text, // text/plain; charset=utf-8
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "application/json; charset=utf-8",
            Self::Text => "text/plain; charset=utf-8",
        }
    }

    pub fn header_value(self) -> HeaderValue {
        HeaderValue::from_static(self.as_str())
    }
}

// ── ResponseWriter ────────────────────────────────────────────────────────────

/// A buffered response sink with HTTP write ordering.
///
/// Headers are only honored if they are set before the status is written;
/// changes made afterwards are ignored, as they would be on the wire. Writing
/// body bytes without a status implies `200 OK`. The first status write wins.
///
/// ```rust
/// use bindery::{ContentType, ResponseWriter};
/// use http::StatusCode;
/// use http::header::CONTENT_TYPE;
///
/// let mut w = ResponseWriter::new();
/// w.headers_mut().insert(CONTENT_TYPE, ContentType::Text.header_value());
/// w.write_status(StatusCode::ACCEPTED);
/// w.write(b"queued");
///
/// let res = w.finish();
/// assert_eq!(res.status(), StatusCode::ACCEPTED);
/// ```
#[derive(Debug, Default)]
pub struct ResponseWriter {
    headers: HeaderMap,
    // Status plus the headers as they stood when it was written.
    committed: Option<(StatusCode, HeaderMap)>,
    body: BytesMut,
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Writes the status line. Later calls are ignored.
    pub fn write_status(&mut self, status: StatusCode) {
        if let Some((written, _)) = &self.committed {
            warn!(%written, ignored = %status, "superfluous status write");
            return;
        }
        self.committed = Some((status, self.headers.clone()));
    }

    /// Appends body bytes, writing `200 OK` first if no status was written.
    pub fn write(&mut self, bytes: &[u8]) {
        if self.committed.is_none() {
            self.write_status(StatusCode::OK);
        }
        self.body.extend_from_slice(bytes);
    }

    /// The status written so far, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.committed.as_ref().map(|(status, _)| *status)
    }

    pub fn is_committed(&self) -> bool {
        self.committed.is_some()
    }

    /// Drops everything written so far. Used before encoding an error so a
    /// failed encode never leaks into the error response.
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    /// Converts the buffered output into a [`Response`].
    pub fn finish(self) -> Response {
        let (status, headers) = self
            .committed
            .unwrap_or((StatusCode::OK, self.headers));
        let mut res = http::Response::new(Full::new(self.body.freeze()));
        *res.status_mut() = status;
        *res.headers_mut() = headers;
        res
    }
}

/// Lets serializers stream straight into the body, e.g.
/// `serde_json::to_writer(&mut writer, &value)`.
impl std::io::Write for ResponseWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        ResponseWriter::write(self, buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// A bare response with a plain-text reason body, used by the router and
/// server for requests that never reach a route.
pub(crate) fn plain(status: StatusCode, body: &'static str) -> Response {
    let mut w = ResponseWriter::new();
    w.headers_mut().insert(CONTENT_TYPE, ContentType::Text.header_value());
    w.write_status(status);
    w.write(body.as_bytes());
    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(res: Response) -> Bytes {
        res.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn write_without_status_implies_ok() {
        let mut w = ResponseWriter::new();
        w.write(b"hello");

        let res = w.finish();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_of(res).await, "hello");
    }

    #[test]
    fn unwritten_writer_finishes_as_empty_ok() {
        let res = ResponseWriter::new().finish();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[test]
    fn headers_after_status_are_ignored() {
        let mut w = ResponseWriter::new();
        w.headers_mut().insert("x-before", HeaderValue::from_static("1"));
        w.write_status(StatusCode::CREATED);
        w.headers_mut().insert("x-after", HeaderValue::from_static("2"));

        let res = w.finish();
        assert_eq!(res.headers()["x-before"], "1");
        assert!(res.headers().get("x-after").is_none());
    }

    #[test]
    fn first_status_write_wins() {
        let mut w = ResponseWriter::new();
        w.write_status(StatusCode::NO_CONTENT);
        w.write_status(StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(w.status(), Some(StatusCode::NO_CONTENT));
        assert_eq!(w.finish().status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn reset_discards_partial_output() {
        let mut w = ResponseWriter::new();
        w.headers_mut().insert(CONTENT_TYPE, ContentType::Json.header_value());
        w.write_status(StatusCode::OK);
        w.write(b"{\"partial\":");
        w.reset();

        assert!(!w.is_committed());
        assert!(w.headers().is_empty());

        w.write_status(StatusCode::BAD_GATEWAY);
        let res = w.finish();
        assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
        assert!(body_of(res).await.is_empty());
    }
}

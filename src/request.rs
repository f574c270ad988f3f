//! Incoming HTTP request envelope.

use std::collections::HashMap;

use bytes::Bytes;
use http::{Extensions, HeaderMap, Uri};

use crate::method::{Method, UnknownMethod};

/// An incoming HTTP request with its body fully buffered.
///
/// This is what decoders receive. It is handed over by value, so a decoder
/// that consumes the body (or the whole request, like
/// [`Passthrough`](crate::Passthrough)) does so exactly once.
#[derive(Debug)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) uri: Uri,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
    pub(crate) extensions: Extensions,
}

impl Request {
    pub fn method(&self) -> Method { self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn query(&self) -> Option<&str> { self.uri.query() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Consumes the request, returning the body.
    pub fn into_body(self) -> Bytes { self.body }

    /// Header lookup. Names are case-insensitive; non-UTF-8 values are skipped.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Request-scoped values. Middleware inserts here; every pipeline
    /// function sees a copy through [`Context::extensions`](crate::Context::extensions).
    pub fn extensions(&self) -> &Extensions { &self.extensions }
    pub fn extensions_mut(&mut self) -> &mut Extensions { &mut self.extensions }
}

impl TryFrom<http::Request<Bytes>> for Request {
    type Error = UnknownMethod;

    fn try_from(req: http::Request<Bytes>) -> Result<Self, Self::Error> {
        let (parts, body) = req.into_parts();
        Ok(Self {
            method: Method::try_from(&parts.method)?,
            uri: parts.uri,
            headers: parts.headers,
            body,
            params: HashMap::new(),
            extensions: parts.extensions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_from_http_request() {
        let raw = http::Request::builder()
            .method("POST")
            .uri("/users?active=true")
            .header("Content-Type", "application/json")
            .body(Bytes::from_static(b"{}"))
            .unwrap();

        let req = Request::try_from(raw).unwrap();
        assert_eq!(req.method(), Method::Post);
        assert_eq!(req.path(), "/users");
        assert_eq!(req.query(), Some("active=true"));
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.body(), b"{}");
        assert_eq!(req.param("id"), None);
    }

    #[test]
    fn rejects_unknown_method() {
        let raw = http::Request::builder()
            .method("BREW")
            .uri("/pot")
            .body(Bytes::new())
            .unwrap();

        assert_eq!(Request::try_from(raw).unwrap_err().0, "BREW");
    }
}

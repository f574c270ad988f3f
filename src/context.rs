//! Per-request context shared by every step of the pipeline.

use std::sync::Arc;

use http::Extensions;

use crate::method::Method;
use crate::request::Request;

/// What the pipeline knows about the request being served, independent of
/// who currently owns the [`Request`] itself.
///
/// The decoder takes the request by value; the handler, the encoder and the
/// error hooks still need to know which route they are serving. They get a
/// `Context`. Cloning is cheap except for the extensions, which are usually
/// empty or hold a few small values.
#[derive(Clone, Debug)]
pub struct Context {
    method: Method,
    path: String,
    pattern: Arc<str>,
    extensions: Extensions,
}

impl Context {
    pub fn new(method: Method, path: impl Into<String>, pattern: impl Into<Arc<str>>) -> Self {
        Self {
            method,
            path: path.into(),
            pattern: pattern.into(),
            extensions: Extensions::new(),
        }
    }

    pub(crate) fn for_request(req: &Request, pattern: &Arc<str>) -> Self {
        Self {
            method: req.method(),
            path: req.path().to_owned(),
            pattern: Arc::clone(pattern),
            extensions: req.extensions().clone(),
        }
    }

    pub fn method(&self) -> Method { self.method }

    /// The concrete request path, e.g. `/users/42`.
    pub fn path(&self) -> &str { &self.path }

    /// The pattern the route was registered under, e.g. `/users/{id}`.
    pub fn pattern(&self) -> &str { &self.pattern }

    pub fn extensions(&self) -> &Extensions { &self.extensions }
    pub fn extensions_mut(&mut self) -> &mut Extensions { &mut self.extensions }
}

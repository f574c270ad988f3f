//! Per-route configuration.

use std::sync::Arc;

use crate::codec::{self, ErrorEncoder, Json, Passthrough};
use crate::context::Context;
use crate::error::Error;
use crate::error_handler::{DefaultErrorHandler, ErrorHandler};
use crate::middleware::Middleware;
use crate::response::ResponseWriter;

/// How a route turns HTTP into calls to its handler and back.
///
/// Starts from the defaults: [`Passthrough`] decoding, [`Json`] encoding,
/// [`encode_error`](crate::encode_error), [`DefaultErrorHandler`], and no
/// middleware. Each setter replaces one field, so calling it again means
/// last write wins; [`middleware`](Options::middleware) is the exception
/// and appends.
///
/// ```rust
/// use bindery::{Options, decode_json, middleware};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Search { q: String }
///
/// let options = Options::new()
///     .decoder(decode_json::<Search>)
///     .middleware([middleware::trace()]);
/// ```
pub struct Options<D = Passthrough, E = Json> {
    pub(crate) decoder: D,
    pub(crate) encoder: E,
    pub(crate) error_encoder: ErrorEncoder,
    pub(crate) error_handler: Arc<dyn ErrorHandler>,
    pub(crate) middleware: Vec<Middleware>,
}

impl Options {
    pub fn new() -> Self {
        Self {
            decoder: Passthrough,
            encoder: Json,
            error_encoder: codec::default_error_encoder(),
            error_handler: Arc::new(DefaultErrorHandler),
            middleware: Vec::new(),
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

impl<D, E> Options<D, E> {
    /// Replaces the request decoder.
    pub fn decoder<D2>(self, decoder: D2) -> Options<D2, E> {
        Options {
            decoder,
            encoder: self.encoder,
            error_encoder: self.error_encoder,
            error_handler: self.error_handler,
            middleware: self.middleware,
        }
    }

    /// Replaces the response encoder.
    pub fn encoder<E2>(self, encoder: E2) -> Options<D, E2> {
        Options {
            decoder: self.decoder,
            encoder,
            error_encoder: self.error_encoder,
            error_handler: self.error_handler,
            middleware: self.middleware,
        }
    }

    /// Replaces the function that writes errors as responses.
    pub fn error_encoder<F>(mut self, error_encoder: F) -> Self
    where
        F: Fn(&Context, &Error, &mut ResponseWriter) + Send + Sync + 'static,
    {
        self.error_encoder = Arc::new(error_encoder);
        self
    }

    /// Replaces the diagnostic hook that sees every error.
    pub fn error_handler(mut self, error_handler: impl ErrorHandler) -> Self {
        self.error_handler = Arc::new(error_handler);
        self
    }

    /// Appends per-route middleware. These run inside the router-wide
    /// middleware, in the order given.
    pub fn middleware(mut self, middleware: impl IntoIterator<Item = Middleware>) -> Self {
        self.middleware.extend(middleware);
        self
    }
}

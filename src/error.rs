//! Error types.
//!
//! Two families live here. [`Error`] is what flows through the request
//! pipeline: decoders, handlers and encoders fail with it, and the error
//! encoder turns it into a response. [`ServeError`] is infrastructure
//! failure of the [`Server`](crate::Server) itself: binding a port, parsing
//! the listen address.

use std::fmt;

use http::{HeaderMap, StatusCode};

// ── Pipeline errors ───────────────────────────────────────────────────────────

/// Optional HTTP capabilities of an error.
///
/// Every method has a default, so `impl HttpError for MyError {}` is enough
/// to send `MyError` through the pipeline as a plain `500` with its
/// `Display` text as body. Override what the error knows more about.
///
/// ```rust
/// use bindery::HttpError;
/// use http::StatusCode;
///
/// #[derive(Debug, thiserror::Error)]
/// #[error("user {0} not found")]
/// struct UserNotFound(u64);
///
/// impl HttpError for UserNotFound {
///     fn status_code(&self) -> Option<StatusCode> {
///         Some(StatusCode::NOT_FOUND)
///     }
/// }
/// ```
pub trait HttpError: std::error::Error + Send + Sync + 'static {
    /// Status to answer with. `None` means `500 Internal Server Error`.
    fn status_code(&self) -> Option<StatusCode> {
        None
    }

    /// Extra headers for the error response. Appended, never replacing.
    fn headers(&self) -> Option<HeaderMap> {
        None
    }

    /// Structured JSON form of the error. `None` means the error has none;
    /// `Some(Err(_))` falls back to the plain-text form.
    fn to_json(&self) -> Option<Result<Vec<u8>, serde_json::Error>> {
        None
    }
}

/// A type-erased pipeline error.
///
/// Anything implementing [`HttpError`] converts into `Error`, so `?` works
/// inside decoders, handlers and encoders. The capabilities of the wrapped
/// error stay reachable through [`Error::status_code`], [`Error::headers`]
/// and [`Error::to_json`], and the value itself through
/// [`Error::downcast_ref`].
pub struct Error {
    inner: Box<dyn HttpError>,
}

impl Error {
    pub fn new<E: HttpError>(err: E) -> Self {
        Self { inner: Box::new(err) }
    }

    /// An error carrying only a message. Encodes as a plain-text `500`.
    pub fn msg(message: impl fmt::Display) -> Self {
        Self::new(Message(message.to_string()))
    }

    pub fn status_code(&self) -> Option<StatusCode> {
        self.inner.status_code()
    }

    pub fn headers(&self) -> Option<HeaderMap> {
        self.inner.headers()
    }

    pub fn to_json(&self) -> Option<Result<Vec<u8>, serde_json::Error>> {
        self.inner.to_json()
    }

    pub fn is<E: HttpError>(&self) -> bool {
        self.downcast_ref::<E>().is_some()
    }

    pub fn downcast_ref<E: HttpError>(&self) -> Option<&E> {
        self.as_std().downcast_ref::<E>()
    }

    /// The wrapped error as a standard error, e.g. to walk its `source()` chain.
    pub fn as_std(&self) -> &(dyn std::error::Error + 'static) {
        &*self.inner
    }
}

impl<E: HttpError> From<E> for Error {
    fn from(err: E) -> Self {
        Self::new(err)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct Message(String);

impl HttpError for Message {}

/// The request body could not be turned into the domain request.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed json body: {0}")]
    Json(#[source] serde_json::Error),
}

impl HttpError for DecodeError {
    fn status_code(&self) -> Option<StatusCode> {
        Some(StatusCode::BAD_REQUEST)
    }
}

/// The domain response could not be written out.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("encode json response: {0}")]
    Json(#[from] serde_json::Error),
}

impl HttpError for EncodeError {}

// ── Server errors ─────────────────────────────────────────────────────────────

/// The error type returned by [`Server`](crate::Server).
///
/// Per-request failures never surface here; they are HTTP responses. This
/// type covers the listener: an unparsable address or a failed bind.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("invalid listen address `{addr}`: {source}")]
    Addr {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

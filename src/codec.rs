//! Request decoding, response encoding and error encoding.
//!
//! A route is three functions glued together: a decoder turns the
//! [`Request`] into the handler's input, the handler runs, and an encoder
//! writes its output into a [`ResponseWriter`]. When any of them fails, an
//! error encoder writes the [`Error`] instead.
//!
//! Plain functions and closures with the right signature are decoders and
//! encoders already:
//!
//! ```text
//! fn(&Context, Request) -> Result<Req, Error>                     Decode<Req>
//! fn(&Context, &mut ResponseWriter, Resp) -> Result<(), Error>    Encode<Resp>
//! fn(&Context, &Error, &mut ResponseWriter)                       ErrorEncoder
//! ```
//!
//! [`Passthrough`] and [`Json`] are the defaults every route starts with.

use std::sync::Arc;

use http::header::CONTENT_TYPE;
use http::{HeaderMap, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::context::Context;
use crate::error::{DecodeError, EncodeError, Error};
use crate::request::Request;
use crate::response::{ContentType, ResponseWriter};

// ── Capabilities ──────────────────────────────────────────────────────────────

/// Optional HTTP capabilities of a domain response.
///
/// Both methods default to "not provided": a response with an empty
/// `impl Reply for T {}` encodes as `200 OK` with no extra headers.
pub trait Reply {
    /// Status to answer with. `None` means `200 OK`.
    fn status_code(&self) -> Option<StatusCode> {
        None
    }

    /// Extra headers, appended before the status is written.
    fn headers(&self) -> Option<HeaderMap> {
        None
    }
}

impl Reply for serde_json::Value {}

/// A reply that answers `204 No Content` with an empty body.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct NoContent;

impl Reply for NoContent {
    fn status_code(&self) -> Option<StatusCode> {
        Some(StatusCode::NO_CONTENT)
    }
}

// ── Decode ────────────────────────────────────────────────────────────────────

/// Turns a [`Request`] into a handler's input.
pub trait Decode<Req>: Send + Sync + 'static {
    fn decode(&self, ctx: &Context, req: Request) -> Result<Req, Error>;
}

impl<F, Req> Decode<Req> for F
where
    F: Fn(&Context, Request) -> Result<Req, Error> + Send + Sync + 'static,
{
    fn decode(&self, ctx: &Context, req: Request) -> Result<Req, Error> {
        self(ctx, req)
    }
}

/// The default decoder: hands the raw [`Request`] to the handler untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct Passthrough;

impl Decode<Request> for Passthrough {
    fn decode(&self, _ctx: &Context, req: Request) -> Result<Request, Error> {
        Ok(req)
    }
}

/// Decodes the request body as JSON.
///
/// Malformed bodies fail with [`DecodeError::Json`], which answers `400`.
pub fn decode_json<T: DeserializeOwned>(_ctx: &Context, req: Request) -> Result<T, Error> {
    serde_json::from_slice(req.body()).map_err(|e| DecodeError::Json(e).into())
}

// ── Encode ────────────────────────────────────────────────────────────────────

/// Writes a handler's output into a [`ResponseWriter`].
pub trait Encode<Resp>: Send + Sync + 'static {
    fn encode(&self, ctx: &Context, w: &mut ResponseWriter, resp: Resp) -> Result<(), Error>;
}

impl<F, Resp> Encode<Resp> for F
where
    F: Fn(&Context, &mut ResponseWriter, Resp) -> Result<(), Error> + Send + Sync + 'static,
{
    fn encode(&self, ctx: &Context, w: &mut ResponseWriter, resp: Resp) -> Result<(), Error> {
        self(ctx, w, resp)
    }
}

/// The default encoder: [`encode_json`] for any serializable [`Reply`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Json;

impl<T: Reply + Serialize> Encode<T> for Json {
    fn encode(&self, ctx: &Context, w: &mut ResponseWriter, resp: T) -> Result<(), Error> {
        encode_json(ctx, w, resp)
    }
}

/// Writes `resp` as `application/json; charset=utf-8`.
///
/// The status comes from [`Reply::status_code`], defaulting to `200 OK`.
/// Headers from [`Reply::headers`] are appended before the status is
/// written. A `204 No Content` status writes no body and skips
/// serialization entirely.
pub fn encode_json<T: Reply + Serialize>(
    _ctx: &Context,
    w: &mut ResponseWriter,
    resp: T,
) -> Result<(), Error> {
    w.headers_mut().insert(CONTENT_TYPE, ContentType::Json.header_value());
    if let Some(extra) = resp.headers() {
        append_headers(w.headers_mut(), &extra);
    }

    let status = resp.status_code().unwrap_or(StatusCode::OK);
    w.write_status(status);

    if status == StatusCode::NO_CONTENT {
        return Ok(());
    }

    serde_json::to_writer(&mut *w, &resp).map_err(EncodeError::from)?;
    Ok(())
}

// ── Error encoding ────────────────────────────────────────────────────────────

/// Writes a failed request's [`Error`] as the response. Must not fail.
pub type ErrorEncoder = Arc<dyn Fn(&Context, &Error, &mut ResponseWriter) + Send + Sync>;

/// The default error encoder.
///
/// - Body is the error's `Display` text as `text/plain; charset=utf-8`,
///   unless [`HttpError::to_json`](crate::HttpError::to_json) succeeds, in
///   which case that JSON is sent as `application/json; charset=utf-8`.
/// - Headers from [`HttpError::headers`](crate::HttpError::headers) are
///   appended after the content type is set.
/// - Status comes from [`HttpError::status_code`](crate::HttpError::status_code),
///   defaulting to `500 Internal Server Error`.
pub fn encode_error(_ctx: &Context, err: &Error, w: &mut ResponseWriter) {
    let (content_type, body) = match err.to_json() {
        Some(Ok(json)) => (ContentType::Json, json),
        _ => (ContentType::Text, err.to_string().into_bytes()),
    };

    w.headers_mut().insert(CONTENT_TYPE, content_type.header_value());
    if let Some(extra) = err.headers() {
        append_headers(w.headers_mut(), &extra);
    }

    let status = err.status_code().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    w.write_status(status);
    w.write(&body);
}

pub(crate) fn default_error_encoder() -> ErrorEncoder {
    Arc::new(encode_error)
}

fn append_headers(dst: &mut HeaderMap, src: &HeaderMap) {
    for (name, value) in src {
        dst.append(name.clone(), value.clone());
    }
}

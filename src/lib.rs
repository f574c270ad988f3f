//! # bindery
//!
//! Decode, handle, encode. A minimal binding between HTTP and plain async
//! domain functions.
//!
//! ## The contract
//!
//! A domain handler takes a typed request and returns a typed response or an
//! error. It never sees status lines, headers or bytes. bindery supplies the
//! three pieces around it, per route:
//!
//! - a **decoder** turning the HTTP request into the handler's input
//!   (default: pass the raw [`Request`] through),
//! - an **encoder** writing the handler's output (default: JSON, status from
//!   [`Reply`], `200` otherwise, `204` with no body),
//! - an **error encoder** and an **error handler** for any failure of the
//!   three (default: `text/plain` body with status `500`, unless the
//!   [`HttpError`] says otherwise; no reporting).
//!
//! What bindery deliberately leaves to others:
//!
//! - **Path matching**: [`matchit`] radix trees, one per method
//! - **Connections and concurrency**: hyper on tokio
//! - **Authentication, persistence**: your middleware and handlers
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use bindery::{Context, HttpError, Method, Options, Reply, Router, Server, decode_json};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Deserialize)]
//! struct UppercaseRequest { s: String }
//!
//! #[derive(Serialize)]
//! struct UppercaseResponse { v: String }
//!
//! impl Reply for UppercaseResponse {}
//!
//! #[derive(Debug, thiserror::Error)]
//! #[error("empty string")]
//! struct Empty;
//!
//! impl HttpError for Empty {}
//!
//! async fn uppercase(_ctx: Context, req: UppercaseRequest) -> Result<UppercaseResponse, Empty> {
//!     if req.s.is_empty() {
//!         return Err(Empty);
//!     }
//!     Ok(UppercaseResponse { v: req.s.to_uppercase() })
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new().on_with(
//!         Method::Get,
//!         "/",
//!         uppercase,
//!         Options::new().decoder(decode_json::<UppercaseRequest>),
//!     );
//!
//!     Server::bind("0.0.0.0:8080").serve(app).await.unwrap();
//! }
//! ```

mod codec;
mod context;
mod error;
mod error_handler;
mod handler;
mod method;
mod options;
mod request;
mod response;
mod router;
mod server;

pub mod middleware;

pub use http;

pub use codec::{
    Decode, Encode, ErrorEncoder, Json, NoContent, Passthrough, Reply, decode_json, encode_error,
    encode_json,
};
pub use context::Context;
pub use error::{DecodeError, EncodeError, Error, HttpError, ServeError};
pub use error_handler::{DefaultErrorHandler, ErrorHandler, LogErrorHandler};
pub use handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler};
pub use method::{Method, UnknownMethod};
pub use middleware::Middleware;
pub use options::Options;
pub use request::Request;
pub use response::{ContentType, Response, ResponseWriter};
pub use router::{Config, Router};
pub use server::Server;

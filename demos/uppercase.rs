//! The string service: JSON in, upper-cased JSON out.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example uppercase
//!
//! Try:
//!   curl -X GET http://localhost:8080/ -d '{"s":"hi"}'    # {"v":"HI"}
//!   curl -X GET http://localhost:8080/ -d '{"s":""}'      # 500 empty string
//!   curl -X GET http://localhost:8080/ -d 'nope'          # 400 malformed json body
//!   curl -X GET http://localhost:8080/count -d '{"s":"hello"}'

use bindery::{
    Config, Context, HttpError, LogErrorHandler, Method, Options, Reply, Router, Server,
    decode_json, middleware,
};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

// ── Domain ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("empty string")]
struct EmptyString;

impl HttpError for EmptyString {}

trait StringService: Send + Sync + 'static {
    fn uppercase(&self, s: &str) -> Result<String, EmptyString>;
    fn count(&self, s: &str) -> usize;
}

struct Strings;

impl StringService for Strings {
    fn uppercase(&self, s: &str) -> Result<String, EmptyString> {
        if s.is_empty() {
            return Err(EmptyString);
        }
        Ok(s.to_uppercase())
    }

    fn count(&self, s: &str) -> usize {
        s.chars().count()
    }
}

// ── Transport ─────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct StringRequest {
    s: String,
}

#[derive(Serialize)]
struct UppercaseResponse {
    v: String,
}

impl Reply for UppercaseResponse {}

#[derive(Serialize)]
struct CountResponse {
    v: usize,
}

impl Reply for CountResponse {}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let svc = std::sync::Arc::new(Strings);
    let upper = std::sync::Arc::clone(&svc);
    let count = svc;

    let options = || {
        Options::new()
            .decoder(decode_json::<StringRequest>)
            .error_handler(LogErrorHandler)
    };

    let app = Router::with_config(Config { middleware: vec![middleware::trace()] })
        .on_with(
            Method::Get,
            "/",
            move |_ctx: Context, req: StringRequest| {
                let result = upper.uppercase(&req.s).map(|v| UppercaseResponse { v });
                async move { result }
            },
            options(),
        )
        .on_with(
            Method::Get,
            "/count",
            move |_ctx: Context, req: StringRequest| {
                let v = count.count(&req.s);
                async move { Ok::<_, EmptyString>(CountResponse { v }) }
            },
            options(),
        );

    if let Err(e) = Server::bind("0.0.0.0:8080").serve(app).await {
        tracing::error!("server error: {e}");
        std::process::exit(1);
    }
}

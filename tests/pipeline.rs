//! End-to-end behavior of registered routes, driven through `Router::dispatch`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bindery::http::header::{CONTENT_TYPE, HeaderValue};
use bindery::http::{HeaderMap, StatusCode};
use bindery::middleware::{self, Next};
use bindery::{
    Config, Context, Error, HttpError, Method, NoContent, Options, Reply, Request, Response,
    ResponseWriter, Router, decode_json,
};
use bytes::Bytes;
use http_body_util::BodyExt;
use serde::{Deserialize, Serialize};

// ── The string service ───────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("empty string")]
struct EmptyString;

impl HttpError for EmptyString {}

#[derive(Deserialize)]
struct UppercaseRequest {
    s: String,
}

#[derive(Serialize)]
struct UppercaseResponse {
    v: String,
}

impl Reply for UppercaseResponse {}

async fn uppercase(_ctx: Context, req: UppercaseRequest) -> Result<UppercaseResponse, EmptyString> {
    if req.s.is_empty() {
        return Err(EmptyString);
    }
    Ok(UppercaseResponse { v: req.s.to_uppercase() })
}

fn string_service() -> Router {
    Router::new().on_with(
        Method::Get,
        "/",
        uppercase,
        Options::new().decoder(decode_json::<UppercaseRequest>),
    )
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn request(method: &str, uri: &str, body: &'static str) -> Request {
    let raw = http::Request::builder()
        .method(method)
        .uri(uri)
        .body(Bytes::from_static(body.as_bytes()))
        .unwrap();
    Request::try_from(raw).unwrap()
}

async fn body_of(res: Response) -> Bytes {
    res.into_body().collect().await.unwrap().to_bytes()
}

// ── Scenarios ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn uppercases_the_decoded_field() {
    let res = string_service().dispatch(request("GET", "/", r#"{"s":"hi"}"#)).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[CONTENT_TYPE], "application/json; charset=utf-8");
    assert_eq!(body_of(res).await, r#"{"v":"HI"}"#);
}

#[tokio::test]
async fn domain_error_without_capabilities_is_plain_500() {
    let res = string_service().dispatch(request("GET", "/", r#"{"s":""}"#)).await;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
    assert_eq!(body_of(res).await, "empty string");
}

#[tokio::test]
async fn malformed_body_is_a_bad_request() {
    let res = string_service().dispatch(request("GET", "/", "{\"s\":")).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
}

#[tokio::test]
async fn decode_failure_never_reaches_the_handler() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counted = Arc::clone(&calls);
    let reported = Arc::new(AtomicUsize::new(0));
    let reports = Arc::clone(&reported);

    let router = Router::new().on_with(
        Method::Post,
        "/items",
        move |_ctx: Context, _req: serde_json::Value| {
            counted.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, Error>(NoContent) }
        },
        Options::new()
            .decoder(|_ctx: &Context, _req: Request| -> Result<serde_json::Value, Error> {
                Err(Error::msg("unreadable"))
            })
            .error_handler(move |_ctx: &Context, _err: &Error| {
                reports.fetch_add(1, Ordering::SeqCst);
            }),
    );

    let res = router.dispatch(request("POST", "/items", "")).await;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(reported.load(Ordering::SeqCst), 1);
    assert_eq!(body_of(res).await, "unreadable");
}

#[tokio::test]
async fn no_content_reply_has_an_empty_body() {
    #[derive(Serialize)]
    struct Deleted {
        id: u32,
    }

    impl Reply for Deleted {
        fn status_code(&self) -> Option<StatusCode> {
            Some(StatusCode::NO_CONTENT)
        }
    }

    let router = Router::new().on(Method::Delete, "/items/{id}", |_ctx: Context, req: Request| async move {
        let id: u32 = req.param("id").and_then(|id| id.parse().ok()).unwrap_or(0);
        Ok::<_, Error>(Deleted { id })
    });

    let res = router.dispatch(request("DELETE", "/items/9", "")).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(body_of(res).await.is_empty());
}

#[tokio::test]
async fn structured_error_keeps_status_headers_and_json() {
    #[derive(Debug, thiserror::Error, Serialize)]
    #[error("slow down")]
    struct RateLimited {
        retry_after: u32,
    }

    impl HttpError for RateLimited {
        fn status_code(&self) -> Option<StatusCode> {
            Some(StatusCode::TOO_MANY_REQUESTS)
        }

        fn headers(&self) -> Option<HeaderMap> {
            let mut h = HeaderMap::new();
            h.insert("retry-after", HeaderValue::from(self.retry_after));
            Some(h)
        }

        fn to_json(&self) -> Option<Result<Vec<u8>, serde_json::Error>> {
            Some(serde_json::to_vec(self))
        }
    }

    let router = Router::new().on(Method::Get, "/limited", |_ctx: Context, _req: Request| async {
        Err::<serde_json::Value, _>(RateLimited { retry_after: 30 })
    });

    let res = router.dispatch(request("GET", "/limited", "")).await;
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(res.headers()[CONTENT_TYPE], "application/json; charset=utf-8");
    assert_eq!(res.headers()["retry-after"], "30");
    assert_eq!(body_of(res).await, r#"{"retry_after":30}"#);
}

#[tokio::test]
async fn custom_codecs_replace_the_defaults() {
    fn encode_text(_ctx: &Context, w: &mut ResponseWriter, resp: String) -> Result<(), Error> {
        w.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        w.write(resp.as_bytes());
        Ok(())
    }

    fn encode_teapot(_ctx: &Context, err: &Error, w: &mut ResponseWriter) {
        w.write_status(StatusCode::IM_A_TEAPOT);
        w.write(format!("teapot: {err}").as_bytes());
    }

    let router = Router::new().on_with(
        Method::Post,
        "/echo",
        |_ctx: Context, body: String| async move {
            if body == "fail" {
                return Err(Error::msg("asked to"));
            }
            Ok(body)
        },
        Options::new()
            .decoder(|_ctx: &Context, req: Request| -> Result<String, Error> {
                String::from_utf8(req.into_body().to_vec()).map_err(Error::msg)
            })
            .encoder(encode_text)
            .error_encoder(|_ctx: &Context, _err: &Error, w: &mut ResponseWriter| {
                w.write_status(StatusCode::BAD_GATEWAY);
            })
            // Last write wins.
            .error_encoder(encode_teapot),
    );

    let ok = router.dispatch(request("POST", "/echo", "ping")).await;
    assert_eq!(ok.status(), StatusCode::OK);
    assert_eq!(body_of(ok).await, "ping");

    let failed = router.dispatch(request("POST", "/echo", "fail")).await;
    assert_eq!(failed.status(), StatusCode::IM_A_TEAPOT);
    assert_eq!(body_of(failed).await, "teapot: asked to");
}

// ── Middleware ───────────────────────────────────────────────────────────────

fn recording(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> bindery::Middleware {
    let log = Arc::clone(log);
    middleware::from_fn(move |req: Request, next: Next| {
        let log = Arc::clone(&log);
        async move {
            log.lock().unwrap().push(format!("{name} in"));
            let res = next.run(req).await;
            log.lock().unwrap().push(format!("{name} out"));
            res
        }
    })
}

#[tokio::test]
async fn router_middleware_wraps_route_middleware() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&log);

    let router = Router::with_config(Config {
        middleware: vec![recording("A", &log), recording("B", &log)],
    })
    .on_with(
        Method::Get,
        "/",
        move |_ctx: Context, _req: Request| {
            seen.lock().unwrap().push("handler".to_owned());
            async { Ok::<_, Error>(NoContent) }
        },
        Options::new()
            .middleware([recording("C", &log)])
            .middleware([recording("D", &log)]),
    );

    let res = router.dispatch(request("GET", "/", "")).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        *log.lock().unwrap(),
        [
            "A in", "B in", "C in", "D in", "handler", "D out", "C out", "B out", "A out",
        ]
    );
}

#[tokio::test]
async fn middleware_values_reach_the_handler_context() {
    #[derive(Clone)]
    struct RequestId(&'static str);

    let tag = middleware::from_fn(|mut req: Request, next: Next| async move {
        req.extensions_mut().insert(RequestId("req-1"));
        next.run(req).await
    });

    let router = Router::new().on_with(
        Method::Get,
        "/whoami",
        |ctx: Context, _req: Request| async move {
            let id = ctx.extensions().get::<RequestId>().map(|id| id.0);
            Ok::<_, Error>(serde_json::json!({ "request_id": id }))
        },
        Options::new().middleware([tag]),
    );

    let res = router.dispatch(request("GET", "/whoami", "")).await;
    assert_eq!(body_of(res).await, r#"{"request_id":"req-1"}"#);
}

#[tokio::test]
async fn trace_middleware_passes_the_response_through() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let router = Router::with_config(Config { middleware: vec![middleware::trace()] })
        .on(Method::Get, "/ping", |_ctx: Context, _req: Request| async {
            Ok::<_, Error>(serde_json::json!("pong"))
        });

    let res = router.dispatch(request("GET", "/ping", "")).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_of(res).await, r#""pong""#);
}

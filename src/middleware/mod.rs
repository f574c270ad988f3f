//! Middleware layer.
//!
//! Middleware intercepts requests and responses around a route and is the
//! right place for cross-cutting concerns: structured tracing, request-id
//! injection, authentication-header inspection.
//!
//! A [`Middleware`] takes the handler it wraps and returns a new one. Most
//! middleware is easier to write with [`from_fn`]:
//!
//! ```rust
//! use bindery::middleware::{self, Next};
//! use bindery::{Request, Response};
//!
//! let server_header = middleware::from_fn(|req: Request, next: Next| async move {
//!     let mut res: Response = next.run(req).await;
//!     res.headers_mut().insert("server", "bindery".parse().unwrap());
//!     res
//! });
//! ```
//!
//! Lists of middleware nest in order: the first one is the outermost, so it
//! sees the request first and the response last. Router-wide middleware
//! (from [`Config`](crate::Config)) always wraps per-route middleware (from
//! [`Options::middleware`](crate::Options::middleware)).

mod trace;

use std::future::Future;
use std::sync::Arc;

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};
use crate::request::Request;
use crate::response::Response;

pub use trace::trace;

/// Wraps a handler into another handler.
pub type Middleware = Arc<dyn Fn(BoxedHandler) -> BoxedHandler + Send + Sync>;

/// The rest of the chain, as seen from inside a [`from_fn`] middleware.
pub struct Next(BoxedHandler);

impl Next {
    /// Passes the request on and waits for the response.
    pub async fn run(self, req: Request) -> Response {
        self.0.call(req).await
    }
}

/// Builds a [`Middleware`] from an async function of the request and the
/// rest of the chain.
pub fn from_fn<F, Fut>(f: F) -> Middleware
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    let f = Arc::new(f);
    Arc::new(move |next: BoxedHandler| -> BoxedHandler {
        Arc::new(FromFn { f: Arc::clone(&f), next })
    })
}

struct FromFn<F> {
    f: Arc<F>,
    next: BoxedHandler,
}

impl<F, Fut> ErasedHandler for FromFn<F>
where
    F: Fn(Request, Next) -> Fut,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        Box::pin((self.f)(req, Next(Arc::clone(&self.next))))
    }
}

/// Wraps `handler` so that `middleware[0]` ends up outermost.
pub(crate) fn chain(handler: BoxedHandler, middleware: &[Middleware]) -> BoxedHandler {
    middleware.iter().rev().fold(handler, |inner, mw| mw(inner))
}

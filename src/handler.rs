//! Domain handlers, type erasure, and the adapter that runs a route.
//!
//! # From domain function to route
//!
//! A domain handler knows nothing about HTTP:
//!
//! ```text
//! async fn uppercase(ctx: Context, req: UppercaseRequest) -> Result<UppercaseResponse, E>
//! ```
//!
//! The router needs every route behind one uniform type so they can share a
//! radix tree. Registration wraps the handler with its decoder, encoder and
//! error hooks into an adapter, then erases the adapter's type:
//!
//! ```text
//! router.on_with(Method::Get, "/", uppercase, options)
//!        ↓
//! Endpoint { handler, decoder, encoder, error_encoder, error_handler }
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! handler.call(request)  at request time
//!        ↓
//! decode → handle → encode          any failure → error handler → error encoder
//! ```
//!
//! Middleware sees the same [`ErasedHandler`] interface, so wrapping a route
//! is just building another `BoxedHandler` around it.

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;

use tracing::debug;

use crate::codec::{Decode, Encode, ErrorEncoder};
use crate::context::Context;
use crate::error::Error;
use crate::error_handler::ErrorHandler;
use crate::request::Request;
use crate::response::{Response, ResponseWriter};

// ── Type-erased routes ────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future that resolves to a [`Response`].
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// The uniform interface of everything the router dispatches to: adapted
/// routes and the middleware wrapped around them.
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A type-erased route shared across concurrent requests.
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Domain handlers ───────────────────────────────────────────────────────────

type HandlerFuture<Resp> = Pin<Box<dyn Future<Output = Result<Resp, Error>> + Send + 'static>>;

/// Implemented for every valid domain handler.
///
/// You never implement this yourself. It is satisfied by any `async fn` or
/// closure with the shape
///
/// ```text
/// async fn name(ctx: Context, req: Req) -> Result<Resp, E>
/// ```
///
/// where `E` converts into [`Error`] (any [`HttpError`](crate::HttpError),
/// or `Error` itself). The trait is sealed.
pub trait Handler<Req, Resp>: private::Sealed<Req, Resp> + Send + Sync + 'static {
    #[doc(hidden)]
    fn call(&self, ctx: Context, req: Req) -> HandlerFuture<Resp>;
}

mod private {
    pub trait Sealed<Req, Resp> {}
}

impl<F, Fut, Req, Resp, E> private::Sealed<Req, Resp> for F
where
    F: Fn(Context, Req) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Resp, E>> + Send + 'static,
    E: Into<Error>,
{
}

impl<F, Fut, Req, Resp, E> Handler<Req, Resp> for F
where
    F: Fn(Context, Req) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Resp, E>> + Send + 'static,
    E: Into<Error>,
{
    fn call(&self, ctx: Context, req: Req) -> HandlerFuture<Resp> {
        let fut = self(ctx, req);
        Box::pin(async move { fut.await.map_err(Into::into) })
    }
}

// ── The adapter ───────────────────────────────────────────────────────────────

/// Which step of the pipeline failed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Stage {
    Decode,
    Handle,
    Encode,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Decode => "decode",
            Self::Handle => "handle",
            Self::Encode => "encode",
        })
    }
}

/// One registered route: a domain handler plus everything needed to speak
/// HTTP on its behalf.
pub(crate) struct Endpoint<H, D, E, Req, Resp> {
    pub(crate) pattern: Arc<str>,
    pub(crate) handler: H,
    pub(crate) decoder: D,
    pub(crate) encoder: E,
    pub(crate) error_encoder: ErrorEncoder,
    pub(crate) error_handler: Arc<dyn ErrorHandler>,
    pub(crate) _types: PhantomData<fn(Req) -> Resp>,
}

impl<H, D, E, Req, Resp> Endpoint<H, D, E, Req, Resp>
where
    H: Handler<Req, Resp>,
    D: Decode<Req>,
    E: Encode<Resp>,
    Req: Send + 'static,
    Resp: Send + 'static,
{
    pub(crate) fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(Adapter(Arc::new(self)))
    }

    /// Runs the pipeline. Always produces a response: on failure the error
    /// handler and error encoder each run exactly once.
    async fn serve(&self, req: Request) -> Response {
        let ctx = Context::for_request(&req, &self.pattern);
        let mut w = ResponseWriter::new();

        if let Err((stage, err)) = self.run(&ctx, req, &mut w).await {
            debug!(%stage, method = %ctx.method(), path = ctx.path(), "request failed: {err}");
            self.error_handler.handle(&ctx, &err);
            w.reset();
            (self.error_encoder)(&ctx, &err, &mut w);
        }

        w.finish()
    }

    async fn run(
        &self,
        ctx: &Context,
        req: Request,
        w: &mut ResponseWriter,
    ) -> Result<(), (Stage, Error)> {
        let input = self.decoder.decode(ctx, req).map_err(|e| (Stage::Decode, e))?;
        let output = self
            .handler
            .call(ctx.clone(), input)
            .await
            .map_err(|e| (Stage::Handle, e))?;
        self.encoder.encode(ctx, w, output).map_err(|e| (Stage::Encode, e))
    }
}

/// Shares one [`Endpoint`] between all in-flight requests of its route.
struct Adapter<H, D, E, Req, Resp>(Arc<Endpoint<H, D, E, Req, Resp>>);

impl<H, D, E, Req, Resp> ErasedHandler for Adapter<H, D, E, Req, Resp>
where
    H: Handler<Req, Resp>,
    D: Decode<Req>,
    E: Encode<Resp>,
    Req: Send + 'static,
    Resp: Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let endpoint = Arc::clone(&self.0);
        Box::pin(async move { endpoint.serve(req).await })
    }
}

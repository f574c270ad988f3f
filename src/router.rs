//! Radix-tree request router.
//!
//! One `matchit` tree per HTTP method. O(path-length) lookup. Matching is
//! entirely `matchit`'s job; this module decides what gets stored in the
//! trees: each route's adapter, wrapped in its middleware.

use std::collections::HashMap;
use std::sync::Arc;

use http::StatusCode;
use http::header::{ALLOW, HeaderValue};
use matchit::Router as MatchitRouter;

use crate::codec::{Decode, Encode, Json, Passthrough};
use crate::handler::{BoxedHandler, Endpoint, Handler};
use crate::method::Method;
use crate::middleware::{self, Middleware};
use crate::options::Options;
use crate::request::Request;
use crate::response::{self, Response};

/// Router-wide configuration.
#[derive(Clone, Default)]
pub struct Config {
    /// Middleware wrapped around every route, outermost first.
    pub middleware: Vec<Middleware>,
}

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve)
/// or call [`Router::dispatch`] yourself. Each registration returns `self`
/// so registrations chain naturally. The table is never modified after
/// that, so serving needs no locking.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    middleware: Vec<Middleware>,
}

impl Router {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self { routes: HashMap::new(), middleware: config.middleware }
    }

    /// Register a handler with the default [`Options`]: the handler gets the
    /// raw [`Request`] and its result is encoded as JSON.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them:
    ///
    /// ```rust
    /// use bindery::{Context, Error, Method, Request, Router};
    /// use serde_json::{Value, json};
    ///
    /// async fn get_user(_ctx: Context, req: Request) -> Result<Value, Error> {
    ///     Ok(json!({ "id": req.param("id") }))
    /// }
    ///
    /// let router = Router::new().on(Method::Get, "/users/{id}", get_user);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid pattern or conflicts with a route
    /// already registered for `method`.
    pub fn on<H, Req, Resp>(self, method: Method, path: &str, handler: H) -> Self
    where
        H: Handler<Req, Resp>,
        Passthrough: Decode<Req>,
        Json: Encode<Resp>,
        Req: Send + 'static,
        Resp: Send + 'static,
    {
        self.on_with(method, path, handler, Options::new())
    }

    /// Register a handler with custom [`Options`].
    ///
    /// The route is wrapped in its own middleware first, then in the
    /// router-wide middleware, so router-wide middleware is outermost.
    ///
    /// # Panics
    ///
    /// Same as [`Router::on`].
    pub fn on_with<H, D, E, Req, Resp>(
        self,
        method: Method,
        path: &str,
        handler: H,
        options: Options<D, E>,
    ) -> Self
    where
        H: Handler<Req, Resp>,
        D: Decode<Req>,
        E: Encode<Resp>,
        Req: Send + 'static,
        Resp: Send + 'static,
    {
        let Options { decoder, encoder, error_encoder, error_handler, middleware: per_route } = options;

        let endpoint = Endpoint {
            pattern: Arc::from(path),
            handler,
            decoder,
            encoder,
            error_encoder,
            error_handler,
            _types: Default::default(),
        }
        .into_boxed_handler();

        let route = middleware::chain(endpoint, &per_route);
        let route = middleware::chain(route, &self.middleware);
        self.add(method, path, route)
    }

    fn add(mut self, method: Method, path: &str, route: BoxedHandler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, route)
            .unwrap_or_else(|e| panic!("invalid route `{method} {path}`: {e}"));
        self
    }

    pub(crate) fn lookup(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }

    /// Routes one request and produces its response.
    ///
    /// Unmatched paths get `404`; a path that only exists under other
    /// methods gets `405` with an `Allow` header listing them.
    pub async fn dispatch(&self, mut req: Request) -> Response {
        match self.lookup(req.method(), req.path()) {
            Some((handler, params)) => {
                req.params = params;
                handler.call(req).await
            }
            None => self.unmatched(&req),
        }
    }

    fn unmatched(&self, req: &Request) -> Response {
        let allowed: Vec<&str> = Method::ALL
            .into_iter()
            .filter(|m| self.routes.get(m).is_some_and(|tree| tree.at(req.path()).is_ok()))
            .map(Method::as_str)
            .collect();

        if allowed.is_empty() {
            return response::plain(StatusCode::NOT_FOUND, "404 page not found");
        }

        let mut res = response::plain(StatusCode::METHOD_NOT_ALLOWED, "405 method not allowed");
        if let Ok(value) = HeaderValue::from_str(&allowed.join(", ")) {
            res.headers_mut().insert(ALLOW, value);
        }
        res
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

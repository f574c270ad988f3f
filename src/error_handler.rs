//! Diagnostic hook for failed requests.
//!
//! The error handler sees every decode, handler and encode failure exactly
//! once, right before the error encoder turns it into a response. It cannot
//! change the response; it is there to log, count or alert.

use tracing::error;

use crate::context::Context;
use crate::error::Error;

/// Receives each transport error for diagnostics. Must not panic.
///
/// Closures `Fn(&Context, &Error)` are error handlers:
///
/// ```rust
/// use bindery::{Context, Error, Options};
///
/// let options = Options::new().error_handler(|ctx: &Context, err: &Error| {
///     eprintln!("{} {} failed: {err}", ctx.method(), ctx.path());
/// });
/// ```
pub trait ErrorHandler: Send + Sync + 'static {
    fn handle(&self, ctx: &Context, err: &Error);
}

impl<F> ErrorHandler for F
where
    F: Fn(&Context, &Error) + Send + Sync + 'static,
{
    fn handle(&self, ctx: &Context, err: &Error) {
        self(ctx, err)
    }
}

/// The handler every route starts with. Does nothing; applications that
/// want reporting install [`LogErrorHandler`] or their own.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultErrorHandler;

impl DefaultErrorHandler {
    fn notify(&self, _ctx: &Context, _err: &Error) {}

    fn log(&self, _ctx: &Context, _err: &Error) {}
}

impl ErrorHandler for DefaultErrorHandler {
    fn handle(&self, ctx: &Context, err: &Error) {
        self.notify(ctx, err);
        self.log(ctx, err);
    }
}

/// Emits one `tracing` error event per failed request.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogErrorHandler;

impl ErrorHandler for LogErrorHandler {
    fn handle(&self, ctx: &Context, err: &Error) {
        let status = err.status_code().map(|s| s.as_u16()).unwrap_or(500);
        error!(
            method = %ctx.method(),
            path = ctx.path(),
            route = ctx.pattern(),
            status,
            "request failed: {err}"
        );
    }
}

//! The application: route registry, resolution tables, and the dispatcher.
//!
//! An [`App`] is built once during setup through the [`Routes`] helpers,
//! [`App::group`], [`App::error`] and [`App::not_found`], then shared
//! read-only by every request. [`App::call`] turns one [`Request`] into one
//! [`Response`]:
//!
//! 1. Look the route up by method and path; a miss goes to the not-found
//!    handler or the canned 404.
//! 2. Run the handler with a fresh [`Context`] holding the captured params.
//! 3. A normal return is normalized, a [`Halt`](crate::error::Halt) answers
//!    with its own response, and a [`Failure`] is resolved through the error
//!    handler registered for the closest kind in its ancestry (or the canned
//!    500).
//! 4. `HEAD` requests get their body dropped and a `content-length` added.
//!
//! Handler failures and panics never escape `call`.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::context::Context;
use crate::error::{ConfigError, Error, ErrorKind};
use crate::handler::{Handler, IntoErrorHandler, IntoHandler};
use crate::http::{Method, Request, Response};
use crate::router::{Match, PathParams, Router};

mod group;
mod rescue;

pub use group::{Group, Routes};
use rescue::{Rescue, guard};

/// A routing application.
///
/// # Examples
///
/// ```rust,no_run
/// use switchyard::error::{Failure, kind};
/// use switchyard::{App, Context, Routes};
///
/// # fn setup() -> Result<App, switchyard::ConfigError> {
/// let mut app = App::new();
/// app.get("/", || async { "hello" })?
///     .get("/users/:id", |ctx: Context| async move {
///         let id: u32 = ctx.param("id").unwrap_or_default().parse()?;
///         Ok::<_, Failure>(ctx.text(format!("user {id}")))
///     })?;
/// app.error(&kind::ARGUMENT, |ctx: Context| async move {
///     ctx.text_with("bad id", switchyard::context::Overrides::new().status(400))
/// });
/// # Ok(app)
/// # }
/// ```
#[derive(Debug, Default)]
pub struct App {
    router: Router<Handler>,
    rescue: Rescue,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// The underlying route table.
    pub fn router(&self) -> &Router<Handler> {
        &self.router
    }

    /// A registrar that prefixes every path with `prefix`.
    pub fn group(&mut self, prefix: &str) -> Group<'_> {
        Group::new(&mut self.router, prefix)
    }

    /// Handles failures of `kind` and every kind descending from it.
    ///
    /// Registering the same kind again replaces the earlier handler.
    pub fn error<M>(&mut self, kind: &'static ErrorKind, handler: impl IntoErrorHandler<M>) -> &mut Self {
        self.rescue.set_error(kind, handler.into_error_handler());
        self
    }

    /// Handles requests no route matches, in place of the canned 404.
    pub fn not_found<M>(&mut self, handler: impl IntoHandler<M>) -> &mut Self {
        self.rescue.set_not_found(handler.into_handler());
        self
    }

    /// Dispatches one request to completion.
    pub async fn call(&self, request: Request) -> Response {
        let request = Arc::new(request);
        let method = request.method().clone();

        let response = match self.router.lookup(&method, request.path()) {
            Some(Match { route, params }) => self.dispatch(route.handler(), &request, params).await,
            None => {
                debug!(%method, path = request.path(), "no route matched");
                self.rescue.not_found(&request).await
            }
        };

        if method == Method::Head {
            response.into_head()
        } else {
            response
        }
    }

    async fn dispatch(&self, handler: &Handler, request: &Arc<Request>, params: PathParams) -> Response {
        let handler = handler.clone();
        let ctx = Context::new(Arc::clone(request), params.clone());

        match guard(move || handler.call(ctx)).await {
            Ok(response) => response,
            Err(Error::Halt(halt)) => {
                debug!(status = %halt.status(), path = request.path(), "handler halted");
                halt.into_response()
            }
            Err(Error::Failure(failure)) => {
                warn!(
                    method = %request.method(),
                    path = request.path(),
                    kind = failure.kind().name(),
                    error = %failure,
                    "handler failed"
                );
                self.rescue.recover(failure, request, params).await
            }
        }
    }
}

impl Routes for App {
    fn add_route(&mut self, method: Method, path: &str, handler: Handler) -> Result<(), ConfigError> {
        self.router.add(method, path, handler)?;
        Ok(())
    }
}

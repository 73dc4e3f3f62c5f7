//! Failure and not-found resolution.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::context::Context;
use crate::error::{Error, ErrorKind, Failure, kind};
use crate::handler::{BoxFuture, ErrorHandler, Handler, Outcome};
use crate::http::{Request, Response};
use crate::router::PathParams;

/// Error handler table, keyed by kind identity, and the optional custom
/// not-found handler.
#[derive(Debug, Default)]
pub(crate) struct Rescue {
    errors: HashMap<&'static ErrorKind, ErrorHandler>,
    not_found: Option<Handler>,
}

impl Rescue {
    pub(crate) fn set_error(&mut self, kind: &'static ErrorKind, handler: ErrorHandler) {
        if self.errors.insert(kind, handler).is_some() {
            debug!(kind = kind.name(), "error handler replaced");
        }
    }

    pub(crate) fn set_not_found(&mut self, handler: Handler) {
        self.not_found = Some(handler);
    }

    /// The handler registered for the closest kind in `kind`'s ancestry.
    pub(crate) fn find(&self, kind: &'static ErrorKind) -> Option<&ErrorHandler> {
        kind.ancestry().find_map(|ancestor| self.errors.get(&ancestor))
    }

    /// Runs the custom not-found handler with a parameterless context, or
    /// returns the canned 404.
    pub(crate) async fn not_found(&self, request: &Arc<Request>) -> Response {
        let Some(handler) = &self.not_found else {
            return Response::not_found();
        };
        let handler = handler.clone();
        let ctx = Context::new(Arc::clone(request), PathParams::new());
        settle(guard(move || handler.call(ctx)).await)
    }

    /// Resolves `failure` through the most specific registered handler, or
    /// returns the canned 500.
    pub(crate) async fn recover(&self, failure: Failure, request: &Arc<Request>, params: PathParams) -> Response {
        let Some(handler) = self.find(failure.kind()) else {
            return Response::internal_error();
        };
        let handler = handler.clone();
        let ctx = Context::new(Arc::clone(request), params);
        settle(guard(move || handler.call(failure, ctx)).await)
    }
}

/// Invokes a handler on its own task so a panic surfaces as a failure of kind
/// [`PANIC`](kind::PANIC) instead of unwinding into the caller.
///
/// The invocation itself runs on that task too, which covers handlers that
/// panic before handing back their future.
pub(crate) async fn guard<F>(invoke: F) -> Outcome
where
    F: FnOnce() -> BoxFuture<Outcome> + Send + 'static,
{
    match tokio::spawn(async move { invoke().await }).await {
        Ok(outcome) => outcome,
        Err(err) if err.is_panic() => {
            let payload = err.into_panic();
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_owned())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "handler panicked".to_owned());
            Err(Failure::msg(&kind::PANIC, message).into())
        }
        Err(err) => Err(Failure::new(&kind::RUNTIME, err).into()),
    }
}

// Outcome of a rescue handler: halts still answer, failures do not recurse.
fn settle(outcome: Outcome) -> Response {
    match outcome {
        Ok(response) => response,
        Err(Error::Halt(halt)) => halt.into_response(),
        Err(Error::Failure(failure)) => {
            warn!(kind = failure.kind().name(), error = %failure, "rescue handler failed");
            Response::internal_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{IntoErrorHandler, IntoHandler};
    use crate::http::StatusCode;

    static DATABASE: ErrorKind = ErrorKind::new("database", &kind::RUNTIME);

    fn request() -> Arc<Request> {
        let (request, _) = Request::parse(b"GET /x HTTP/1.1\r\nHost: localhost\r\n\r\n").unwrap();
        Arc::new(request)
    }

    fn on_error<M>(handler: impl IntoErrorHandler<M>) -> ErrorHandler {
        handler.into_error_handler()
    }

    fn body(response: Response) -> String {
        let (_, _, body) = response.into_parts();
        String::from_utf8(body.into_bytes().to_vec()).unwrap()
    }

    #[test]
    fn find_walks_ancestry() {
        let mut rescue = Rescue::default();
        rescue.set_error(&kind::ANY, on_error(|| async { "any" }));
        assert!(rescue.find(&DATABASE).is_some());
        assert!(Rescue::default().find(&DATABASE).is_none());
    }

    #[tokio::test]
    async fn most_specific_handler_wins() {
        let mut rescue = Rescue::default();
        rescue.set_error(&kind::RUNTIME, on_error(|| async { "runtime" }));
        rescue.set_error(&DATABASE, on_error(|| async { "database" }));

        let specific = rescue.recover(Failure::msg(&DATABASE, "down"), &request(), PathParams::new()).await;
        assert_eq!(body(specific), "database");

        let broad = rescue.recover(Failure::msg(&kind::RUNTIME, "x"), &request(), PathParams::new()).await;
        assert_eq!(body(broad), "runtime");
    }

    #[tokio::test]
    async fn later_registration_replaces_earlier() {
        let mut rescue = Rescue::default();
        rescue.set_error(&kind::IO, on_error(|| async { "first" }));
        rescue.set_error(&kind::IO, on_error(|| async { "second" }));
        let response = rescue.recover(Failure::msg(&kind::IO, "x"), &request(), PathParams::new()).await;
        assert_eq!(body(response), "second");
    }

    #[tokio::test]
    async fn unhandled_failure_is_canned_500() {
        let response = Rescue::default()
            .recover(Failure::msg(&kind::RUNTIME, "boom"), &request(), PathParams::new())
            .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body(response), "Internal Server Error");
    }

    #[tokio::test]
    async fn failing_error_handler_falls_back_to_500() {
        let mut rescue = Rescue::default();
        rescue.set_error(
            &kind::ANY,
            on_error(|| async { Err::<String, _>(Failure::msg(&kind::RUNTIME, "again")) }),
        );
        let response = rescue.recover(Failure::msg(&kind::IO, "x"), &request(), PathParams::new()).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn not_found_uses_custom_handler() {
        assert_eq!(Rescue::default().not_found(&request()).await.status(), StatusCode::NOT_FOUND);

        let mut rescue = Rescue::default();
        rescue.set_not_found((|ctx: Context| async move { ctx.text(format!("no {}", ctx.request().path())) }).into_handler());
        let response = rescue.not_found(&request()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(response), "no /x");
    }

    #[tokio::test]
    async fn guard_turns_panics_into_failures() {
        let handler = (|| async {
            if true {
                panic!("kaboom");
            }
            "unreachable"
        })
        .into_handler();
        let ctx = Context::new(request(), PathParams::new());
        match guard(move || handler.call(ctx)).await {
            Err(Error::Failure(failure)) => {
                assert_eq!(failure.kind(), &kind::PANIC);
                assert_eq!(failure.message(), "kaboom");
            }
            other => panic!("expected panic failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn guard_covers_panics_before_the_future_exists() {
        let handler = (|ctx: Context| {
            let values: Vec<u8> = Vec::new();
            let picked = values[ctx.params().len() + 3];
            async move { picked.to_string() }
        })
        .into_handler();
        let ctx = Context::new(request(), PathParams::new());
        match guard(move || handler.call(ctx)).await {
            Err(Error::Failure(failure)) => assert_eq!(failure.kind(), &kind::PANIC),
            other => panic!("expected panic failure, got {other:?}"),
        }
    }

    static TIMEOUT_IO: ErrorKind = ErrorKind::new("timeout", &kind::IO);
    static TIMEOUT_RUNTIME: ErrorKind = ErrorKind::new("timeout", &kind::RUNTIME);

    #[tokio::test]
    async fn same_name_kinds_resolve_through_their_own_parents() {
        let mut rescue = Rescue::default();
        rescue.set_error(&TIMEOUT_IO, on_error(|| async { "io timeout" }));
        rescue.set_error(&kind::RUNTIME, on_error(|| async { "runtime" }));

        let response = rescue
            .recover(Failure::msg(&TIMEOUT_RUNTIME, "slow"), &request(), PathParams::new())
            .await;
        assert_eq!(body(response), "runtime");

        let response = rescue
            .recover(Failure::msg(&TIMEOUT_IO, "slow"), &request(), PathParams::new())
            .await;
        assert_eq!(body(response), "io timeout");
    }
}

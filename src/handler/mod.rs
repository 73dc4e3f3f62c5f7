//! Handler shapes and their registration-time classification.
//!
//! Handlers come in a few call shapes. Which one a value has is decided once,
//! when it is registered, by converting it into a tagged union:
//!
//! - [`Handler`] for routes and the not-found fallback: no arguments, or a
//!   [`Context`].
//! - [`ErrorHandler`] for failures: no arguments, a [`Context`], or the
//!   [`Failure`] together with a [`Context`].
//!
//! Besides closures, routes accept [`Endpoint`] objects, either shared across
//! every request or built fresh per request through a [`Factory`].
//!
//! Whatever a handler returns is turned into an [`Outcome`] by
//! [`IntoOutcome`]: a response, or an [`Error`] for the dispatcher to resolve.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::Context;
use crate::error::{Error, Failure};
use crate::http::{IntoResponse, Response};

/// What a handler invocation settles to.
pub type Outcome = Result<Response, Error>;

/// Heap-allocated, sendable future.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

type NullaryFn = Arc<dyn Fn() -> BoxFuture<Outcome> + Send + Sync + 'static>;
type ContextFn = Arc<dyn Fn(Context) -> BoxFuture<Outcome> + Send + Sync + 'static>;
type FailureFn = Arc<dyn Fn(Failure, Context) -> BoxFuture<Outcome> + Send + Sync + 'static>;

/// Conversion from a handler's return value into an [`Outcome`].
///
/// Anything [`IntoResponse`] succeeds as-is; a `Result` forwards its error
/// into [`Error`], so handlers can use `?` on halts and failures alike.
pub trait IntoOutcome {
    fn into_outcome(self) -> Outcome;
}

impl<T: IntoResponse> IntoOutcome for T {
    fn into_outcome(self) -> Outcome {
        Ok(self.into_response())
    }
}

impl<T, E> IntoOutcome for Result<T, E>
where
    T: IntoResponse,
    E: Into<Error>,
{
    fn into_outcome(self) -> Outcome {
        self.map(IntoResponse::into_response).map_err(Into::into)
    }
}

/// A route or not-found handler, classified by call shape.
#[derive(Clone)]
pub enum Handler {
    /// Called without arguments; the dispatcher's context is dropped.
    Nullary(NullaryFn),
    /// Called with the request's [`Context`].
    Contextual(ContextFn),
}

impl Handler {
    /// Invokes the handler in the shape it was registered with.
    pub fn call(&self, ctx: Context) -> BoxFuture<Outcome> {
        match self {
            Handler::Nullary(handler) => handler(),
            Handler::Contextual(handler) => handler(ctx),
        }
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Handler::Nullary(_) => f.write_str("Handler::Nullary"),
            Handler::Contextual(_) => f.write_str("Handler::Contextual"),
        }
    }
}

/// An error handler, classified by call shape.
#[derive(Clone)]
pub enum ErrorHandler {
    Nullary(NullaryFn),
    Contextual(ContextFn),
    /// Called with the failure and a fresh [`Context`].
    WithFailure(FailureFn),
}

impl ErrorHandler {
    pub fn call(&self, failure: Failure, ctx: Context) -> BoxFuture<Outcome> {
        match self {
            ErrorHandler::Nullary(handler) => handler(),
            ErrorHandler::Contextual(handler) => handler(ctx),
            ErrorHandler::WithFailure(handler) => handler(failure, ctx),
        }
    }
}

impl std::fmt::Debug for ErrorHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorHandler::Nullary(_) => f.write_str("ErrorHandler::Nullary"),
            ErrorHandler::Contextual(_) => f.write_str("ErrorHandler::Contextual"),
            ErrorHandler::WithFailure(_) => f.write_str("ErrorHandler::WithFailure"),
        }
    }
}

/// Type-level tags telling the handler conversions apart.
pub mod marker {
    /// `Fn() -> impl Future`
    #[derive(Debug)]
    pub enum NoArgs {}
    /// `Fn(Context) -> impl Future`
    #[derive(Debug)]
    pub enum WithContext {}
    /// `Fn(Failure, Context) -> impl Future`
    #[derive(Debug)]
    pub enum WithFailure {}
    /// An [`Endpoint`](super::Endpoint) shared by every request.
    #[derive(Debug)]
    pub enum Shared {}
    /// An [`Endpoint`](super::Endpoint) built per request by a [`Factory`](super::Factory).
    #[derive(Debug)]
    pub enum Fresh {}
    /// An already classified [`Handler`](super::Handler).
    #[derive(Debug)]
    pub enum Classified {}
}

/// Conversion into a route [`Handler`].
///
/// Implemented for async closures taking nothing or a [`Context`], for
/// [`Endpoint`] values, for [`Factory`] values, and for [`Handler`] itself.
/// The `M` parameter only tells the implementations apart; it is always
/// inferred.
pub trait IntoHandler<M>: Send + Sync + 'static {
    fn into_handler(self) -> Handler;
}

impl<F, Fut> IntoHandler<marker::NoArgs> for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: IntoOutcome,
{
    fn into_handler(self) -> Handler {
        Handler::Nullary(Arc::new(move || {
            let fut = self();
            Box::pin(async move { fut.await.into_outcome() })
        }))
    }
}

impl<F, Fut> IntoHandler<marker::WithContext> for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: IntoOutcome,
{
    fn into_handler(self) -> Handler {
        Handler::Contextual(Arc::new(move |ctx| {
            let fut = self(ctx);
            Box::pin(async move { fut.await.into_outcome() })
        }))
    }
}

impl IntoHandler<marker::Classified> for Handler {
    fn into_handler(self) -> Handler {
        self
    }
}

/// Conversion into an [`ErrorHandler`].
pub trait IntoErrorHandler<M>: Send + Sync + 'static {
    fn into_error_handler(self) -> ErrorHandler;
}

impl<F, Fut> IntoErrorHandler<marker::NoArgs> for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: IntoOutcome,
{
    fn into_error_handler(self) -> ErrorHandler {
        ErrorHandler::Nullary(Arc::new(move || {
            let fut = self();
            Box::pin(async move { fut.await.into_outcome() })
        }))
    }
}

impl<F, Fut> IntoErrorHandler<marker::WithContext> for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: IntoOutcome,
{
    fn into_error_handler(self) -> ErrorHandler {
        ErrorHandler::Contextual(Arc::new(move |ctx| {
            let fut = self(ctx);
            Box::pin(async move { fut.await.into_outcome() })
        }))
    }
}

impl<F, Fut> IntoErrorHandler<marker::WithFailure> for F
where
    F: Fn(Failure, Context) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: IntoOutcome,
{
    fn into_error_handler(self) -> ErrorHandler {
        ErrorHandler::WithFailure(Arc::new(move |failure, ctx| {
            let fut = self(failure, ctx);
            Box::pin(async move { fut.await.into_outcome() })
        }))
    }
}

/// A handler object.
///
/// Register a value directly to share one instance across every request, or
/// wrap the type in a [`Factory`] to build a fresh instance per request.
///
/// # Examples
///
/// ```rust,no_run
/// use switchyard::{App, Context, Endpoint, Factory, Response, Routes};
///
/// #[derive(Default)]
/// struct Hello;
///
/// impl Endpoint for Hello {
///     type Output = Response;
///
///     async fn call(&self, ctx: Context) -> Response {
///         ctx.text("hi")
///     }
/// }
///
/// # fn setup() -> Result<(), switchyard::ConfigError> {
/// let mut app = App::new();
/// app.get("/shared", Hello)?;
/// app.get("/fresh", Factory::<Hello>::new())?;
/// # Ok(())
/// # }
/// ```
pub trait Endpoint: Send + Sync + 'static {
    type Output: IntoOutcome;

    fn call(&self, ctx: Context) -> impl Future<Output = Self::Output> + Send;
}

impl<E: Endpoint> IntoHandler<marker::Shared> for E {
    fn into_handler(self) -> Handler {
        let endpoint = Arc::new(self);
        Handler::Contextual(Arc::new(move |ctx| {
            let endpoint = Arc::clone(&endpoint);
            Box::pin(async move { endpoint.call(ctx).await.into_outcome() })
        }))
    }
}

/// Builds a new [`Endpoint`] for every request it serves.
pub struct Factory<E> {
    make: fn() -> E,
}

impl<E: Endpoint + Default> Factory<E> {
    /// A factory using `E::default`.
    pub fn new() -> Self {
        Self { make: E::default }
    }
}

impl<E: Endpoint + Default> Default for Factory<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Endpoint> Factory<E> {
    /// A factory using a custom constructor.
    pub fn with(make: fn() -> E) -> Self {
        Self { make }
    }
}

impl<E> std::fmt::Debug for Factory<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(std::any::type_name::<Self>())
    }
}

impl<E: Endpoint> IntoHandler<marker::Fresh> for Factory<E> {
    fn into_handler(self) -> Handler {
        let make = self.make;
        Handler::Contextual(Arc::new(move |ctx| {
            Box::pin(async move {
                let endpoint = make();
                endpoint.call(ctx).await.into_outcome()
            })
        }))
    }
}

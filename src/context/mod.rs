//! Per-request context: route parameters, request metadata, and response building.
//!
//! A [`Context`] is created by the dispatcher for exactly one request and
//! handed to the handler by value. It carries the parameters the router
//! captured, a view of the inbound request, and the response status and
//! headers the handler accumulates before building its response with one of
//! the helpers:
//!
//! - [`text`](Context::text), [`html`](Context::html), [`json`](Context::json)
//!   build a response with a helper-specific default content type.
//! - [`redirect`](Context::redirect) records a `location` header and status.
//! - [`halt`](Context::halt) aborts the handler with a finished response.

use std::convert::Infallible;
use std::net::IpAddr;
use std::sync::Arc;

use serde::Serialize;

use crate::error::{Error, Halt};
use crate::http::response::{APPLICATION_JSON, TEXT_HTML, TEXT_PLAIN};
use crate::http::{Body, Headers, Request, Response, StatusCode};
use crate::router::PathParams;

mod state;

pub use state::Overrides;
use state::ResponseState;

/// Per-request context handed to handlers.
///
/// # Examples
///
/// ```rust,no_run
/// use switchyard::{App, Context, Routes};
///
/// # fn setup() -> Result<(), switchyard::ConfigError> {
/// let mut app = App::new();
/// app.get("/hello/:name", |mut ctx: Context| async move {
///     ctx.set_status(201).set_header("X-Greeting", "1");
///     let name = ctx.param("name").unwrap_or("stranger").to_owned();
///     ctx.text(format!("hello, {name}"))
/// })?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Context {
    request: Arc<Request>,
    params: PathParams,
    state: ResponseState,
}

impl Context {
    /// Creates a context for `request` with the parameters captured by the router.
    pub fn new(request: Arc<Request>, params: PathParams) -> Self {
        Self {
            request,
            params,
            state: ResponseState::default(),
        }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Route parameters captured from the path.
    pub fn params(&self) -> &PathParams {
        &self.params
    }

    /// A single route parameter by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// A query-string parameter by name.
    pub fn query(&self, name: &str) -> Option<&str> {
        self.request.query_param(name)
    }

    /// An inbound request header, looked up case-insensitively.
    pub fn request_header(&self, name: &str) -> Option<&str> {
        self.request.headers().get(name)
    }

    /// The client's IP address, when the transport recorded it.
    pub fn ip(&self) -> Option<IpAddr> {
        self.request.peer_addr().map(|addr| addr.ip())
    }

    /// The current response status (`200` until changed).
    pub fn status(&self) -> StatusCode {
        self.state.status()
    }

    pub fn set_status(&mut self, status: impl Into<StatusCode>) -> &mut Self {
        self.state.set_status(status.into());
        self
    }

    /// An accumulated response header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.state.headers().get(name)
    }

    pub fn set_header(&mut self, name: impl AsRef<str>, value: impl Into<String>) -> &mut Self {
        self.state.headers_mut().insert(name, value);
        self
    }

    /// All accumulated response headers.
    pub fn headers(&self) -> &Headers {
        self.state.headers()
    }

    /// Merges headers into the accumulated set; incoming values win.
    pub fn merge_headers<I, K, V>(&mut self, headers: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        self.state.headers_mut().extend(headers);
        self
    }

    /// A plain-text response with the current status and headers.
    pub fn text(&self, body: impl std::fmt::Display) -> Response {
        self.text_with(body, Overrides::new())
    }

    pub fn text_with(&self, body: impl std::fmt::Display, overrides: Overrides) -> Response {
        self.state.build(body.to_string(), &overrides, TEXT_PLAIN)
    }

    /// An HTML response with the current status and headers.
    pub fn html(&self, body: impl std::fmt::Display) -> Response {
        self.html_with(body, Overrides::new())
    }

    pub fn html_with(&self, body: impl std::fmt::Display, overrides: Overrides) -> Response {
        self.state.build(body.to_string(), &overrides, TEXT_HTML)
    }

    /// A JSON response with the current status and headers.
    ///
    /// # Errors
    ///
    /// Fails with a [`SERIALIZATION`](crate::error::kind::SERIALIZATION) failure
    /// when `value` cannot be encoded.
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> Result<Response, Error> {
        self.json_with(value, Overrides::new())
    }

    pub fn json_with<T: Serialize + ?Sized>(&self, value: &T, overrides: Overrides) -> Result<Response, Error> {
        let body = serde_json::to_string(value)?;
        Ok(self.state.build(body, &overrides, APPLICATION_JSON))
    }

    /// Redirects to `location` with `302 Found`.
    pub fn redirect(&mut self, location: impl Into<String>) -> Response {
        self.redirect_with(location, Overrides::new())
    }

    /// Redirects to `location`; the status defaults to `302` unless overridden.
    ///
    /// The status and `location` header are recorded on the context, so they
    /// also apply to anything built from it afterwards.
    pub fn redirect_with(&mut self, location: impl Into<String>, overrides: Overrides) -> Response {
        let Overrides { status, headers } = overrides;
        self.state.set_status(status.unwrap_or(StatusCode::FOUND));
        self.state.headers_mut().insert("location", location);
        self.state.headers_mut().merge(&headers);
        Response::from_parts(self.state.status(), self.state.headers().clone(), Body::empty())
    }

    /// Stops the handler with `status` and `body`.
    ///
    /// Returns an `Err` so the halt propagates with `?`; code after it never runs.
    ///
    /// ```rust,no_run
    /// use switchyard::{Context, Error, Response};
    ///
    /// async fn guarded(ctx: Context) -> Result<Response, Error> {
    ///     if ctx.request_header("authorization").is_none() {
    ///         ctx.halt(401, "login required")?;
    ///     }
    ///     Ok(ctx.text("welcome"))
    /// }
    /// ```
    pub fn halt(&self, status: impl Into<StatusCode>, body: impl Into<Body>) -> Result<Infallible, Halt> {
        self.halt_with(body, Overrides::new().status(status))
    }

    /// Stops the handler with `body`, the current status unless overridden,
    /// and the accumulated headers merged with the call-site ones.
    pub fn halt_with(&self, body: impl Into<Body>, overrides: Overrides) -> Result<Infallible, Halt> {
        Err(Halt::new(
            self.state.effective_status(&overrides),
            self.state.merged_headers(&overrides),
            body,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(raw: &str, params: &[(&str, &str)]) -> Context {
        let (request, _) = Request::parse(raw.as_bytes()).unwrap();
        let params = params
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Context::new(Arc::new(request), params)
    }

    fn get(path: &str) -> Context {
        context(&format!("GET {path} HTTP/1.1\r\nHost: localhost\r\n\r\n"), &[])
    }

    fn body_text(response: Response) -> String {
        let (_, _, body) = response.into_parts();
        String::from_utf8(body.into_bytes().to_vec()).unwrap()
    }

    #[test]
    fn exposes_params_and_request_metadata() {
        let ctx = context(
            "GET /users/7?tab=posts HTTP/1.1\r\nHost: localhost\r\nX-Test: abc\r\n\r\n",
            &[("id", "7")],
        );
        assert_eq!(ctx.param("id"), Some("7"));
        assert_eq!(ctx.params().len(), 1);
        assert_eq!(ctx.query("tab"), Some("posts"));
        assert_eq!(ctx.request_header("x-test"), Some("abc"));
        assert_eq!(ctx.request().path(), "/users/7");
        assert_eq!(ctx.ip(), None);
    }

    #[test]
    fn ip_comes_from_peer_addr() {
        let (request, _) = Request::parse(b"GET / HTTP/1.1\r\nHost: x\r\n\r\n").unwrap();
        let request = request.with_peer_addr("192.168.1.20:4000".parse().unwrap());
        let ctx = Context::new(Arc::new(request), PathParams::new());
        assert_eq!(ctx.ip(), Some("192.168.1.20".parse().unwrap()));
    }

    #[test]
    fn status_and_headers_apply_to_text() {
        let mut ctx = get("/x");
        assert_eq!(ctx.status(), StatusCode::OK);
        ctx.set_status(201).set_header("X-Foo", "bar");
        assert_eq!(ctx.header("x-foo"), Some("bar"));

        let response = ctx.text("ok");
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers().get("x-foo"), Some("bar"));
        assert_eq!(response.headers().get("content-type"), Some(TEXT_PLAIN));
        assert_eq!(body_text(response), "ok");
    }

    #[test]
    fn call_site_headers_win_over_context_headers() {
        let mut ctx = get("/x");
        ctx.merge_headers([("X-A", "1"), ("X-B", "2")]);
        let response = ctx.html_with("<p>hi</p>", Overrides::new().status(202).header("x-b", "3"));
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(response.headers().get("x-a"), Some("1"));
        assert_eq!(response.headers().get("x-b"), Some("3"));
        assert_eq!(response.headers().get("content-type"), Some(TEXT_HTML));
        assert_eq!(ctx.headers().get("x-b"), Some("2"));
    }

    #[test]
    fn json_serializes_payload() {
        let ctx = get("/y");
        let response = ctx.json(&serde_json::json!({ "ok": true })).unwrap();
        assert_eq!(response.headers().get("content-type"), Some(APPLICATION_JSON));
        assert_eq!(body_text(response), r#"{"ok":true}"#);
    }

    #[test]
    fn json_failure_is_a_serialization_failure() {
        let ctx = get("/y");
        let mut bad = std::collections::HashMap::new();
        bad.insert(vec![1_u8], "non-string key");
        match ctx.json(&bad) {
            Err(Error::Failure(failure)) => {
                assert_eq!(failure.kind(), &crate::error::kind::SERIALIZATION);
            }
            other => panic!("expected serialization failure, got {other:?}"),
        }
    }

    #[test]
    fn redirect_defaults_to_found() {
        let mut ctx = get("/r");
        let response = ctx.redirect("/dest");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get("location"), Some("/dest"));
        assert!(response.body_ref().is_empty());
        assert_eq!(ctx.status(), StatusCode::FOUND);
    }

    #[test]
    fn redirect_with_status_and_headers() {
        let mut ctx = get("/r");
        let response = ctx.redirect_with("/new", Overrides::new().status(301).header("X-Why", "moved"));
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers().get("x-why"), Some("moved"));
        assert_eq!(ctx.header("location"), Some("/new"));
    }

    #[test]
    fn halt_carries_status_headers_and_body() {
        let mut ctx = get("/h");
        ctx.set_header("X-Context", "kept");
        let halt = ctx
            .halt_with("nope", Overrides::new().status(418).header("X-Stop", "1"))
            .unwrap_err();
        assert_eq!(halt.status().as_u16(), 418);
        assert_eq!(halt.headers().get("x-stop"), Some("1"));
        assert_eq!(halt.headers().get("x-context"), Some("kept"));
        assert_eq!(body_text(halt.into_response()), "nope");
    }

    #[test]
    fn halt_without_status_uses_current() {
        let mut ctx = get("/h");
        ctx.set_status(403);
        let halt = ctx.halt_with(Body::empty(), Overrides::new()).unwrap_err();
        assert_eq!(halt.status(), StatusCode::FORBIDDEN);
        assert!(halt.body().is_empty());
    }
}

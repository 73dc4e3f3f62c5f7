//! Normalized responses.
//!
//! Every dispatch outcome converges on [`Response`]: a status, a header map
//! with lower-cased names, and a chunked body. [`IntoResponse`] turns handler
//! return values into that shape, and [`Response::encode`] serializes it to
//! HTTP/1.1 wire format for the transport.

use bytes::{BufMut, BytesMut};

use super::{Body, Headers, StatusCode};

/// Content type applied to plain-text responses.
pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
/// Content type applied by the HTML helper.
pub const TEXT_HTML: &str = "text/html; charset=utf-8";
/// Content type applied by the JSON helper.
pub const APPLICATION_JSON: &str = "application/json; charset=utf-8";

/// A normalized HTTP response.
///
/// # Examples
///
/// ```
/// use switchyard::http::{Response, StatusCode};
///
/// let response = Response::new(StatusCode::OK)
///     .header("Content-Type", "application/json")
///     .body(r#"{"status":"ok"}"#);
///
/// assert_eq!(response.headers().get("content-type"), Some("application/json"));
///
/// let bytes = response.encode(true);
/// let text = std::str::from_utf8(&bytes).unwrap();
/// assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
/// assert!(text.contains("content-length: 15\r\n"));
/// ```
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: Headers,
    body: Body,
    // Set by `into_head`; the emptied body says nothing about the length.
    head: bool,
}

impl Response {
    /// Creates a new response with the given status and an empty body.
    pub fn new(status: impl Into<StatusCode>) -> Self {
        Self {
            status: status.into(),
            headers: Headers::new(),
            body: Body::empty(),
            head: false,
        }
    }

    /// Assembles a response from its three parts.
    pub fn from_parts(status: impl Into<StatusCode>, headers: Headers, body: impl Into<Body>) -> Self {
        Self {
            status: status.into(),
            headers,
            body: body.into(),
            head: false,
        }
    }

    /// A `200` response with a plain-text content type.
    pub fn text(body: impl Into<Body>) -> Self {
        Self::new(StatusCode::OK)
            .header("content-type", TEXT_PLAIN)
            .body(body)
    }

    /// The canned `404 Not Found` response.
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND)
            .header("content-type", TEXT_PLAIN)
            .body("Not Found")
    }

    /// The canned `500 Internal Server Error` response.
    pub fn internal_error() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR)
            .header("content-type", TEXT_PLAIN)
            .body("Internal Server Error")
    }

    /// Sets a response header, replacing any previous value under the same name.
    #[must_use]
    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the response body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the status code of this response.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn body_ref(&self) -> &Body {
        &self.body
    }

    pub fn into_parts(self) -> (StatusCode, Headers, Body) {
        (self.status, self.headers, self.body)
    }

    /// Returns `true` once the response has been adapted for `HEAD`.
    pub fn is_head(&self) -> bool {
        self.head
    }

    /// Adapts this response for a `HEAD` request.
    ///
    /// Status and headers are kept and the body is dropped. A `content-length`
    /// header carrying the byte length of the dropped body is added unless the
    /// handler set one itself; bodies that cannot be measured (streams) get no
    /// length at all.
    #[must_use]
    pub fn into_head(self) -> Self {
        let (status, mut headers, body) = self.into_parts();
        if !headers.contains("content-length") {
            if let Some(len) = body.len() {
                headers.insert("content-length", len.to_string());
            }
        }
        Self {
            head: true,
            ..Self::from_parts(status, headers, Body::empty())
        }
    }

    /// Serializes the response into a `BytesMut` buffer using HTTP/1.1 wire format.
    ///
    /// The body is buffered in full (streams are drained). A `content-length`
    /// header is written from the buffered size unless one is already present
    /// or the response was adapted for `HEAD`; a `HEAD` response carries the
    /// length `into_head` computed, or none when it could not be measured. A
    /// `connection` header is always written last.
    pub fn encode(self, keep_alive: bool) -> BytesMut {
        let head = self.head;
        let (status, mut headers, body) = self.into_parts();
        let body = body.into_bytes();

        if !head && !headers.contains("content-length") {
            headers.insert("content-length", body.len().to_string());
        }
        headers.insert("connection", if keep_alive { "keep-alive" } else { "close" });

        let estimated_size = 128 + headers.len() * 64 + body.len();
        let mut buf = BytesMut::with_capacity(estimated_size);

        // Status line
        buf.put(
            format!(
                "HTTP/1.1 {} {}\r\n",
                status.as_u16(),
                status.canonical_reason().unwrap_or_default()
            )
            .as_bytes(),
        );

        // Headers
        buf.put(headers.to_string().as_bytes());

        // Header/body separator
        buf.put(&b"\r\n"[..]);

        if !body.is_empty() {
            buf.put(body);
        }

        buf
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new(StatusCode::OK)
    }
}

/// Conversion from a handler's return value into a normalized [`Response`].
///
/// | Value                                   | Result                                   |
/// |-----------------------------------------|------------------------------------------|
/// | [`Response`] or `(status, headers, body)` | passed through, header names lower-cased |
/// | `String`, `&'static str`                | `200`, plain text, single chunk          |
/// | numbers, `bool`, `char`, JSON values    | `200`, plain text, stringified           |
/// | `()` or `None`                          | `204`, no headers, empty body            |
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response {
        self
    }
}

impl<S, H, K, V, B> IntoResponse for (S, H, B)
where
    S: Into<StatusCode>,
    H: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
    B: Into<Body>,
{
    fn into_response(self) -> Response {
        let (status, headers, body) = self;
        Response::from_parts(status, headers.into_iter().collect(), body)
    }
}

impl IntoResponse for String {
    fn into_response(self) -> Response {
        Response::text(self)
    }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response {
        Response::text(self)
    }
}

impl IntoResponse for () {
    fn into_response(self) -> Response {
        Response::new(StatusCode::NO_CONTENT)
    }
}

impl<T: IntoResponse> IntoResponse for Option<T> {
    fn into_response(self) -> Response {
        match self {
            Some(value) => value.into_response(),
            None => ().into_response(),
        }
    }
}

macro_rules! printable {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoResponse for $ty {
                fn into_response(self) -> Response {
                    Response::text(self.to_string())
                }
            }
        )*
    };
}

printable!(
    i8, i16, i32, i64, i128, isize,
    u8, u16, u32, u64, u128, usize,
    f32, f64, bool, char,
    serde_json::Value,
);

use thiserror::Error;

use crate::http::{Body, Headers, Response, StatusCode};

/// A deliberate short-circuit carrying the final response.
///
/// Raised through [`Context::halt`](crate::Context::halt) and propagated with
/// `?`. The dispatcher turns it straight into its response; it never reaches
/// the error handlers.
#[derive(Debug, Error)]
#[error("halted with status {status}")]
pub struct Halt {
    status: StatusCode,
    headers: Headers,
    body: Body,
}

impl Halt {
    pub fn new(status: impl Into<StatusCode>, headers: Headers, body: impl Into<Body>) -> Self {
        Self {
            status: status.into(),
            headers,
            body: body.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// The carried response, verbatim.
    pub fn into_response(self) -> Response {
        Response::from_parts(self.status, self.headers, self.body)
    }
}

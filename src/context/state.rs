use crate::http::{Body, Headers, Response, StatusCode};

/// Call-site adjustments for the response helpers on [`Context`](super::Context).
///
/// An explicit status replaces the context's current status; headers given
/// here win over headers accumulated on the context.
///
/// # Examples
///
/// ```
/// use switchyard::context::Overrides;
///
/// let extra = Overrides::new().status(201).header("X-Trace", "t1");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub(crate) status: Option<StatusCode>,
    pub(crate) headers: Headers,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn status(mut self, status: impl Into<StatusCode>) -> Self {
        self.status = Some(status.into());
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }
}

// Status and headers accumulated while a handler runs.
#[derive(Debug)]
pub(crate) struct ResponseState {
    status: StatusCode,
    headers: Headers,
}

impl Default for ResponseState {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: Headers::new(),
        }
    }
}

impl ResponseState {
    pub(crate) fn status(&self) -> StatusCode {
        self.status
    }

    pub(crate) fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub(crate) fn headers(&self) -> &Headers {
        &self.headers
    }

    pub(crate) fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Status to use: the override if given, otherwise the current one.
    pub(crate) fn effective_status(&self, overrides: &Overrides) -> StatusCode {
        overrides.status.unwrap_or(self.status)
    }

    /// Accumulated headers with call-site headers layered on top.
    pub(crate) fn merged_headers(&self, overrides: &Overrides) -> Headers {
        let mut headers = self.headers.clone();
        headers.merge(&overrides.headers);
        headers
    }

    /// Default content type < accumulated headers < call-site headers.
    pub(crate) fn build(&self, body: impl Into<Body>, overrides: &Overrides, content_type: &str) -> Response {
        let mut headers = Headers::new();
        headers.insert("content-type", content_type);
        headers.merge(&self.merged_headers(overrides));
        Response::from_parts(self.effective_status(overrides), headers, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::response::{TEXT_HTML, TEXT_PLAIN};

    #[test]
    fn build_layers_headers_in_order() {
        let mut state = ResponseState::default();
        state.headers_mut().insert("Content-Type", "text/markdown");
        state.headers_mut().insert("X-A", "context");
        state.headers_mut().insert("X-B", "context");

        let overrides = Overrides::new().header("x-b", "call-site");
        let response = state.build("body", &overrides, TEXT_PLAIN);

        assert_eq!(response.headers().get("content-type"), Some("text/markdown"));
        assert_eq!(response.headers().get("x-a"), Some("context"));
        assert_eq!(response.headers().get("x-b"), Some("call-site"));
    }

    #[test]
    fn build_uses_current_status_unless_overridden() {
        let mut state = ResponseState::default();
        state.set_status(StatusCode::ACCEPTED);

        let plain = state.build("", &Overrides::new(), TEXT_HTML);
        assert_eq!(plain.status(), StatusCode::ACCEPTED);
        assert_eq!(plain.headers().get("content-type"), Some(TEXT_HTML));

        let overridden = state.build("", &Overrides::new().status(201), TEXT_HTML);
        assert_eq!(overridden.status(), StatusCode::CREATED);
        assert_eq!(state.status(), StatusCode::ACCEPTED);
    }
}

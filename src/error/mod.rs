//! Error types for setup and for request handling.
//!
//! Two families live here:
//!
//! - [`ConfigError`]: raised while routes are being registered. These abort
//!   application startup and never occur at request time.
//! - [`Error`]: what a handler returns when it does not produce a response:
//!   either a [`Halt`] (an intentional short-circuit carrying a response) or a
//!   [`Failure`] (a classified error resolved through the error handlers).

use std::fmt;

use thiserror::Error;

pub mod halt;
pub mod kind;

pub use halt::Halt;
pub use kind::ErrorKind;

/// Boxed error used as the cause of a [`Failure`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors detected while registering routes.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("route path must start with '/': {path:?}")]
    RelativePath { path: String },

    #[error("route path {path:?} does not compile: {source}")]
    Pattern {
        path: String,
        #[source]
        source: regex::Error,
    },
}

/// The non-response outcome of a handler.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Halt(#[from] Halt),

    #[error(transparent)]
    Failure(#[from] Failure),
}

/// A handler failure tagged with the [`ErrorKind`] used to pick its handler.
///
/// # Examples
///
/// ```
/// use switchyard::error::{Failure, kind};
///
/// let failure = Failure::msg(&kind::ARGUMENT, "id must be numeric");
/// assert_eq!(failure.kind(), &kind::ARGUMENT);
/// assert_eq!(failure.message(), "id must be numeric");
///
/// let parsed: Result<u32, Failure> = "x".parse::<u32>().map_err(Failure::from);
/// assert_eq!(parsed.unwrap_err().kind(), &kind::ARGUMENT);
/// ```
#[derive(Debug, Error)]
#[error("{kind} failure: {source}")]
pub struct Failure {
    kind: &'static ErrorKind,
    #[source]
    source: BoxError,
}

impl Failure {
    /// Wraps `source` under `kind`.
    pub fn new(kind: &'static ErrorKind, source: impl Into<BoxError>) -> Self {
        Self {
            kind,
            source: source.into(),
        }
    }

    /// A failure with a plain message as its cause.
    pub fn msg(kind: &'static ErrorKind, message: impl fmt::Display) -> Self {
        Self::new(kind, Message(message.to_string()))
    }

    pub fn kind(&self) -> &'static ErrorKind {
        self.kind
    }

    /// The cause's message, without the kind prefix.
    pub fn message(&self) -> String {
        self.source.to_string()
    }

    /// The underlying cause.
    pub fn cause(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.source.as_ref()
    }
}

#[derive(Debug, Error)]
#[error("{0}")]
struct Message(String);

// Standard errors handlers commonly hit with `?`, classified once here.
macro_rules! classify {
    ($($source:ty => $kind:path),* $(,)?) => {
        $(
            impl From<$source> for Failure {
                fn from(err: $source) -> Self {
                    Failure::new(&$kind, err)
                }
            }

            impl From<$source> for Error {
                fn from(err: $source) -> Self {
                    Error::Failure(Failure::from(err))
                }
            }
        )*
    };
}

classify! {
    std::io::Error => kind::IO,
    serde_json::Error => kind::SERIALIZATION,
    std::num::ParseIntError => kind::ARGUMENT,
    std::num::ParseFloatError => kind::ARGUMENT,
    std::str::Utf8Error => kind::ARGUMENT,
    std::string::FromUtf8Error => kind::ARGUMENT,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_classify_as_io() {
        let err: Error = std::io::Error::other("disk gone").into();
        match err {
            Error::Failure(failure) => {
                assert_eq!(failure.kind(), &kind::IO);
                assert_eq!(failure.message(), "disk gone");
                assert_eq!(failure.to_string(), "io failure: disk gone");
            }
            other => panic!("expected Failure, got {other:?}"),
        }
    }

    #[test]
    fn json_errors_classify_as_serialization() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(Failure::from(err).kind(), &kind::SERIALIZATION);
    }

    #[test]
    fn halt_converts_into_error() {
        let halt = Halt::new(418, crate::http::Headers::new(), "nope");
        assert!(matches!(Error::from(halt), Error::Halt(h) if h.status().as_u16() == 418));
    }

    #[test]
    fn config_error_messages_name_the_path() {
        let err = ConfigError::RelativePath {
            path: "users".to_owned(),
        };
        assert_eq!(err.to_string(), "route path must start with '/': \"users\"");
    }
}

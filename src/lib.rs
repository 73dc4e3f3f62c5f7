//! # switchyard
//!
//! Request routing and dispatch for async HTTP/1.1 services.
//!
//! Routes are registered once at startup against an [`App`], compiled into
//! anchored path matchers, and looked up per request in registration order.
//! Handlers receive a [`Context`], return anything convertible into a
//! [`Response`], and may stop early with a halt or fail with a classified
//! [`Failure`] that is resolved through the error handler registered for the
//! closest failure kind.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use switchyard::error::kind;
//! use switchyard::{App, Context, Routes, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut app = App::new();
//!     app.get("/", || async { "Hello, World!" })?
//!         .get("/hello/:name", |ctx: Context| async move {
//!             ctx.text(format!("Hello, {}!", ctx.param("name").unwrap_or("you")))
//!         })?;
//!     app.error(&kind::ANY, || async { "something went wrong" });
//!
//!     Server::bind("127.0.0.1:8080").await?.serve(app).await?;
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod context;
pub mod error;
pub mod handler;
pub mod http;
pub mod router;
pub mod server;

// ── Convenience re-exports ────────────────────────────────────────────────────
pub use app::{App, Group, Routes};
pub use context::{Context, Overrides};
pub use error::{ConfigError, Error, ErrorKind, Failure, Halt};
pub use handler::{Endpoint, Factory};
pub use http::{Body, Headers, IntoResponse, Method, Request, Response, StatusCode};
pub use server::{Server, ServerConfig, ServerError};

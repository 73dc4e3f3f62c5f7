//! A small switchyard service.
//!
//! ```text
//! RUST_LOG=switchyard=debug PORT=8080 cargo run --example hello
//! ```

use serde_json::json;
use switchyard::error::{ErrorKind, Failure, kind};
use switchyard::{App, Context, Error, Overrides, Routes, Server, ServerConfig};
use tracing_subscriber::EnvFilter;

static NOT_ALLOWED: ErrorKind = ErrorKind::new("not_allowed", &kind::ARGUMENT);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut app = App::new();
    app.get("/", || async { "switchyard up" })?
        .get("/hello/:name", |ctx: Context| async move {
            ctx.text(format!("Hello, {}!", ctx.param("name").unwrap_or("stranger")))
        })?
        .get("/files/*", |ctx: Context| async move {
            ctx.json(&json!({ "file": ctx.param("splat") }))
        })?
        .get("/old", |mut ctx: Context| async move { ctx.redirect("/") })?;

    {
        let mut api = app.group("/api");
        api.get("/ping", || async { "pong" })?;
        api.post("/square/:n", |ctx: Context| async move {
            let n: i64 = ctx.param("n").unwrap_or_default().parse()?;
            if n.abs() > 1_000_000 {
                return Err(Error::from(Failure::msg(&NOT_ALLOWED, "too large")));
            }
            Ok::<_, Error>(ctx.json(&json!({ "square": n * n }))?)
        })?;
    }

    app.get("/admin", |ctx: Context| async move {
        if ctx.request_header("authorization").is_none() {
            ctx.halt_with("login required", Overrides::new().status(401).header("WWW-Authenticate", "Basic"))?;
        }
        Ok::<_, Error>(ctx.text("welcome"))
    })?;

    app.error(&kind::ARGUMENT, |failure: Failure, ctx: Context| async move {
        ctx.text_with(format!("bad request: {}", failure.message()), Overrides::new().status(400))
    })
    .error(&NOT_ALLOWED, |ctx: Context| async move {
        ctx.text_with("not allowed", Overrides::new().status(422))
    })
    .not_found(|ctx: Context| async move {
        ctx.text_with(format!("no route for {}", ctx.request().path()), Overrides::new().status(404))
    });

    let config = ServerConfig::from_env()?;
    Server::bind(config.addr()).await?.serve(app).await?;
    Ok(())
}

use crate::error::ConfigError;
use crate::handler::{Handler, IntoHandler};
use crate::http::Method;
use crate::router::Router;

/// Route registration shared by [`App`](super::App) and [`Group`].
///
/// Implementors only provide [`add_route`](Routes::add_route); the per-verb
/// helpers classify the handler and forward to it. Every helper returns
/// `Result<&mut Self, ConfigError>`, so setup code chains with `?` and stops
/// at the first bad template.
pub trait Routes {
    /// Stores an already classified handler under `method` and `path`.
    fn add_route(&mut self, method: Method, path: &str, handler: Handler) -> Result<(), ConfigError>;

    fn route<M>(&mut self, method: Method, path: &str, handler: impl IntoHandler<M>) -> Result<&mut Self, ConfigError>
    where
        Self: Sized,
    {
        self.add_route(method, path, handler.into_handler())?;
        Ok(self)
    }

    fn get<M>(&mut self, path: &str, handler: impl IntoHandler<M>) -> Result<&mut Self, ConfigError>
    where
        Self: Sized,
    {
        self.route(Method::Get, path, handler)
    }

    fn post<M>(&mut self, path: &str, handler: impl IntoHandler<M>) -> Result<&mut Self, ConfigError>
    where
        Self: Sized,
    {
        self.route(Method::Post, path, handler)
    }

    fn put<M>(&mut self, path: &str, handler: impl IntoHandler<M>) -> Result<&mut Self, ConfigError>
    where
        Self: Sized,
    {
        self.route(Method::Put, path, handler)
    }

    fn patch<M>(&mut self, path: &str, handler: impl IntoHandler<M>) -> Result<&mut Self, ConfigError>
    where
        Self: Sized,
    {
        self.route(Method::Patch, path, handler)
    }

    fn delete<M>(&mut self, path: &str, handler: impl IntoHandler<M>) -> Result<&mut Self, ConfigError>
    where
        Self: Sized,
    {
        self.route(Method::Delete, path, handler)
    }

    fn options<M>(&mut self, path: &str, handler: impl IntoHandler<M>) -> Result<&mut Self, ConfigError>
    where
        Self: Sized,
    {
        self.route(Method::Options, path, handler)
    }

    /// Same table as [`get`](Routes::get).
    fn head<M>(&mut self, path: &str, handler: impl IntoHandler<M>) -> Result<&mut Self, ConfigError>
    where
        Self: Sized,
    {
        self.route(Method::Head, path, handler)
    }

    fn trace<M>(&mut self, path: &str, handler: impl IntoHandler<M>) -> Result<&mut Self, ConfigError>
    where
        Self: Sized,
    {
        self.route(Method::Trace, path, handler)
    }

    /// Registers `handler` for every routable method.
    fn any<M>(&mut self, path: &str, handler: impl IntoHandler<M>) -> Result<&mut Self, ConfigError>
    where
        Self: Sized,
    {
        let handler = handler.into_handler();
        for method in Method::ROUTABLE {
            self.add_route(method, path, handler.clone())?;
        }
        Ok(self)
    }
}

/// A registrar that prefixes every path it is given.
///
/// Created by [`App::group`](super::App::group) or [`Group::group`]; the
/// prefix is applied at registration time only.
///
/// # Examples
///
/// ```rust,no_run
/// use switchyard::{App, Routes};
///
/// # fn setup() -> Result<(), switchyard::ConfigError> {
/// let mut app = App::new();
/// let mut api = app.group("/api");
/// api.get("/ping", || async { "pong" })?;
/// api.group("v1").get("/", || async { "v1 root" })?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Group<'a> {
    router: &'a mut Router<Handler>,
    prefix: String,
}

impl<'a> Group<'a> {
    pub(crate) fn new(router: &'a mut Router<Handler>, prefix: &str) -> Self {
        Self {
            router,
            prefix: normalize_prefix(prefix),
        }
    }

    /// The normalized prefix, always starting with `/`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// A nested group whose prefix is appended to this one.
    pub fn group(&mut self, prefix: &str) -> Group<'_> {
        let prefix = join(&self.prefix, prefix);
        Group::new(&mut *self.router, &prefix)
    }
}

impl Routes for Group<'_> {
    fn add_route(&mut self, method: Method, path: &str, handler: Handler) -> Result<(), ConfigError> {
        self.router.add(method, &join(&self.prefix, path), handler)?;
        Ok(())
    }
}

fn normalize_prefix(prefix: &str) -> String {
    if prefix.is_empty() {
        "/".to_owned()
    } else if prefix.starts_with('/') {
        prefix.to_owned()
    } else {
        format!("/{prefix}")
    }
}

fn join(prefix: &str, path: &str) -> String {
    if path.is_empty() || path == "/" {
        return prefix.to_owned();
    }
    let base = prefix.strip_suffix('/').unwrap_or(prefix);
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_normalization() {
        assert_eq!(normalize_prefix(""), "/");
        assert_eq!(normalize_prefix("api"), "/api");
        assert_eq!(normalize_prefix("/api"), "/api");
    }

    #[test]
    fn join_inserts_exactly_one_slash() {
        assert_eq!(join("/api", "/ping"), "/api/ping");
        assert_eq!(join("/api/", "/ping"), "/api/ping");
        assert_eq!(join("/api", "ping"), "/api/ping");
        assert_eq!(join("/", "/ping"), "/ping");
    }

    #[test]
    fn join_with_root_path_keeps_prefix() {
        assert_eq!(join("/api", ""), "/api");
        assert_eq!(join("/api", "/"), "/api");
    }

    #[test]
    fn groups_register_prefixed_paths() {
        let mut router = Router::new();
        {
            let mut api = Group::new(&mut router, "api");
            assert_eq!(api.prefix(), "/api");
            api.get("/ping", || async { "pong" }).unwrap();
            api.group("v1").post("users", || async {}).unwrap();
        }
        assert!(router.lookup(&Method::Get, "/api/ping").is_some());
        assert!(router.lookup(&Method::Get, "/ping").is_none());
        assert!(router.lookup(&Method::Post, "/api/v1/users").is_some());
    }

    #[test]
    fn any_covers_routable_methods() {
        let mut router = Router::new();
        Group::new(&mut router, "/").any("/all", || async { "any" }).unwrap();
        assert_eq!(router.len(), Method::ROUTABLE.len());
        for method in Method::ROUTABLE {
            assert!(router.lookup(&method, "/all").is_some());
        }
        assert!(router.lookup(&Method::Head, "/all").is_some());
    }

    #[test]
    fn nested_empty_prefix_is_the_parent() {
        let mut router = Router::new();
        let mut api = Group::new(&mut router, "/api/");
        let nested = api.group("");
        assert_eq!(nested.prefix(), "/api/");
    }
}

//! Request routing: map HTTP methods and URL patterns to handlers.
//!
//! This module provides [`Router`], a per-method table of compiled routes.
//! Three segment styles are supported (see [`pattern`] for the full grammar):
//!
//! | Pattern              | Example match              | Captured params                 |
//! |----------------------|----------------------------|---------------------------------|
//! | `/users`             | `/users`                   | *(none)*                        |
//! | `/users/:id`         | `/users/42`                | `id → "42"`                     |
//! | `/files/*`           | `/files/docs/readme.txt`   | `splat → "docs/readme.txt"`     |
//!
//! A trailing slash on the request path is always tolerated.
//!
//! Routes are matched in registration order; the first route registered for
//! the request's method whose pattern accepts the path wins. `HEAD` requests
//! are looked up in the `GET` table.

use std::collections::HashMap;

use crate::error::ConfigError;
use crate::http::Method;

pub mod pattern;

pub use pattern::{PathParams, PathPattern};

/// A registered route: method, compiled pattern, and handler.
#[derive(Debug)]
pub struct Route<H> {
    method: Method,
    pattern: PathPattern,
    handler: H,
}

impl<H> Route<H> {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }
}

/// A successful lookup: the route that won and the parameters it captured.
#[derive(Debug)]
pub struct Match<'r, H> {
    pub route: &'r Route<H>,
    pub params: PathParams,
}

/// Per-method route table with first-match lookup.
///
/// The router is generic over what it stores as a handler, so it can be
/// exercised without any request machinery.
///
/// # Examples
///
/// ```
/// use switchyard::http::Method;
/// use switchyard::router::Router;
///
/// let mut router = Router::new();
/// router.add(Method::Get, "/users/:id", "show user").unwrap();
/// router.add(Method::Get, "/users/me", "never reached").unwrap();
///
/// let found = router.lookup(&Method::Head, "/users/me").unwrap();
/// assert_eq!(*found.route.handler(), "show user");
/// assert_eq!(found.params["id"], "me");
/// ```
#[derive(Debug)]
pub struct Router<H> {
    routes: HashMap<Method, Vec<Route<H>>>,
}

impl<H> Default for Router<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> Router<H> {
    /// Create a new, empty `Router` with no registered routes.
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Compile `path` and append a route for `method`.
    ///
    /// Registering under `HEAD` is the same as registering under `GET`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when `path` is not a valid template.
    pub fn add(&mut self, method: Method, path: &str, handler: H) -> Result<&mut Self, ConfigError> {
        let method = method.routing_key();
        let pattern = PathPattern::compile(path)?;

        tracing::debug!(%method, path, "route registered");
        self.routes.entry(method.clone()).or_default().push(Route {
            method,
            pattern,
            handler,
        });
        Ok(self)
    }

    /// Find the first route registered for `method` whose pattern accepts `path`.
    pub fn lookup(&self, method: &Method, path: &str) -> Option<Match<'_, H>> {
        self.routes
            .get(&method.routing_key())?
            .iter()
            .find_map(|route| {
                route
                    .pattern
                    .matches(path)
                    .map(|params| Match { route, params })
            })
    }

    /// Return the number of routes registered in this router.
    pub fn len(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    /// Return `true` if no routes have been registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router(routes: &[(Method, &str, u32)]) -> Router<u32> {
        let mut router = Router::new();
        for (method, path, id) in routes {
            router.add(method.clone(), path, *id).unwrap();
        }
        router
    }

    fn winner(router: &Router<u32>, method: Method, path: &str) -> Option<u32> {
        router
            .lookup(&method, path)
            .map(|found| *found.route.handler())
    }

    #[test]
    fn router_starts_empty() {
        let router = Router::<u32>::new();
        assert!(router.is_empty());
        assert_eq!(router.len(), 0);
        assert!(Router::<u32>::default().is_empty());
    }

    #[test]
    fn router_len_counts_every_method() {
        let router = router(&[(Method::Get, "/a", 1), (Method::Post, "/b", 2)]);
        assert_eq!(router.len(), 2);
        assert!(!router.is_empty());
    }

    #[test]
    fn add_rejects_relative_path() {
        let mut router = Router::new();
        assert!(matches!(
            router.add(Method::Get, "nope", 1),
            Err(ConfigError::RelativePath { .. })
        ));
        assert!(router.is_empty());
    }

    #[test]
    fn lookup_extracts_params() {
        let router = router(&[(Method::Get, "/hello/:name", 1)]);
        let found = router.lookup(&Method::Get, "/hello/Ada").unwrap();
        assert_eq!(found.params["name"], "Ada");
        assert_eq!(found.route.pattern().as_str(), "/hello/:name");
        assert_eq!(found.route.method(), &Method::Get);
    }

    #[test]
    fn get_does_not_match_post() {
        let router = router(&[(Method::Get, "/hello", 1)]);
        assert_eq!(winner(&router, Method::Post, "/hello"), None);
        assert_eq!(winner(&router, Method::Get, "/world"), None);
    }

    #[test]
    fn first_matching_route_wins() {
        let router = router(&[
            (Method::Get, "/path", 1),
            (Method::Get, "/path", 2),
            (Method::Get, "/:anything", 3),
        ]);
        assert_eq!(winner(&router, Method::Get, "/path"), Some(1));
        assert_eq!(winner(&router, Method::Get, "/other"), Some(3));
    }

    #[test]
    fn earlier_broad_pattern_shadows_later_literal() {
        let router = router(&[(Method::Get, "/users/:id", 1), (Method::Get, "/users/new", 2)]);
        assert_eq!(winner(&router, Method::Get, "/users/new"), Some(1));
    }

    #[test]
    fn head_is_served_by_get_routes() {
        let router = router(&[(Method::Get, "/users/:id", 1)]);
        let get = router.lookup(&Method::Get, "/users/9").unwrap();
        let head = router.lookup(&Method::Head, "/users/9").unwrap();
        assert_eq!(get.params, head.params);
        assert_eq!(*head.route.handler(), 1);
    }

    #[test]
    fn head_registration_lands_in_get_table() {
        let router = router(&[(Method::Head, "/ping", 7)]);
        assert_eq!(winner(&router, Method::Get, "/ping"), Some(7));
    }

    #[test]
    fn custom_methods_route_independently() {
        let router = router(&[(Method::Custom("PURGE".into()), "/cache", 5)]);
        assert_eq!(winner(&router, "purge".parse().unwrap(), "/cache"), Some(5));
        assert_eq!(winner(&router, Method::Get, "/cache"), None);
    }
}

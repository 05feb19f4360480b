//! Route registration and lookup.
//!
//! # Responsibilities
//! - Collect registrations through [`RouterBuilder`]
//! - Freeze them into an immutable [`Router`]
//! - Look up the handler for a method, path and optional version
//!
//! # Design Decisions
//! - Registration and serving are separate types: a `Router` has no
//!   mutating methods and is shared via `Arc` across request tasks
//! - Registration errors are returned synchronously and leave the builder unchanged
//! - `Router<H>` is generic over the handler, so the engine has no opinion
//!   about what a handler is or how it is invoked

use std::fmt;
use std::sync::Arc;

use crate::error::RouteError;
use crate::routing::expressions::NamedExpressions;
use crate::routing::matcher::{self, Lookup};
use crate::routing::method::{IntoMethods, Method};
use crate::routing::pattern;
use crate::routing::table::{Route, RouteTable};
use crate::routing::version::{VersionResolver, XRangeResolver};

/// Construction-time switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterOptions {
    /// Register `/a/` next to `/a` for exact routes, accept an optional
    /// trailing slash on pattern routes.
    pub ignore_trailing_slash: bool,
    /// Prefix patterns that lack a leading `/`.
    pub ignore_leading_slash: bool,
    /// Accepted but not consulted anywhere.
    pub overwrite_allow: bool,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            ignore_trailing_slash: false,
            ignore_leading_slash: true,
            overwrite_allow: false,
        }
    }
}

/// Per-registration options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteOptions {
    pub version: Option<String>,
}

impl RouteOptions {
    pub fn version(version: impl Into<String>) -> Self {
        Self {
            version: Some(version.into()),
        }
    }
}

/// Registration phase of a router.
pub struct RouterBuilder<H> {
    options: RouterOptions,
    expressions: NamedExpressions,
    table: RouteTable<H>,
    default_route: Option<H>,
    resolver: Arc<dyn VersionResolver>,
}

macro_rules! verb_shorthands {
    ($($(#[$doc:meta])* $name:ident => $method:expr;)*) => {
        $(
            $(#[$doc])*
            pub fn $name(&mut self, pattern: &str, handler: H) -> Result<&mut Self, RouteError> {
                self.on($method, pattern, handler)
            }
        )*
    };
}

impl<H: Clone> RouterBuilder<H> {
    pub fn new() -> Self {
        Self::with_options(RouterOptions::default())
    }

    pub fn with_options(options: RouterOptions) -> Self {
        Self {
            options,
            expressions: NamedExpressions::new(),
            table: RouteTable::new(),
            default_route: None,
            resolver: Arc::new(XRangeResolver),
        }
    }

    /// Handler used when no route resolves.
    pub fn default_route(mut self, handler: H) -> Self {
        self.default_route = Some(handler);
        self
    }

    /// Replace the version range resolver.
    pub fn resolver(mut self, resolver: impl VersionResolver + 'static) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    /// Register a `:name:` macro for patterns registered afterwards.
    pub fn add_named_expression(
        &mut self,
        name: impl Into<String>,
        fragment: impl Into<String>,
    ) -> &mut Self {
        self.expressions.register(name, fragment);
        self
    }

    /// Register an unversioned handler for one or more methods.
    pub fn on(
        &mut self,
        methods: impl IntoMethods,
        pattern: &str,
        handler: H,
    ) -> Result<&mut Self, RouteError> {
        self.on_with(methods, pattern, RouteOptions::default(), handler)
    }

    /// Register a handler with per-route options.
    pub fn on_with(
        &mut self,
        methods: impl IntoMethods,
        pattern: &str,
        options: RouteOptions,
        handler: H,
    ) -> Result<&mut Self, RouteError> {
        let methods = methods.into_methods()?;
        if options.version.as_deref().is_some_and(|v| v.trim().is_empty()) {
            return Err(RouteError::EmptyVersion(pattern.to_string()));
        }
        let compiled = pattern::compile(pattern, &self.options, &self.expressions)?;
        let version = options.version.as_deref();

        self.table.register(
            &methods,
            &compiled,
            version,
            &handler,
            self.options.ignore_trailing_slash,
        )?;

        for method in &methods {
            for route in &compiled {
                tracing::debug!(
                    method = %method,
                    route = %route.source,
                    form = route.form.as_str(),
                    kind = if route.is_exact() { "exact" } else { "pattern" },
                    version = ?version,
                    "Route registered"
                );
            }
        }
        Ok(self)
    }

    verb_shorthands! {
        get => Method::Get;
        head => Method::Head;
        put => Method::Put;
        post => Method::Post;
        delete => Method::Delete;
        /// Registers for the `OPTIONS` method.
        options => Method::Options;
        patch => Method::Patch;
        trace => Method::Trace;
        connect => Method::Connect;
        copy => Method::Copy;
        link => Method::Link;
        unlink => Method::Unlink;
        purge => Method::Purge;
        lock => Method::Lock;
        unlock => Method::Unlock;
        propfind => Method::Propfind;
        view => Method::View;
    }

    /// Freeze the table.
    pub fn build(self) -> Router<H> {
        if self.options.overwrite_allow {
            tracing::warn!("overwrite_allow is set but has no effect on registration");
        }
        tracing::info!(
            routes = self.table.len(),
            default_route = self.default_route.is_some(),
            "Route table built"
        );
        Router {
            options: self.options,
            table: self.table,
            default_route: self.default_route,
            resolver: self.resolver,
        }
    }
}

impl<H: Clone> Default for RouterBuilder<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> fmt::Debug for RouterBuilder<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterBuilder")
            .field("options", &self.options)
            .field("expressions", &self.expressions.len())
            .field("routes", &self.table.len())
            .field("has_default", &self.default_route.is_some())
            .field("resolver", &self.resolver)
            .finish()
    }
}

/// Immutable route table with its fallback and version resolver.
pub struct Router<H> {
    options: RouterOptions,
    table: RouteTable<H>,
    default_route: Option<H>,
    resolver: Arc<dyn VersionResolver>,
}

impl<H: Clone> Router<H> {
    pub fn builder() -> RouterBuilder<H> {
        RouterBuilder::new()
    }
}

impl<H> Router<H> {
    /// Resolve a request to a handler and a fresh parameter map.
    pub fn lookup(&self, method: Method, url: &str, version: Option<&str>) -> Lookup<'_, H> {
        matcher::lookup(
            &self.table,
            self.default_route.as_ref(),
            self.resolver.as_ref(),
            method,
            url,
            version,
        )
    }

    /// Handler-only variant of [`lookup`](Self::lookup).
    pub fn find(&self, method: Method, url: &str, version: Option<&str>) -> Option<&H> {
        self.lookup(method, url, version).handler
    }

    pub fn routes(&self) -> impl Iterator<Item = &Route<H>> {
        self.table.iter()
    }

    /// Routes registered, not counting trailing-slash siblings.
    pub fn route_count(&self) -> usize {
        self.table.len()
    }

    pub fn has_default(&self) -> bool {
        self.default_route.is_some()
    }

    pub fn options(&self) -> &RouterOptions {
        &self.options
    }
}

impl<H> fmt::Debug for Router<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("options", &self.options)
            .field("routes", &self.table.len())
            .field("has_default", &self.default_route.is_some())
            .field("resolver", &self.resolver)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::matcher::MatchSource;

    #[test]
    fn test_builder_chaining() {
        let mut builder = RouterBuilder::new();
        builder
            .get("/", "home")
            .unwrap()
            .post("/users", "create")
            .unwrap()
            .on(["PUT", "PATCH"], "/users/:id", "update")
            .unwrap();
        let router = builder.build();

        assert_eq!(router.find(Method::Get, "/", None), Some(&"home"));
        assert_eq!(router.find(Method::Post, "/users", None), Some(&"create"));
        assert_eq!(router.find(Method::Patch, "/users/1", None), Some(&"update"));
        assert_eq!(router.find(Method::Put, "/users/1", None), Some(&"update"));
        assert_eq!(router.find(Method::Get, "/users/1", None), None);
        assert_eq!(router.route_count(), 4);
    }

    #[test]
    fn test_unknown_method_rejected() {
        let mut builder: RouterBuilder<&str> = RouterBuilder::new();
        let err = builder.on("FETCH", "/a", "a").err().unwrap();
        assert_eq!(err, RouteError::UnknownMethod("FETCH".into()));
    }

    #[test]
    fn test_named_expression_in_builder() {
        let mut builder = RouterBuilder::new();
        builder.add_named_expression("num", r"\d+");
        builder.get("/age/:age-(:num:)", "age").unwrap();
        let router = builder.build();

        let found = router.lookup(Method::Get, "/age/30", None);
        assert_eq!(found.param("age"), Some("30"));
        assert_eq!(router.find(Method::Get, "/age/thirty", None), None);
    }

    #[test]
    fn test_custom_resolver() {
        #[derive(Debug)]
        struct Latest;
        impl VersionResolver for Latest {
            fn resolve<'k>(&self, _requested: &str, available: &[&'k str]) -> Option<&'k str> {
                available.iter().copied().max()
            }
        }

        let mut builder = RouterBuilder::new().resolver(Latest);
        builder
            .on_with("GET", "/a", RouteOptions::version("1.0.0"), "v1")
            .unwrap()
            .on_with("GET", "/a", RouteOptions::version("2.0.0"), "v2")
            .unwrap();
        let router = builder.build();
        assert_eq!(router.find(Method::Get, "/a", Some("anything")), Some(&"v2"));
    }

    #[test]
    fn test_default_route() {
        let router = RouterBuilder::new().default_route("fallback").build();
        let found = router.lookup(Method::Get, "/missing", None);
        assert_eq!(found.handler, Some(&"fallback"));
        assert_eq!(found.source, MatchSource::Fallback);
        assert!(router.has_default());
    }

    #[test]
    fn test_empty_version_rejected() {
        let mut builder = RouterBuilder::new();
        for version in ["", "  "] {
            let err = builder
                .on_with("GET", "/a", RouteOptions::version(version), "empty")
                .unwrap_err();
            assert_eq!(err, RouteError::EmptyVersion("/a".into()));
        }
        builder.get("/a", "base").unwrap();
        let router = builder.build();
        assert_eq!(router.find(Method::Get, "/a", None), Some(&"base"));
        assert_eq!(router.route_count(), 1);
    }

    #[test]
    fn test_builder_debug() {
        let mut builder = RouterBuilder::new();
        builder.get("/a", "a").unwrap();
        let debug = format!("{builder:?}");
        assert!(debug.starts_with("RouterBuilder"));
        assert!(debug.contains("routes: 1"));
    }

    #[test]
    fn test_overwrite_allow_has_no_effect() {
        let options = RouterOptions {
            overwrite_allow: true,
            ..RouterOptions::default()
        };
        let mut builder = RouterBuilder::with_options(options);
        builder.get("/a", "first").unwrap();
        assert!(builder.get("/a", "second").is_err());
        assert!(builder.build().options().overwrite_allow);
    }
}

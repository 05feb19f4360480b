//! Per-method route storage.
//!
//! # Responsibilities
//! - Store exact routes by literal path and pattern routes in registration order
//! - Detect equivalent shapes at registration and merge versions into them
//! - Keep trailing-slash siblings of exact routes in sync
//!
//! # Design Decisions
//! - One slot per method of the fixed set, indexed by [`Method::index`]
//! - A registration call is staged on copies of the affected slots and only
//!   committed when every concrete route was accepted
//! - Exact routes are only compared with exact routes, patterns with patterns

use std::collections::HashMap;

use crate::error::RouteError;
use crate::routing::method::Method;
use crate::routing::pattern::{Bindings, CompiledRoute, Matchable, Shape};
use crate::routing::version::{AttachConflict, RouteHandlers};

/// A compiled route together with its handlers.
#[derive(Debug, Clone)]
pub struct Route<H> {
    method: Method,
    source: String,
    shape: Shape,
    form: Matchable,
    fixed: Bindings,
    handlers: RouteHandlers<H>,
    sibling: bool,
}

impl<H> Route<H> {
    fn new(method: Method, compiled: &CompiledRoute, handlers: RouteHandlers<H>) -> Self {
        Self {
            method,
            source: compiled.source.clone(),
            shape: compiled.shape.clone(),
            form: compiled.form.clone(),
            fixed: compiled.fixed.clone(),
            handlers,
            sibling: false,
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Concrete pattern this route was registered from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn form(&self) -> &Matchable {
        &self.form
    }

    pub fn is_exact(&self) -> bool {
        matches!(self.form, Matchable::Exact(_))
    }

    /// Parameter values fixed by enum expansion.
    pub fn fixed(&self) -> &Bindings {
        &self.fixed
    }

    pub fn handlers(&self) -> &RouteHandlers<H> {
        &self.handlers
    }

    /// Trailing-slash twin stored next to a registered exact path.
    pub fn is_sibling(&self) -> bool {
        self.sibling
    }
}

#[derive(Debug, Clone)]
struct MethodRoutes<H> {
    exact: HashMap<String, Route<H>>,
    patterns: Vec<Route<H>>,
}

impl<H> Default for MethodRoutes<H> {
    fn default() -> Self {
        Self {
            exact: HashMap::new(),
            patterns: Vec::new(),
        }
    }
}

fn conflict_error(
    conflict: AttachConflict,
    method: Method,
    source: &str,
    existing: &str,
    version: Option<&str>,
) -> RouteError {
    match (conflict, version) {
        (AttachConflict::Version, Some(version)) => RouteError::DuplicateVersion {
            method: method.to_string(),
            pattern: source.to_string(),
            version: version.to_string(),
        },
        _ => RouteError::DuplicateRoute {
            method: method.to_string(),
            pattern: source.to_string(),
            existing: existing.to_string(),
        },
    }
}

/// `/a` ↔ `/a/`. The root path has no sibling.
fn trailing_slash_sibling(path: &str) -> Option<String> {
    if path.is_empty() || path == "/" {
        return None;
    }
    match path.strip_suffix('/') {
        Some(stripped) => Some(stripped.to_string()),
        None => Some(format!("{path}/")),
    }
}

impl<H: Clone> MethodRoutes<H> {
    fn insert(
        &mut self,
        method: Method,
        route: &CompiledRoute,
        version: Option<&str>,
        handler: &H,
        ignore_trailing_slash: bool,
    ) -> Result<(), RouteError> {
        match &route.form {
            Matchable::Exact(path) => {
                let mut keys = vec![path.clone()];
                if ignore_trailing_slash {
                    keys.extend(trailing_slash_sibling(path));
                }
                self.insert_exact(method, route, &keys, version, handler)
            }
            Matchable::Pattern { .. } => self.insert_pattern(method, route, version, handler),
        }
    }

    fn insert_exact(
        &mut self,
        method: Method,
        route: &CompiledRoute,
        keys: &[String],
        version: Option<&str>,
        handler: &H,
    ) -> Result<(), RouteError> {
        for key in keys {
            if let Some(existing) = self.exact.get(key) {
                existing.handlers.can_attach(version).map_err(|conflict| {
                    conflict_error(conflict, method, &route.source, &existing.source, version)
                })?;
            }
        }

        for (i, key) in keys.iter().enumerate() {
            match self.exact.get_mut(key) {
                Some(existing) => {
                    let attached = existing.handlers.attach(version, handler.clone());
                    debug_assert!(attached.is_ok(), "attach after can_attach failed for {key}");
                }
                None => {
                    let mut entry =
                        Route::new(method, route, RouteHandlers::new(version, handler.clone()));
                    entry.form = Matchable::Exact(key.clone());
                    entry.sibling = i > 0;
                    self.exact.insert(key.clone(), entry);
                }
            }
        }
        Ok(())
    }

    fn insert_pattern(
        &mut self,
        method: Method,
        route: &CompiledRoute,
        version: Option<&str>,
        handler: &H,
    ) -> Result<(), RouteError> {
        match self.patterns.iter_mut().find(|r| r.shape == route.shape) {
            Some(existing) => existing
                .handlers
                .attach(version, handler.clone())
                .map_err(|conflict| {
                    conflict_error(conflict, method, &route.source, &existing.source, version)
                }),
            None => {
                self.patterns.push(Route::new(
                    method,
                    route,
                    RouteHandlers::new(version, handler.clone()),
                ));
                Ok(())
            }
        }
    }
}

/// Routes for every method of the fixed set.
#[derive(Debug, Clone)]
pub struct RouteTable<H> {
    methods: Vec<MethodRoutes<H>>,
}

impl<H> Default for RouteTable<H> {
    fn default() -> Self {
        Self {
            methods: Method::ALL.iter().map(|_| MethodRoutes::default()).collect(),
        }
    }
}

impl<H> RouteTable<H> {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, method: Method) -> &MethodRoutes<H> {
        &self.methods[method.index()]
    }

    /// Exact route registered for `path`.
    pub fn exact(&self, method: Method, path: &str) -> Option<&Route<H>> {
        self.slot(method).exact.get(path)
    }

    /// Pattern routes in match priority order.
    pub fn patterns(&self, method: Method) -> &[Route<H>] {
        &self.slot(method).patterns
    }

    /// Every stored route: per method, exact routes sorted by path, then
    /// pattern routes in priority order. Trailing-slash siblings are included.
    pub fn iter(&self) -> impl Iterator<Item = &Route<H>> {
        self.methods.iter().flat_map(|slot| {
            let mut exact: Vec<&Route<H>> = slot.exact.values().collect();
            exact.sort_by(|a, b| a.form.as_str().cmp(b.form.as_str()));
            exact.into_iter().chain(slot.patterns.iter())
        })
    }

    /// Number of registered routes. Trailing-slash siblings are not counted.
    pub fn len(&self) -> usize {
        self.methods
            .iter()
            .map(|slot| {
                slot.exact.values().filter(|route| !route.sibling).count() + slot.patterns.len()
            })
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<H: Clone> RouteTable<H> {
    /// Register the concrete routes of one pattern under every method.
    ///
    /// Nothing is committed unless all of them are accepted.
    pub fn register(
        &mut self,
        methods: &[Method],
        routes: &[CompiledRoute],
        version: Option<&str>,
        handler: &H,
        ignore_trailing_slash: bool,
    ) -> Result<(), RouteError> {
        let mut staged: Vec<(Method, MethodRoutes<H>)> = Vec::with_capacity(methods.len());
        for &method in methods {
            if staged.iter().any(|(m, _)| *m == method) {
                continue;
            }
            let mut slot = self.slot(method).clone();
            for route in routes {
                slot.insert(method, route, version, handler, ignore_trailing_slash)?;
            }
            staged.push((method, slot));
        }

        for (method, slot) in staged {
            self.methods[method.index()] = slot;
        }
        Ok(())
    }
}

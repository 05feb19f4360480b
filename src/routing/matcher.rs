//! Request resolution.
//!
//! # Responsibilities
//! - Reduce a request target to its path component
//! - Probe exact routes, then scan pattern routes in registration order
//! - Build the parameter map for the winning route
//! - Fall back to the default handler when nothing resolves
//!
//! # Design Decisions
//! - The table is never written during lookup; every call allocates its own
//!   parameter map, so concurrent lookups cannot observe each other
//! - First structural match wins: a pattern route whose version map has no
//!   suitable handler ends the scan with the fallback
//! - A missing fallback is reported as [`MatchSource::NotFound`], not an error

use std::collections::HashMap;
use std::fmt;

use crate::routing::method::Method;
use crate::routing::pattern::{Bindings, Matchable};
use crate::routing::table::{Route, RouteTable};
use crate::routing::version::VersionResolver;

/// Parameter name → value, fresh for every lookup.
pub type Params = HashMap<String, String>;

/// Where the resolved handler came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSource {
    Exact,
    Pattern,
    Fallback,
    NotFound,
}

impl MatchSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchSource::Exact => "exact",
            MatchSource::Pattern => "pattern",
            MatchSource::Fallback => "fallback",
            MatchSource::NotFound => "not_found",
        }
    }
}

impl fmt::Display for MatchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a lookup.
#[derive(Debug)]
pub struct Lookup<'r, H> {
    /// `None` only when nothing matched and no default route is configured.
    pub handler: Option<&'r H>,
    pub params: Params,
    pub source: MatchSource,
}

impl<'r, H> Lookup<'r, H> {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn is_match(&self) -> bool {
        matches!(self.source, MatchSource::Exact | MatchSource::Pattern)
    }
}

/// Strip the query string and fragment from a request target.
pub fn path_component(url: &str) -> &str {
    match url.find(['?', '#']) {
        Some(end) => &url[..end],
        None => url,
    }
}

fn fixed_params(fixed: &Bindings) -> Params {
    fixed.iter().cloned().collect()
}

fn fallback<'r, H>(default_route: Option<&'r H>) -> Lookup<'r, H> {
    Lookup {
        handler: default_route,
        params: Params::new(),
        source: if default_route.is_some() {
            MatchSource::Fallback
        } else {
            MatchSource::NotFound
        },
    }
}

/// Captured values of `route` against `path`, merged over its fixed bindings.
fn capture<H>(route: &Route<H>, path: &str) -> Option<Params> {
    let Matchable::Pattern { regex, params: names } = route.form() else {
        return None;
    };
    let caps = regex.captures(path)?;

    let mut params = fixed_params(route.fixed());
    for (i, name) in names.iter().enumerate() {
        if let Some(value) = caps.name(&format!("p{i}")) {
            params.insert(name.clone(), value.as_str().to_string());
        }
    }
    Some(params)
}

/// Resolve `method` + `url` (+ optional `version`) against `table`.
pub fn lookup<'r, H>(
    table: &'r RouteTable<H>,
    default_route: Option<&'r H>,
    resolver: &dyn VersionResolver,
    method: Method,
    url: &str,
    version: Option<&str>,
) -> Lookup<'r, H> {
    let path = path_component(url);

    if let Some(route) = table.exact(method, path) {
        return match route.handlers().resolve(version, resolver) {
            Some(handler) => Lookup {
                handler: Some(handler),
                params: fixed_params(route.fixed()),
                source: MatchSource::Exact,
            },
            None => {
                tracing::trace!(%method, path, ?version, "No handler for requested version");
                fallback(default_route)
            }
        };
    }

    for route in table.patterns(method) {
        let Some(params) = capture(route, path) else {
            continue;
        };
        return match route.handlers().resolve(version, resolver) {
            Some(handler) => Lookup {
                handler: Some(handler),
                params,
                source: MatchSource::Pattern,
            },
            None => {
                tracing::trace!(%method, path, ?version, "No handler for requested version");
                fallback(default_route)
            }
        };
    }

    tracing::trace!(%method, path, "No route matched");
    fallback(default_route)
}

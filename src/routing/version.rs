//! Version-gated handlers.
//!
//! # Responsibilities
//! - Hold the handlers registered for one route shape
//! - Pick a handler for the version requested by a client
//!
//! # Design Decisions
//! - Range resolution is an injected capability ([`VersionResolver`])
//! - A route without a version map ignores any requested version
//! - A versioned route asked for no version falls back to its unversioned
//!   handler, or to nothing when it never had one

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

/// Selects the registered version key that best satisfies a requested version.
pub trait VersionResolver: Send + Sync + fmt::Debug {
    fn resolve<'k>(&self, requested: &str, available: &[&'k str]) -> Option<&'k str>;
}

/// Resolver for `major.minor.patch` keys with x-ranges.
///
/// `1.2.3` asks for that exact version; `1.2.x`, `1.2`, `1.x`, `1` and `*`
/// ask for the highest registered version inside the range. A leading `v`
/// is ignored. Keys that are not numeric triples only match verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct XRangeResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Triple(u64, u64, u64);

impl Triple {
    fn parse(key: &str) -> Option<Self> {
        let mut parts = strip_v(key).split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next().map_or(Some(0), |p| p.parse().ok())?;
        let patch = parts.next().map_or(Some(0), |p| p.parse().ok())?;
        if parts.next().is_some() {
            return None;
        }
        Some(Triple(major, minor, patch))
    }
}

/// Requested range; `None` is a wildcard component.
#[derive(Debug, Clone, Copy)]
struct Range([Option<u64>; 3]);

impl Range {
    fn parse(requested: &str) -> Option<Self> {
        let mut out = [None; 3];
        let requested = strip_v(requested);
        if requested.is_empty() {
            return Some(Range(out));
        }
        let parts: Vec<&str> = requested.split('.').collect();
        if parts.len() > 3 {
            return None;
        }
        for (slot, part) in out.iter_mut().zip(parts) {
            match part {
                "x" | "X" | "*" => break,
                digits => *slot = Some(digits.parse().ok()?),
            }
        }
        Some(Range(out))
    }

    fn contains(&self, version: Triple) -> bool {
        let Triple(major, minor, patch) = version;
        [major, minor, patch]
            .iter()
            .zip(self.0)
            .all(|(actual, wanted)| wanted.map_or(true, |w| w == *actual))
    }
}

fn strip_v(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix(['v', 'V']).unwrap_or(s)
}

impl VersionResolver for XRangeResolver {
    fn resolve<'k>(&self, requested: &str, available: &[&'k str]) -> Option<&'k str> {
        if let Some(exact) = available.iter().copied().find(|key| *key == requested) {
            return Some(exact);
        }
        let range = Range::parse(requested)?;
        available
            .iter()
            .filter_map(|key| Triple::parse(key).map(|triple| (triple, *key)))
            .filter(|(triple, _)| range.contains(*triple))
            .max_by_key(|(triple, _)| *triple)
            .map(|(_, key)| key)
    }
}

/// Version key → handler.
#[derive(Debug, Clone)]
pub struct VersionMap<H> {
    entries: BTreeMap<String, H>,
}

impl<H> Default for VersionMap<H> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<H> VersionMap<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, version: &str) -> bool {
        self.entries.contains_key(version)
    }

    /// Insert a handler; returns false if the key is already taken.
    pub fn insert(&mut self, version: impl Into<String>, handler: H) -> bool {
        match self.entries.entry(version.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(handler);
                true
            }
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Delegate the choice of key to `resolver`.
    pub fn resolve(&self, requested: &str, resolver: &dyn VersionResolver) -> Option<&H> {
        let keys: Vec<&str> = self.keys().collect();
        resolver
            .resolve(requested, &keys)
            .and_then(|key| self.entries.get(key))
    }
}

/// Why a handler could not be attached to a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AttachConflict {
    Unversioned,
    Version,
}

/// The handlers stored on one route: an optional base handler plus an
/// optional version map.
#[derive(Debug, Clone)]
pub struct RouteHandlers<H> {
    base: Option<H>,
    versions: Option<VersionMap<H>>,
}

impl<H> RouteHandlers<H> {
    pub(crate) fn new(version: Option<&str>, handler: H) -> Self {
        match version {
            Some(version) => {
                let mut versions = VersionMap::new();
                versions.insert(version, handler);
                Self {
                    base: None,
                    versions: Some(versions),
                }
            }
            None => Self {
                base: Some(handler),
                versions: None,
            },
        }
    }

    /// Attach another registration for the same shape.
    pub(crate) fn attach(&mut self, version: Option<&str>, handler: H) -> Result<(), AttachConflict> {
        match version {
            None if self.base.is_some() => Err(AttachConflict::Unversioned),
            None => {
                self.base = Some(handler);
                Ok(())
            }
            Some(version) => {
                let versions = self.versions.get_or_insert_with(VersionMap::new);
                if versions.insert(version, handler) {
                    Ok(())
                } else {
                    Err(AttachConflict::Version)
                }
            }
        }
    }

    /// Check [`attach`](Self::attach) would succeed without mutating.
    pub(crate) fn can_attach(&self, version: Option<&str>) -> Result<(), AttachConflict> {
        match version {
            None if self.base.is_some() => Err(AttachConflict::Unversioned),
            None => Ok(()),
            Some(version) if self.versions.as_ref().is_some_and(|v| v.contains(version)) => {
                Err(AttachConflict::Version)
            }
            Some(_) => Ok(()),
        }
    }

    pub fn base(&self) -> Option<&H> {
        self.base.as_ref()
    }

    pub fn versions(&self) -> Option<&VersionMap<H>> {
        self.versions.as_ref()
    }

    /// Pick the handler for `requested`.
    pub fn resolve(&self, requested: Option<&str>, resolver: &dyn VersionResolver) -> Option<&H> {
        let requested = requested.filter(|v| !v.is_empty());
        match (&self.versions, requested) {
            (None, _) => self.base.as_ref(),
            (Some(versions), Some(requested)) => versions.resolve(requested, resolver),
            (Some(_), None) => self.base.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_x_range_resolver() {
        let resolver = XRangeResolver;
        let keys = ["1.0.0", "1.2.0", "1.2.5", "2.0.0", "beta"];

        assert_eq!(resolver.resolve("1.2.0", &keys), Some("1.2.0"));
        assert_eq!(resolver.resolve("1.2.x", &keys), Some("1.2.5"));
        assert_eq!(resolver.resolve("1.2", &keys), Some("1.2.5"));
        assert_eq!(resolver.resolve("1.x", &keys), Some("1.2.5"));
        assert_eq!(resolver.resolve("v1", &keys), Some("1.2.5"));
        assert_eq!(resolver.resolve("*", &keys), Some("2.0.0"));
        assert_eq!(resolver.resolve("beta", &keys), Some("beta"));
        assert_eq!(resolver.resolve("3.x", &keys), None);
        assert_eq!(resolver.resolve("1.3.0", &keys), None);
        assert_eq!(resolver.resolve("garbage", &keys), None);
    }

    #[test]
    fn test_version_map_rejects_duplicate_key() {
        let mut map = VersionMap::new();
        assert!(map.insert("1.0.0", "a"));
        assert!(!map.insert("1.0.0", "b"));
        assert_eq!(map.len(), 1);
        assert_eq!(map.resolve("1.0.0", &XRangeResolver), Some(&"a"));
    }

    #[test]
    fn test_unversioned_route_ignores_requested_version() {
        let handlers = RouteHandlers::new(None, "base");
        assert_eq!(handlers.resolve(Some("9.9.9"), &XRangeResolver), Some(&"base"));
        assert_eq!(handlers.resolve(None, &XRangeResolver), Some(&"base"));
    }

    #[test]
    fn test_versioned_route_without_requested_version() {
        let mut handlers = RouteHandlers::new(Some("1.0.0"), "v1");
        assert_eq!(handlers.resolve(None, &XRangeResolver), None);
        assert_eq!(handlers.resolve(Some(""), &XRangeResolver), None);

        handlers.attach(None, "base").unwrap();
        assert_eq!(handlers.resolve(None, &XRangeResolver), Some(&"base"));
        assert_eq!(handlers.resolve(Some("1.0.0"), &XRangeResolver), Some(&"v1"));
        assert_eq!(handlers.resolve(Some("2.0.0"), &XRangeResolver), None);
    }

    #[test]
    fn test_attach_conflicts() {
        let mut handlers = RouteHandlers::new(None, "base");
        assert_eq!(handlers.can_attach(None), Err(AttachConflict::Unversioned));
        assert_eq!(handlers.attach(None, "again"), Err(AttachConflict::Unversioned));

        assert_eq!(handlers.can_attach(Some("1.0.0")), Ok(()));
        handlers.attach(Some("1.0.0"), "v1").unwrap();
        assert_eq!(handlers.can_attach(Some("1.0.0")), Err(AttachConflict::Version));
        assert_eq!(handlers.attach(Some("1.0.0"), "v1b"), Err(AttachConflict::Version));
        assert_eq!(handlers.base(), Some(&"base"));
    }
}

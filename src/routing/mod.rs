//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Registration (at startup):
//!     methods + pattern (+ version) + handler
//!     → method.rs (normalize method argument)
//!     → expressions.rs (expand :name: macros)
//!     → pattern.rs (parse, enum expansion, exact or regex form, shape)
//!     → table.rs (per-method exact map / ordered pattern list, conflict checks)
//!     → version.rs (merge versioned handlers into an existing shape)
//!     → Freeze as immutable Router
//!
//! Incoming Request (method, url, version):
//!     → matcher.rs (exact probe, then first matching pattern)
//!     → version.rs (resolve requested version)
//!     → Return: handler + fresh params, or the default route
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Exact paths are a single hash probe; regex only for dynamic routes
//! - Deterministic: same input always matches same route
//! - First registered pattern wins

pub mod expressions;
pub mod matcher;
pub mod method;
pub mod pattern;
pub mod router;
pub mod table;
pub mod version;

pub use expressions::NamedExpressions;
pub use matcher::{Lookup, MatchSource, Params};
pub use method::{IntoMethods, Method};
pub use router::{RouteOptions, Router, RouterBuilder, RouterOptions};
pub use table::Route;
pub use version::{VersionMap, VersionResolver, XRangeResolver};

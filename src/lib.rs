//! HTTP request router with typed path parameters, enum expansion,
//! named-expression macros and per-route version maps.
//!
//! ```
//! use versioned_router::{Method, RouteOptions, Router};
//!
//! let mut builder = Router::builder();
//! builder.get("/users/:id-(\\d+)", "show").unwrap();
//! builder
//!     .on_with("GET", "/users/:id-(\\d+)", RouteOptions::version("2.0.0"), "show v2")
//!     .unwrap();
//! let router = builder.build();
//!
//! let found = router.lookup(Method::Get, "/users/42", Some("2.x"));
//! assert_eq!(found.handler, Some(&"show v2"));
//! assert_eq!(found.param("id"), Some("42"));
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::AppConfig;
pub use error::{RouteError, RouteResult};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{
    IntoMethods, Lookup, MatchSource, Method, NamedExpressions, Params, RouteOptions, Router,
    RouterBuilder, RouterOptions, VersionResolver, XRangeResolver,
};

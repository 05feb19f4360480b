//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → build.rs (register routes, freeze Router)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Route conflicts surface from the router, tagged with the route index

pub mod build;
pub mod loader;
pub mod schema;
pub mod validation;

pub use build::build_router;
pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AppConfig, DefaultRouteConfig, ObservabilityConfig, RouteConfig, RouterConfig, ServerConfig,
};
pub use validation::ValidationError;

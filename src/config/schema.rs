//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router
//! service. All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Router construction options.
    pub router: RouterConfig,

    /// HTTP listener settings.
    pub server: ServerConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,

    /// Named-expression macros (`name = "fragment"`), usable as `:name:`.
    pub expressions: BTreeMap<String, String>,

    /// Response for requests no route resolves.
    pub default_route: Option<DefaultRouteConfig>,

    /// Route definitions, registered in file order.
    pub routes: Vec<RouteConfig>,
}

/// Router construction options.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Treat `/a` and `/a/` as the same route.
    pub ignore_trailing_slash: bool,

    /// Prefix patterns that lack a leading slash.
    pub ignore_leading_slash: bool,

    /// Accepted for compatibility; has no effect.
    pub overwrite_allow: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            ignore_trailing_slash: false,
            ignore_leading_slash: true,
            overwrite_allow: false,
        }
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Header carrying the requested API version.
    pub version_header: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
            version_header: "accept-version".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,

    /// Enable the Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "versioned_router=info,tower_http=info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Fallback response.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DefaultRouteConfig {
    pub status: u16,
    pub body: String,
    pub content_type: String,
}

impl Default for DefaultRouteConfig {
    fn default() -> Self {
        Self {
            status: 404,
            body: "Not Found".to_string(),
            content_type: default_content_type(),
        }
    }
}

/// A route and the response it produces.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Methods the route answers (e.g., `["GET", "HEAD"]`).
    pub methods: Vec<String>,

    /// Route pattern (e.g., `/users/:id-(\d+)`).
    pub pattern: String,

    /// Version key; unversioned when absent.
    pub version: Option<String>,

    /// Response status code.
    pub status: u16,

    /// Response body template. `{name}` expands to a parameter value.
    pub body: String,

    pub content_type: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            methods: vec!["GET".to_string()],
            pattern: String::new(),
            version: None,
            status: 200,
            body: String::new(),
            content_type: default_content_type(),
        }
    }
}

fn default_content_type() -> String {
    "text/plain; charset=utf-8".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
        assert_eq!(config.server.version_header, "accept-version");
        assert!(config.router.ignore_leading_slash);
        assert!(config.default_route.is_none());
        assert!(config.routes.is_empty());
    }

    #[test]
    fn test_route_table_parses() {
        let config: AppConfig = toml::from_str(
            r#"
            [expressions]
            id = '\d+'

            [default_route]
            body = "nope"

            [[routes]]
            methods = ["GET", "HEAD"]
            pattern = "/users/:id-(:id:)"
            version = "1.0.0"
            body = "user {id}"
            "#,
        )
        .unwrap();

        assert_eq!(config.expressions.get("id").map(String::as_str), Some(r"\d+"));
        let fallback = config.default_route.unwrap();
        assert_eq!(fallback.status, 404);
        assert_eq!(fallback.body, "nope");

        let route = &config.routes[0];
        assert_eq!(route.methods, vec!["GET", "HEAD"]);
        assert_eq!(route.version.as_deref(), Some("1.0.0"));
        assert_eq!(route.status, 200);
        assert_eq!(route.content_type, "text/plain; charset=utf-8");
    }
}

//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, status codes, socket addresses)
//! - Reject methods outside the supported set before any route is built
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - Pattern syntax and route conflicts are left to the router itself

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::routing::Method;

/// A single semantic problem, located by its config path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            field,
            format!("'{value}' is not a valid socket address"),
        ));
    }
}

fn check_status(errors: &mut Vec<ValidationError>, field: String, status: u16) {
    if !(100..=599).contains(&status) {
        errors.push(ValidationError::new(
            field,
            format!("{status} is not a valid HTTP status code"),
        ));
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "server.bind_address", &config.server.bind_address);
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "server.request_timeout_secs",
            "must be greater than zero",
        ));
    }
    if config.server.version_header.trim().is_empty() {
        errors.push(ValidationError::new("server.version_header", "must not be empty"));
    }

    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if let Some(fallback) = &config.default_route {
        check_status(&mut errors, "default_route.status".to_string(), fallback.status);
    }

    for (i, route) in config.routes.iter().enumerate() {
        let field = |name: &str| format!("routes[{i}].{name}");

        if route.methods.is_empty() {
            errors.push(ValidationError::new(field("methods"), "must not be empty"));
        }
        for method in &route.methods {
            if method.parse::<Method>().is_err() {
                errors.push(ValidationError::new(
                    field("methods"),
                    format!("unsupported method '{method}'"),
                ));
            }
        }
        if route.pattern.is_empty() {
            errors.push(ValidationError::new(field("pattern"), "must not be empty"));
        }
        if route.version.as_deref().is_some_and(|v| v.trim().is_empty()) {
            errors.push(ValidationError::new(field("version"), "must not be empty when set"));
        }
        check_status(&mut errors, field("status"), route.status);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{DefaultRouteConfig, RouteConfig};

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = AppConfig::default();
        config.server.bind_address = "nowhere".to_string();
        config.server.request_timeout_secs = 0;
        config.default_route = Some(DefaultRouteConfig {
            status: 42,
            ..DefaultRouteConfig::default()
        });
        config.routes.push(RouteConfig {
            methods: vec!["GET".into(), "FETCH".into()],
            pattern: String::new(),
            status: 700,
            ..RouteConfig::default()
        });
        config.routes.push(RouteConfig {
            methods: Vec::new(),
            pattern: "/ok".into(),
            ..RouteConfig::default()
        });

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "server.bind_address",
                "server.request_timeout_secs",
                "default_route.status",
                "routes[0].methods",
                "routes[0].pattern",
                "routes[0].status",
                "routes[1].methods",
            ]
        );
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = AppConfig::default();
        config.observability.metrics_address = "bad".to_string();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "observability.metrics_address");
    }
}

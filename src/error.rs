//! Registration error definitions.
//!
//! Every failure here is raised while the route table is being built.
//! Lookups never fail: an unmatched request is a normal outcome.

use thiserror::Error;

/// Errors that can occur while registering routes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The method argument did not name any method.
    #[error("Invalid method argument: {0}")]
    InvalidMethodArgument(String),

    /// The method token is not part of the supported method set.
    #[error("Invalid method type {0}")]
    UnknownMethod(String),

    /// A `:name:` macro was referenced before being registered.
    #[error("Unknown named expression :{0}:")]
    UnknownExpression(String),

    /// The pattern could not be parsed.
    #[error("Invalid pattern {pattern}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// The assembled regular expression failed to compile.
    #[error("Invalid regex for {pattern}: {reason}")]
    InvalidRegex { pattern: String, reason: String },

    /// An equivalent route is already registered without a version to tell them apart.
    #[error("{method} {pattern} is matching with already registered route {existing}")]
    DuplicateRoute {
        method: String,
        pattern: String,
        existing: String,
    },

    /// A version option was given but holds no version key.
    #[error("Empty version key for {0}")]
    EmptyVersion(String),

    /// The same version key was registered twice for one route shape.
    #[error("Version {version} of {method} {pattern} is already registered")]
    DuplicateVersion {
        method: String,
        pattern: String,
        version: String,
    },
}

/// Result type for registration operations.
pub type RouteResult<T> = Result<T, RouteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RouteError::UnknownMethod("FETCH".into());
        assert_eq!(err.to_string(), "Invalid method type FETCH");

        let err = RouteError::DuplicateVersion {
            method: "GET".into(),
            pattern: "/users".into(),
            version: "1.0.0".into(),
        };
        assert!(err.to_string().contains("1.0.0"));
        assert!(err.to_string().contains("/users"));
    }
}

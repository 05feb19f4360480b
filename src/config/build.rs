//! Building a router from configuration.
//!
//! Routes are registered in file order, so earlier `[[routes]]` entries take
//! priority among overlapping patterns.

use axum::http::StatusCode;

use crate::config::loader::ConfigError;
use crate::config::schema::{AppConfig, RouterConfig};
use crate::config::validation::ValidationError;
use crate::http::handler::{boxed, BoxHandler, ResponseTemplate};
use crate::routing::{RouteOptions, Router, RouterBuilder, RouterOptions};

impl From<&RouterConfig> for RouterOptions {
    fn from(config: &RouterConfig) -> Self {
        RouterOptions {
            ignore_trailing_slash: config.ignore_trailing_slash,
            ignore_leading_slash: config.ignore_leading_slash,
            overwrite_allow: config.overwrite_allow,
        }
    }
}

fn status(field: String, code: u16) -> Result<StatusCode, ConfigError> {
    StatusCode::from_u16(code).map_err(|_| {
        ConfigError::Validation(vec![ValidationError {
            field,
            message: format!("{code} is not a valid HTTP status code"),
        }])
    })
}

/// Register every configured route and build the router.
pub fn build_router(config: &AppConfig) -> Result<Router<BoxHandler>, ConfigError> {
    let mut builder: RouterBuilder<BoxHandler> =
        RouterBuilder::with_options(RouterOptions::from(&config.router));

    for (name, fragment) in &config.expressions {
        builder.add_named_expression(name.as_str(), fragment.as_str());
    }

    if let Some(fallback) = &config.default_route {
        let template = ResponseTemplate::new(
            status("default_route.status".to_string(), fallback.status)?,
            fallback.content_type.as_str(),
            fallback.body.as_str(),
        );
        builder = builder.default_route(boxed(template));
    }

    for (index, route) in config.routes.iter().enumerate() {
        let template = ResponseTemplate::new(
            status(format!("routes[{index}].status"), route.status)?,
            route.content_type.as_str(),
            route.body.as_str(),
        );
        let options = RouteOptions {
            version: route.version.clone(),
        };
        builder
            .on_with(route.methods.as_slice(), &route.pattern, options, boxed(template))
            .map_err(|source| ConfigError::Route {
                index,
                pattern: route.pattern.clone(),
                source,
            })?;
    }

    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::parse_config;
    use crate::error::RouteError;
    use crate::http::request::RequestContext;
    use crate::routing::{MatchSource, Method};

    fn body(router: &Router<BoxHandler>, method: Method, url: &str, version: Option<&str>) -> String {
        let lookup = router.lookup(method, url, version);
        let handler = lookup.handler.expect("handler");
        let ctx = RequestContext::new(method, url, version, lookup.params);
        handler.call(&ctx).body
    }

    #[test]
    fn test_build_from_config() {
        let config = parse_config(
            r#"
            [expressions]
            id = '\d+'

            [default_route]
            status = 404
            body = "fallback"

            [[routes]]
            methods = ["GET"]
            pattern = "/users/:id-(:id:)"
            body = "user {id}"

            [[routes]]
            methods = ["GET"]
            pattern = "/users/:id-(:id:)"
            version = "2.0.0"
            body = "v2 user {id}"

            [[routes]]
            methods = ["GET", "POST"]
            pattern = "/files/*"
            body = "file {*}"
            "#,
        )
        .unwrap();
        let router = build_router(&config).unwrap();

        assert_eq!(body(&router, Method::Get, "/users/7", None), "user 7");
        assert_eq!(body(&router, Method::Get, "/users/7", Some("2.x")), "v2 user 7");
        assert_eq!(body(&router, Method::Post, "/files/a/b.txt", None), "file a/b.txt");
        assert_eq!(body(&router, Method::Get, "/users/abc", None), "fallback");
        assert_eq!(
            router.lookup(Method::Get, "/users/abc", None).source,
            MatchSource::Fallback
        );
    }

    #[test]
    fn test_route_error_reports_index() {
        let config = parse_config(
            r#"
            [[routes]]
            pattern = "/a"

            [[routes]]
            pattern = "/a"
            "#,
        )
        .unwrap();
        let err = build_router(&config).unwrap_err();
        match err {
            ConfigError::Route { index, source, .. } => {
                assert_eq!(index, 1);
                assert!(matches!(source, RouteError::DuplicateRoute { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_expression_is_route_error() {
        let config = parse_config("[[routes]]\npattern = \"/a/:x-(:nope:)\"\n").unwrap();
        let err = build_router(&config).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Route {
                source: RouteError::UnknownExpression(_),
                ..
            }
        ));
    }
}

//! Handler responses.
//!
//! # Responsibilities
//! - Carry status, content type and body out of a handler
//! - Convert into an axum response at the transport edge
//! - Render body templates against the request parameters

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::routing::Params;

/// Response produced by a route handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerResponse {
    #[serde(serialize_with = "serialize_status")]
    pub status: StatusCode,
    pub content_type: String,
    pub body: String,
}

fn serialize_status<S: serde::Serializer>(status: &StatusCode, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u16(status.as_u16())
}

impl HandlerResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8".to_string(),
            body: body.into(),
        }
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Answer for requests nothing resolves and no default route covers.
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "No matching route found")
    }
}

impl IntoResponse for HandlerResponse {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.body).into_response();
        match HeaderValue::from_str(&self.content_type) {
            Ok(value) => {
                response.headers_mut().insert(header::CONTENT_TYPE, value);
            }
            Err(_) => {
                tracing::warn!(content_type = %self.content_type, "Invalid content type; keeping default");
            }
        }
        response
    }
}

/// Expand `{name}` placeholders with parameter values.
///
/// Placeholders without a matching parameter are left untouched.
pub fn render_template(template: &str, params: &Params) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if !after[..close].contains('{') => {
                let name = &after[..close];
                match params.get(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            // Unclosed, or another `{` comes first
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

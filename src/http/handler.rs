//! Route handlers.
//!
//! The router is generic over its handler type; the HTTP adapter and the
//! config loader both use [`BoxHandler`].

use std::fmt;
use std::sync::Arc;

use axum::http::StatusCode;

use crate::http::request::RequestContext;
use crate::http::response::{render_template, HandlerResponse};

/// Something that turns a resolved request into a response.
pub trait RouteHandler: Send + Sync + 'static {
    fn call(&self, ctx: &RequestContext) -> HandlerResponse;

    /// Short label for route listings.
    fn describe(&self) -> String {
        "handler".to_string()
    }
}

impl<F> RouteHandler for F
where
    F: Fn(&RequestContext) -> HandlerResponse + Send + Sync + 'static,
{
    fn call(&self, ctx: &RequestContext) -> HandlerResponse {
        self(ctx)
    }
}

/// Shared, type-erased handler.
pub type BoxHandler = Arc<dyn RouteHandler>;

/// Wrap a closure or handler value as a [`BoxHandler`].
pub fn boxed(handler: impl RouteHandler) -> BoxHandler {
    Arc::new(handler)
}

/// Static response whose body is rendered against the request parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseTemplate {
    pub status: StatusCode,
    pub content_type: String,
    pub body: String,
}

impl ResponseTemplate {
    pub fn new(status: StatusCode, content_type: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: content_type.into(),
            body: body.into(),
        }
    }
}

impl RouteHandler for ResponseTemplate {
    fn call(&self, ctx: &RequestContext) -> HandlerResponse {
        HandlerResponse::new(self.status, render_template(&self.body, &ctx.params))
            .content_type(self.content_type.clone())
    }

    fn describe(&self) -> String {
        format!("{} {:?}", self.status.as_u16(), self.body)
    }
}

impl fmt::Debug for dyn RouteHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RouteHandler({})", self.describe())
    }
}

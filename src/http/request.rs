//! Request identification and the context handed to route handlers.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for every request
//! - Extract routing-relevant information (method, path, version)
//! - Carry the fresh parameter map from lookup into the handler
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The context owns its data; the request body is never read

use axum::http::{HeaderMap, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::routing::{Method, Params};

pub const X_REQUEST_ID: &str = "x-request-id";

/// Issues a UUID v4 for requests that arrive without an `x-request-id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// The request ID carried in `headers`, if any.
pub fn request_id(headers: &HeaderMap) -> Option<&str> {
    headers.get(X_REQUEST_ID).and_then(|v| v.to_str().ok())
}

/// Everything a handler may look at.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    /// Path component, without query string.
    pub path: String,
    pub query: Option<String>,
    /// Version requested by the client, if any.
    pub version: Option<String>,
    pub params: Params,
    pub headers: HeaderMap,
}

impl RequestContext {
    pub fn new(method: Method, url: &str, version: Option<&str>, params: Params) -> Self {
        let (path, query) = match url.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (url, None),
        };
        Self {
            method,
            path: path.to_string(),
            query,
            version: version.map(str::to_string),
            params,
            headers: HeaderMap::new(),
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn request_id(&self) -> Option<&str> {
        request_id(&self.headers)
    }
}

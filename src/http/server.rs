//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum service with a single fallback handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to listener and stop on shutdown
//! - Dispatch every request through the routing engine
//! - Observability (metrics, correlation IDs)

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::{header::InvalidHeaderName, HeaderName},
    response::{IntoResponse, Response},
    Router as AxumRouter,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::http::handler::BoxHandler;
use crate::http::request::{request_id, RequestContext, UuidRequestId};
use crate::http::response::HandlerResponse;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::routing::{Method, Router};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid version header name: {0}")]
    VersionHeader(#[from] InvalidHeaderName),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into the dispatcher.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<Router<BoxHandler>>,
    pub version_header: HeaderName,
}

/// HTTP front end for a built router.
pub struct HttpServer {
    app: AxumRouter,
}

impl HttpServer {
    /// Create a new HTTP server serving `router`.
    pub fn new(config: &ServerConfig, router: Arc<Router<BoxHandler>>) -> Result<Self, ServerError> {
        let version_header = HeaderName::from_bytes(config.version_header.trim().as_bytes())?;
        let state = AppState {
            router,
            version_header,
        };
        let app = Self::build_app(config, state);
        Ok(Self { app })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_app(config: &ServerConfig, state: AppState) -> AxumRouter {
        AxumRouter::new()
            .fallback(dispatch)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = request_id(request.headers()).unwrap_or("-"),
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// The layered service, for in-process use.
    pub fn into_router(self) -> AxumRouter {
        self.app
    }

    /// Run the server until `shutdown` is triggered.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Resolve the request against the router and invoke the handler.
async fn dispatch(State(state): State<AppState>, request: Request) -> Response {
    let start_time = Instant::now();

    let Ok(method) = request.method().as_str().parse::<Method>() else {
        tracing::warn!(method = %request.method(), "Unsupported method");
        let label = metrics::method_label(request.method().as_str());
        metrics::record_request(label, 405, start_time);
        return HandlerResponse::new(
            axum::http::StatusCode::METHOD_NOT_ALLOWED,
            "Unsupported method",
        )
        .into_response();
    };

    let url = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let version = request
        .headers()
        .get(&state.version_header)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let lookup = state.router.lookup(method, url, version);
    metrics::record_lookup(method, lookup.source);

    let response = match lookup.handler {
        Some(handler) => {
            tracing::debug!(
                source = %lookup.source,
                params = ?lookup.params,
                version = ?version,
                "Route resolved"
            );
            let ctx = RequestContext::new(method, url, version, lookup.params)
                .with_headers(request.headers().clone());
            handler.call(&ctx)
        }
        None => {
            tracing::warn!(%method, url, version = ?version, "No matching route found");
            HandlerResponse::not_found()
        }
    };

    metrics::record_request(method.as_str(), response.status.as_u16(), start_time);
    response.into_response()
}

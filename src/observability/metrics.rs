//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define router metrics (lookup outcomes, requests, latency)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `router_lookups_total` (counter): lookups by method, outcome
//! - `router_requests_total` (counter): HTTP requests by method, status
//! - `router_request_duration_seconds` (histogram): latency distribution
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Outcome labels mirror `MatchSource` so dashboards can tell a pattern
//!   hit from a fallback

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::routing::{MatchSource, Method};

pub const LOOKUPS_TOTAL: &str = "router_lookups_total";
pub const REQUESTS_TOTAL: &str = "router_requests_total";
pub const REQUEST_DURATION: &str = "router_request_duration_seconds";

/// Label for request methods outside the supported set.
pub const OTHER_METHOD: &str = "OTHER";

/// Bounded `method` label for a request method token.
pub fn method_label(token: &str) -> &'static str {
    token
        .parse::<Method>()
        .map(|method| method.as_str())
        .unwrap_or(OTHER_METHOD)
}

/// Install the Prometheus recorder and its HTTP listener on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    metrics::describe_counter!(LOOKUPS_TOTAL, "Route lookups by method and outcome");
    metrics::describe_counter!(REQUESTS_TOTAL, "HTTP requests by method and status");
    metrics::describe_histogram!(
        REQUEST_DURATION,
        metrics::Unit::Seconds,
        "HTTP request latency"
    );

    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Count one router lookup.
pub fn record_lookup(method: Method, source: MatchSource) {
    metrics::counter!(
        LOOKUPS_TOTAL,
        "method" => method.as_str(),
        "outcome" => source.as_str()
    )
    .increment(1);
}

/// Count one HTTP request and its latency.
///
/// `method` must come from [`method_label`] so the label set stays bounded.
pub fn record_request(method: &'static str, status: u16, start: Instant) {
    metrics::counter!(
        REQUESTS_TOTAL,
        "method" => method,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!(REQUEST_DURATION, "method" => method)
        .record(start.elapsed().as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_label_is_bounded() {
        assert_eq!(method_label("GET"), "GET");
        assert_eq!(method_label("PROPFIND"), "PROPFIND");
        assert_eq!(method_label("BREW"), OTHER_METHOD);
        assert_eq!(method_label("BREW2"), OTHER_METHOD);
        assert_eq!(method_label("get"), OTHER_METHOD);
    }
}

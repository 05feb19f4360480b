//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Router and HTTP adapter produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (lookup outcomes, request counters, latency histogram)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - `RUST_LOG` overrides the configured filter
//! - Request ID flows through every request span
//! - Metrics are cheap (atomic increments) and no-ops until a recorder is installed

pub mod logging;
pub mod metrics;

pub use logging::init_logging;

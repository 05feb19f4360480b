//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, single fallback dispatcher)
//!     → request.rs (request ID, method/path/version extraction)
//!     → routing::Router::lookup (handler + fresh params)
//!     → handler.rs (invoke handler with RequestContext)
//!     → response.rs (status, content type, rendered body)
//!     → Send to client
//! ```

pub mod handler;
pub mod request;
pub mod response;
pub mod server;

pub use handler::{boxed, BoxHandler, ResponseTemplate, RouteHandler};
pub use request::{RequestContext, UuidRequestId, X_REQUEST_ID};
pub use response::HandlerResponse;
pub use server::{HttpServer, ServerError};

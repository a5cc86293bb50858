//! # Request Logger
//!
//! Request-scoped structured logging for Axum services.
//!
//! ## Features
//!
//! - JSON-lines logging on `tracing`, with a one-time global initializer
//!   ([`logging::init`]) and injectable providers ([`logging::LogProvider`])
//! - Per-request identifiers (`X-Request-ID`, propagated or generated as UUID v4)
//!   attached to every record emitted while the request is handled
//! - One completion record per request, leveled by response status
//! - Panic recovery turning crashes into `500` responses with full diagnostics in the logs
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use axum::{Router, routing::get};
//! use request_logger::prelude::*;
//!
//! let logging = LogProvider::new("billing", Severity::Info);
//! logging.install()?;
//!
//! let state = AppState::new(logging, false);
//! let app = with_request_logging(Router::new().route("/", get(|| async { "ok" })), state);
//! ```
//!
//! ## Configuration
//!
//! The bundled server reads its configuration from environment variables via
//! [`config::Config`].

pub mod api;
pub mod context;
pub mod error;
pub mod logging;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::{AppError, LogError};
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::context::{ReqLogger, RequestContext, RequestId, current_req_id};
    pub use crate::error::{AppError, HandlerErrors};
    pub use crate::logging::{LogProvider, Logger, Severity};
    pub use crate::routes::with_request_logging;
    pub use crate::state::AppState;
}

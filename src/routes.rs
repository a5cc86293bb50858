//! Router configuration.
//!
//! # Route Structure
//!
//! - `GET  /health`      - Liveness check (public)
//!
//! # Middleware
//!
//! Inner to outer:
//!
//! - **Recovery** - Panics become `500 {"message":"internal server error"}`
//! - **Request logging** - Request id, scoped logger, completion record
//! - **Path normalization** - Trailing slash handling

use crate::api::handlers::health_handler;
use crate::api::middleware::{recovery, request_log};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let routes = Router::new().route("/health", get(health_handler));

    let router = with_request_logging(routes, state);

    NormalizePathLayer::trim_trailing_slash().layer(router)
}

/// Wraps `routes` with panic recovery and request logging.
///
/// Request logging is the outer layer, so recovered panics still produce a
/// completion record (with status 500) carrying the request id.
pub fn with_request_logging(routes: Router<AppState>, state: AppState) -> Router {
    routes
        .layer(middleware::from_fn(recovery::layer))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            request_log::layer,
        ))
        .with_state(state)
}

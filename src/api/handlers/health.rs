//! Handler for health check endpoint.

use axum::{Json, extract::State};

use crate::api::dto::health::HealthResponse;
use crate::context::{ReqLogger, current_req_id};
use crate::state::AppState;

/// Returns service liveness.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// ```json
/// {
///   "status": "ok",
///   "service": "billing",
///   "version": "0.1.0",
///   "req_id": "abc-123"
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
    ReqLogger(log): ReqLogger,
) -> Json<HealthResponse> {
    log.debug("health check");

    Json(HealthResponse {
        status: "ok".to_string(),
        service: state.logging.service().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        req_id: current_req_id().map(|id| id.into_inner()),
    })
}

//! Request-scoped logging middleware.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::Response,
};
use std::{
    net::SocketAddr,
    time::{Duration, Instant},
};
use tracing::{Instrument, Level};

use crate::context::{RequestContext, RequestId};
use crate::error::HandlerErrors;
use crate::logging::{Logger, Severity};
use crate::state::AppState;
use crate::utils::client_ip::client_ip;
use crate::utils::request_id::REQUEST_ID_HEADER;

/// Assigns a request id, scopes a logger to the request and logs completion.
///
/// Install it as the outermost logging layer so everything inside (including
/// [`recovery::layer`](super::recovery::layer)) runs under the request logger.
///
/// # Request Flow
///
/// 1. Reuse a non-empty `X-Request-ID` header or generate a UUID v4
/// 2. Derive a logger with `req_id`, `method`, `path` and `ip`
/// 3. Store a [`RequestContext`] in the request extensions and the task scope
/// 4. Run the inner service with the request span entered
/// 5. Echo `X-Request-ID` on the response and log `request completed`
///
/// The completion record carries `status`, `latency` (nanoseconds),
/// `user_agent` and, when handlers reported any, `handler_errors` (an array
/// of strings). Its level is `ERROR` for 5xx,
/// `WARN` for 4xx and `INFO` otherwise.
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/health", get(health_handler))
///     .layer(middleware::from_fn(recovery::layer))
///     .layer(middleware::from_fn_with_state(state.clone(), request_log::layer));
/// ```
pub async fn layer(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let provider = state.logging.clone();
    provider.scope(log_request(state, req, next)).await
}

async fn log_request(state: AppState, mut req: Request, next: Next) -> Response {
    let start = Instant::now();

    let inbound = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(RequestId::new);

    let req_id = match inbound {
        Some(id) => id,
        None => {
            let id = RequestId::generate();
            if let Ok(value) = HeaderValue::from_str(id.as_str()) {
                req.headers_mut().insert(REQUEST_ID_HEADER, value);
            }
            id
        }
    };

    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let ip = client_ip(req.headers(), peer, state.behind_proxy);

    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let span = tracing::info_span!(
        "request",
        req_id = %req_id,
        method = %req.method(),
        path = %req.uri().path(),
        ip = %ip,
    );
    let logger = Logger::from_span(span.clone());

    let ctx = RequestContext::new(req_id.clone(), logger, start);
    req.extensions_mut().insert(ctx.clone());

    let mut response = ctx.clone().scope(next.run(req)).instrument(span).await;

    let latency = ctx.elapsed();

    if let Ok(value) = HeaderValue::from_str(req_id.as_str()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    log_completion(
        ctx.logger(),
        response.status(),
        latency,
        &user_agent,
        response.extensions().get::<HandlerErrors>(),
    );

    response
}

fn log_completion(
    logger: &Logger,
    status: StatusCode,
    latency: Duration,
    user_agent: &str,
    errors: Option<&HandlerErrors>,
) {
    let span = logger.span();
    let latency = u64::try_from(latency.as_nanos()).unwrap_or(u64::MAX);
    let handler_errors = errors
        .filter(|e| !e.is_empty())
        .and_then(|e| serde_json::to_string(e.messages()).ok());
    let handler_errors = handler_errors.as_deref();

    macro_rules! completed {
        ($level:expr) => {
            tracing::event!(
                parent: span,
                $level,
                status = status.as_u16(),
                latency,
                user_agent,
                handler_errors,
                "request completed"
            )
        };
    }

    match Severity::for_status(status) {
        Severity::Error => completed!(Level::ERROR),
        Severity::Warn => completed!(Level::WARN),
        Severity::Info | Severity::Debug => completed!(Level::INFO),
    }
}

#![allow(dead_code)]

use std::net::SocketAddr;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::extract::{ConnectInfo, Path};
use axum::http::{Request, Response, StatusCode};
use axum::routing::get;
use request_logger::prelude::*;
use serde_json::Value;
use tower::ServiceExt;

pub use request_logger::logging::testing::Capture;

pub const SERVICE: &str = "test-service";

pub trait CaptureExt {
    /// The single `request completed` record.
    fn completion(&self) -> Value;
}

impl CaptureExt for Capture {
    fn completion(&self) -> Value {
        let mut records = self.with_msg("request completed");
        assert_eq!(records.len(), 1, "expected exactly one completion record");
        records.remove(0)
    }
}

pub fn create_test_state(level: Severity, behind_proxy: bool) -> (AppState, Capture) {
    let capture = Capture::default();
    let logging = LogProvider::with_writer(SERVICE, level, capture.clone());
    (AppState::new(logging, behind_proxy), capture)
}

async fn status_handler(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap()
}

async fn panic_handler() -> &'static str {
    panic!("boom");
}

async fn fail_handler() -> Result<&'static str, AppError> {
    Err(AppError::internal("database unavailable"))
}

async fn control_char_handler() -> Result<&'static str, AppError> {
    Err(AppError::internal("bad byte \u{0} in row \u{200b}"))
}

#[inline(never)]
fn corrupt_ledger_entry(entry: usize) -> usize {
    if entry > 0 {
        panic!("ledger entry {entry} is corrupt");
    }
    entry
}

async fn nested_panic_handler() -> String {
    corrupt_ledger_entry(std::hint::black_box(7)).to_string()
}

async fn work_handler(ReqLogger(log): ReqLogger) -> String {
    log.info("doing work");
    tracing::warn!(step = 2, "plain macro inside handler");
    current_req_id().map(|id| id.into_inner()).unwrap_or_default()
}

async fn context_handler(ctx: Option<RequestContext>) -> String {
    ctx.map(|c| c.req_id().to_string()).unwrap_or_default()
}

/// Test routes exercising every completion path.
pub fn test_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(request_logger::api::handlers::health_handler))
        .route("/status/{code}", get(status_handler))
        .route("/panic", get(panic_handler))
        .route("/fail", get(fail_handler))
        .route("/fail/control", get(control_char_handler))
        .route("/panic/nested", get(nested_panic_handler))
        .route("/work", get(work_handler))
        .route("/context", get(context_handler))
}

pub fn test_app(state: AppState) -> Router {
    with_request_logging(test_routes(), state)
}

pub fn get_request(uri: &str) -> axum::http::request::Builder {
    Request::builder().uri(uri).method("GET")
}

pub fn peer() -> ConnectInfo<SocketAddr> {
    ConnectInfo("192.0.2.10:40000".parse().unwrap())
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn is_uuid_v4(id: &str) -> bool {
    let bytes = id.as_bytes();
    uuid_shape(id) && bytes[14] == b'4' && matches!(bytes[19], b'8' | b'9' | b'a' | b'b')
}

fn uuid_shape(id: &str) -> bool {
    id.len() == 36
        && id.char_indices().all(|(i, c)| match i {
            8 | 13 | 18 | 23 => c == '-',
            _ => c.is_ascii_hexdigit() && !c.is_ascii_uppercase(),
        })
}

mod common;

use axum::body::Body;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Router, middleware};
use common::*;
use request_logger::api::middleware::recovery;
use request_logger::logging::{LogProvider, Severity};

#[tokio::test]
async fn test_panic_becomes_internal_server_error() {
    let (state, capture) = create_test_state(Severity::Info, false);

    let request = get_request("/panic")
        .header("x-request-id", "crash-1")
        .body(Body::empty())
        .unwrap();
    let response = send(test_app(state), request).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.headers()["x-request-id"], "crash-1");
    assert_eq!(
        body_string(response).await,
        r#"{"message":"internal server error"}"#
    );

    let panics: Vec<_> = capture
        .records()
        .into_iter()
        .filter(|r| r["panic"] == "boom")
        .collect();
    assert_eq!(panics.len(), 1);

    let record = &panics[0];
    assert_eq!(record["level"], "ERROR");
    assert_eq!(record["msg"], "panic recovered");
    assert_eq!(record["path"], "/panic");
    assert_eq!(record["req_id"], "crash-1");
    assert!(!record["stack"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_recovered_panic_still_logs_completion() {
    let (state, capture) = create_test_state(Severity::Info, false);

    let request = get_request("/panic")
        .header("x-request-id", "crash-2")
        .body(Body::empty())
        .unwrap();
    send(test_app(state), request).await;

    let record = capture.completion();
    assert_eq!(record["level"], "ERROR");
    assert_eq!(record["status"], 500);
    assert_eq!(record["req_id"], "crash-2");
    assert!(record.get("panic").is_none());
}

#[tokio::test]
async fn test_no_panic_is_pass_through() {
    let (state, capture) = create_test_state(Severity::Info, false);

    let request = get_request("/status/204").body(Body::empty()).unwrap();
    let response = send(test_app(state), request).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(capture.with_msg("panic recovered").is_empty());
}

#[tokio::test]
async fn test_server_keeps_serving_after_panic() {
    let (state, _capture) = create_test_state(Severity::Info, false);
    let app = test_app(state);

    let crash = get_request("/panic").body(Body::empty()).unwrap();
    assert_eq!(
        send(app.clone(), crash).await.status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );

    let ok = get_request("/health").body(Body::empty()).unwrap();
    assert_eq!(send(app, ok).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_recovery_without_request_logger_uses_current_logger() {
    let capture = Capture::default();
    let provider = LogProvider::with_writer(SERVICE, Severity::Info, capture.clone());

    let app = Router::new()
        .route(
            "/explode",
            get(|| async {
                let reason = String::from("owned payload");
                if !reason.is_empty() {
                    panic!("{reason}");
                }
                "unreachable"
            }),
        )
        .layer(middleware::from_fn(recovery::layer));

    let request = get_request("/explode").body(Body::empty()).unwrap();
    let response = provider.scope(send(app, request)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let records = capture.with_msg("panic recovered");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["panic"], "owned payload");
    assert_eq!(records[0]["service"], SERVICE);
    assert_eq!(records[0]["path"], "/explode");
    assert!(records[0].get("req_id").is_none());
}

#[tokio::test]
async fn test_panic_stack_points_at_panicking_frame() {
    let (state, capture) = create_test_state(Severity::Info, false);

    let request = get_request("/panic/nested").body(Body::empty()).unwrap();
    let response = send(test_app(state), request).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let records = capture.with_msg("panic recovered");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["panic"], "ledger entry 7 is corrupt");

    let stack = records[0]["stack"].as_str().unwrap();
    assert!(stack.contains("corrupt_ledger_entry"), "{stack}");
}

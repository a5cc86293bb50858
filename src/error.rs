//! Error types for logger setup and HTTP handlers.
//!
//! [`LogError`] covers logger configuration failures. [`AppError`] is the
//! handler-facing error: it renders a `{"message": ...}` JSON body and reports
//! its detail to the request logger through [`HandlerErrors`], so internal
//! causes reach the completion record without leaking to clients.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Message returned to clients for every internal failure.
pub const INTERNAL_SERVER_ERROR_MESSAGE: &str = "internal server error";

/// Errors raised while configuring the logger.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("invalid log level '{0}' (expected debug, info, warn or error)")]
    InvalidLevel(String),

    #[error("failed to install global logger: {0}")]
    Install(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("failed to reload global logger: {0}")]
    Reload(#[from] tracing_subscriber::reload::Error),

    #[error("global logger state is poisoned")]
    Poisoned,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
}

/// Errors returned by request handlers.
#[derive(Debug)]
pub enum AppError {
    Validation { message: String },
    NotFound { message: String },
    /// `detail` goes to the logs only; clients see a generic message.
    Internal { detail: String },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Validation { message } | AppError::NotFound { message } => {
                f.write_str(message)
            }
            AppError::Internal { detail } => f.write_str(detail),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let detail = self.to_string();
        let (status, message) = match &self {
            AppError::Validation { message } => (StatusCode::BAD_REQUEST, message.as_str()),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message.as_str()),
            AppError::Internal { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                INTERNAL_SERVER_ERROR_MESSAGE,
            ),
        };

        let mut response = (status, Json(ErrorBody { message })).into_response();
        HandlerErrors::record(&mut response, detail);
        response
    }
}

/// The fixed 500 response: `{"message":"internal server error"}`.
pub fn internal_server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            message: INTERNAL_SERVER_ERROR_MESSAGE,
        }),
    )
        .into_response()
}

/// Errors reported by handlers while producing a response.
///
/// Carried as a response extension; the request logging middleware lists
/// them as `handler_errors` on the completion record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerErrors(Vec<String>);

impl HandlerErrors {
    pub fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    pub fn messages(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Appends `message` to the errors already attached to `response`.
    pub fn record(response: &mut Response, message: impl Into<String>) {
        let extensions = response.extensions_mut();
        match extensions.get_mut::<HandlerErrors>() {
            Some(errors) => errors.push(message),
            None => {
                let mut errors = HandlerErrors::default();
                errors.push(message);
                extensions.insert(errors);
            }
        }
    }
}

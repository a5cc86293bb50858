//! Request-scoped logging context.
//!
//! The request middleware creates one [`RequestContext`] per request and
//! makes it available two ways:
//!
//! - as a request extension, for handlers and inner middleware
//!   ([`from_extensions`], the [`ReqLogger`] and [`RequestContext`] extractors);
//! - as a task-local scope around the downstream future, for code that only
//!   has the task ([`current`], [`current_req_id`], [`from_current`]).
//!
//! Lookups never fail: without a context they fall back to the base logger.

use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::Extensions;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::logging::Logger;
use crate::utils::request_id::new_req_id;

/// Identifier correlating all records of one request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh random (UUID v4) identifier.
    pub fn generate() -> Self {
        Self(new_req_id())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-request logging state: identifier, scoped logger and start time.
#[derive(Debug, Clone)]
pub struct RequestContext {
    req_id: RequestId,
    logger: Logger,
    start_time: Instant,
}

tokio::task_local! {
    static CURRENT: RequestContext;
}

impl RequestContext {
    pub fn new(req_id: RequestId, logger: Logger, start_time: Instant) -> Self {
        Self {
            req_id,
            logger,
            start_time,
        }
    }

    pub fn req_id(&self) -> &RequestId {
        &self.req_id
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn start_time(&self) -> Instant {
        self.start_time
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Runs `fut` with this context as the task's current request.
    pub async fn scope<F: Future>(self, fut: F) -> F::Output {
        CURRENT.scope(self, fut).await
    }
}

/// The request context bound to the current task, if any.
pub fn current() -> Option<RequestContext> {
    CURRENT.try_with(Clone::clone).ok()
}

/// The identifier of the request bound to the current task, if any.
pub fn current_req_id() -> Option<RequestId> {
    CURRENT.try_with(|ctx| ctx.req_id.clone()).ok()
}

/// The logger of the request bound to the current task, or the base logger
/// for `service`.
pub fn from_current(service: &str) -> Logger {
    current()
        .map(|ctx| ctx.logger)
        .unwrap_or_else(|| Logger::for_service(service))
}

/// The logger stored in `extensions` by the request middleware, or the base
/// logger for `service`.
pub fn from_extensions(extensions: &Extensions, service: &str) -> Logger {
    extensions
        .get::<RequestContext>()
        .map(|ctx| ctx.logger.clone())
        .unwrap_or_else(|| Logger::for_service(service))
}

/// Context lookup without a service fallback: extensions, then the task
/// scope, then whatever span is current.
pub(crate) fn scoped_logger(extensions: &Extensions) -> Logger {
    extensions
        .get::<RequestContext>()
        .map(|ctx| ctx.logger.clone())
        .or_else(|| current().map(|ctx| ctx.logger))
        .unwrap_or_else(Logger::current)
}

/// Extracts the request-scoped logger. Never rejects.
///
/// ```rust,ignore
/// async fn handler(ReqLogger(log): ReqLogger) -> &'static str {
///     log.info("handling");
///     "ok"
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ReqLogger(pub Logger);

impl<S> FromRequestParts<S> for ReqLogger
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ReqLogger(scoped_logger(&parts.extensions)))
    }
}

/// Rejects with a 500 when the request middleware is not installed; use
/// `Option<RequestContext>` to handle that case.
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or_else(|| AppError::internal("request context missing"))
    }
}

impl<S> OptionalFromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<RequestContext>().cloned())
    }
}

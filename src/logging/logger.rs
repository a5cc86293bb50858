//! Logger handles.

use tracing::Span;

use super::level::Severity;

/// A structured logger handle.
///
/// Wraps a [`tracing::Span`]: the span's fields are the logger's attributes
/// and every record emitted through the handle carries them. Deriving a
/// logger creates a child span, so the parent handle is never modified.
/// Cloning is cheap.
#[derive(Debug, Clone)]
pub struct Logger {
    span: Span,
}

impl Logger {
    /// Base logger carrying a `service` attribute.
    ///
    /// The span is a root span created under the current dispatcher.
    pub fn for_service(service: &str) -> Self {
        Self {
            span: tracing::info_span!(parent: None, "service", service = %service),
        }
    }

    /// Logger bound to the currently entered span.
    pub fn current() -> Self {
        Self {
            span: Span::current(),
        }
    }

    pub fn from_span(span: Span) -> Self {
        Self { span }
    }

    /// Derives a logger with a `req_id` attribute.
    pub fn with_req_id(&self, req_id: &str) -> Self {
        Self {
            span: tracing::info_span!(parent: &self.span, "req", req_id = %req_id),
        }
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Runs `f` with the logger's span entered, so plain `tracing` macros
    /// inside it carry the logger's attributes.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        self.span.in_scope(f)
    }

    pub fn log(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Debug => tracing::debug!(parent: &self.span, "{message}"),
            Severity::Info => tracing::info!(parent: &self.span, "{message}"),
            Severity::Warn => tracing::warn!(parent: &self.span, "{message}"),
            Severity::Error => tracing::error!(parent: &self.span, "{message}"),
        }
    }

    pub fn debug(&self, message: &str) {
        self.log(Severity::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(Severity::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(Severity::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.log(Severity::Error, message);
    }
}

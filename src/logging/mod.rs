//! Structured JSON logging.
//!
//! - [`level`] - Severity levels and the status-code rule
//! - [`layer`] - `tracing-subscriber` layer rendering JSON lines
//! - [`logger`] - Derivable logger handles
//! - [`provider`] - Injectable providers and the global configuration
//!
//! # Usage
//!
//! ```rust,ignore
//! use request_logger::logging::{self, Severity};
//!
//! logging::init("billing", Severity::Info)?;
//!
//! let log = logging::default("billing");
//! log.info("worker started");
//! ```

pub mod layer;
pub mod level;
pub mod logger;
pub mod provider;

#[doc(hidden)]
pub mod testing;

pub use layer::JsonLayer;
pub use level::Severity;
pub use logger::Logger;
pub use provider::LogProvider;

use crate::error::LogError;

/// Configures the process-wide logger: JSON lines on stdout, events below
/// `min_level` dropped, source locations only at debug.
///
/// Call once during startup, before serving traffic. Calling again replaces
/// the configuration.
///
/// # Errors
///
/// See [`LogProvider::install`].
pub fn init(service: &str, min_level: Severity) -> Result<(), LogError> {
    LogProvider::new(service, min_level).install()
}

/// The base logger for `service`, for code running outside a request.
pub fn default(service: &str) -> Logger {
    Logger::for_service(service)
}

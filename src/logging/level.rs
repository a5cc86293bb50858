//! Severity levels and the status-code to severity rule.

use std::fmt;
use std::str::FromStr;

use axum::http::StatusCode;
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;

use crate::error::LogError;

/// Ordinal severity of a log record: `Debug < Info < Warn < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl Severity {
    /// Severity of the completion record for a response status.
    ///
    /// - `>= 500` → [`Severity::Error`]
    /// - `400..=499` → [`Severity::Warn`]
    /// - anything else → [`Severity::Info`]
    pub fn for_status(status: StatusCode) -> Self {
        match status.as_u16() {
            500.. => Severity::Error,
            400..=499 => Severity::Warn,
            _ => Severity::Info,
        }
    }

    /// Source locations are captured only at debug verbosity.
    pub fn captures_source(self) -> bool {
        self <= Severity::Debug
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
        }
    }
}

impl From<Severity> for Level {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Debug => Level::DEBUG,
            Severity::Info => Level::INFO,
            Severity::Warn => Level::WARN,
            Severity::Error => Level::ERROR,
        }
    }
}

impl From<Severity> for LevelFilter {
    fn from(severity: Severity) -> Self {
        LevelFilter::from_level(severity.into())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = LogError;

    /// Parses `debug`, `info`, `warn` (or `warning`) and `error`, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warn" | "warning" => Ok(Severity::Warn),
            "error" => Ok(Severity::Error),
            _ => Err(LogError::InvalidLevel(s.to_string())),
        }
    }
}

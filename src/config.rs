//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before the server starts.
//!
//! ```bash
//! export SERVICE_NAME="billing"
//! export LOG_LEVEL="debug"
//! export LISTEN="127.0.0.1:8080"
//! export BEHIND_PROXY="true"
//! ```
//!
//! ## Optional Variables
//!
//! - `SERVICE_NAME` - `service` attribute of every record (default: crate name)
//! - `LOG_LEVEL` - Minimum severity: `debug`, `info`, `warn`, `error` (default: `info`)
//! - `LISTEN` - Bind address (default: `0.0.0.0:3000`)
//! - `BEHIND_PROXY` - Trust `X-Forwarded-For` / `X-Real-IP` for client IPs (default: `false`)
//!
//! Command-line flags of the binary override these values.

use anyhow::{Context, Result};
use std::env;

use crate::logging::Severity;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub service_name: String,
    pub log_level: Severity,
    pub listen_addr: String,
    /// When true, client IPs are read from X-Forwarded-For / X-Real-IP headers.
    /// Enable only when the service is behind a trusted reverse proxy.
    pub behind_proxy: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `LOG_LEVEL` is not a known severity.
    pub fn from_env() -> Result<Self> {
        let service_name =
            env::var("SERVICE_NAME").unwrap_or_else(|_| env!("CARGO_PKG_NAME").to_string());

        let log_level = match env::var("LOG_LEVEL") {
            Ok(level) => level.parse().context("Failed to parse LOG_LEVEL")?,
            Err(_) => Severity::Info,
        };

        let listen_addr = env::var("LISTEN").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let behind_proxy = env::var("BEHIND_PROXY")
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);

        Ok(Self {
            service_name,
            log_level,
            listen_addr,
            behind_proxy,
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `service_name` is empty
    /// - `listen_addr` is not in `host:port` form
    pub fn validate(&self) -> Result<()> {
        if self.service_name.trim().is_empty() {
            anyhow::bail!("SERVICE_NAME must not be empty");
        }

        let port = self
            .listen_addr
            .rsplit_once(':')
            .map(|(_, port)| port)
            .unwrap_or_default();
        if port.parse::<u16>().is_err() {
            anyhow::bail!(
                "LISTEN must be in format 'host:port', got '{}'",
                self.listen_addr
            );
        }

        Ok(())
    }

    /// Logs a configuration summary.
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Service: {}", self.service_name);
        tracing::info!("  Listen address: {}", self.listen_addr);
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Behind proxy: {}", self.behind_proxy);
    }
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if a variable is malformed or validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn config() -> Config {
        Config {
            service_name: "billing".to_string(),
            log_level: Severity::Info,
            listen_addr: "0.0.0.0:3000".to_string(),
            behind_proxy: false,
        }
    }

    fn clear_env() {
        // SAFETY: Tests touching the environment are run serially
        unsafe {
            env::remove_var("SERVICE_NAME");
            env::remove_var("LOG_LEVEL");
            env::remove_var("LISTEN");
            env::remove_var("BEHIND_PROXY");
        }
    }

    #[test]
    fn test_config_validation() {
        let mut config = config();
        assert!(config.validate().is_ok());

        config.service_name = "  ".to_string();
        assert!(config.validate().is_err());

        config.service_name = "billing".to_string();

        config.listen_addr = "3000".to_string();
        assert!(config.validate().is_err());

        config.listen_addr = "localhost:http".to_string();
        assert!(config.validate().is_err());

        config.listen_addr = "[::1]:8080".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();

        let config = Config::from_env().unwrap();

        assert_eq!(config.service_name, env!("CARGO_PKG_NAME"));
        assert_eq!(config.log_level, Severity::Info);
        assert_eq!(config.listen_addr, "0.0.0.0:3000");
        assert!(!config.behind_proxy);
    }

    #[test]
    #[serial]
    fn test_from_env_values() {
        clear_env();
        // SAFETY: Tests are run serially due to #[serial], so no concurrent access
        unsafe {
            env::set_var("SERVICE_NAME", "billing");
            env::set_var("LOG_LEVEL", "DEBUG");
            env::set_var("LISTEN", "127.0.0.1:8080");
            env::set_var("BEHIND_PROXY", "1");
        }

        let config = load_from_env().unwrap();

        assert_eq!(config.service_name, "billing");
        assert_eq!(config.log_level, Severity::Debug);
        assert_eq!(config.listen_addr, "127.0.0.1:8080");
        assert!(config.behind_proxy);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_level() {
        clear_env();
        // SAFETY: Tests are run serially
        unsafe {
            env::set_var("LOG_LEVEL", "chatty");
        }

        let err = Config::from_env().unwrap_err();
        assert!(format!("{err:#}").contains("chatty"));

        clear_env();
    }
}

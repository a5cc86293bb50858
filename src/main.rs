//! Demo service wiring request-scoped logging into an Axum server.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- --listen 127.0.0.1:8080 --log-level debug
//! curl -H 'X-Request-ID: abc-123' http://127.0.0.1:8080/health
//! ```

use anyhow::Result;
use clap::Parser;
use request_logger::config;
use request_logger::logging::Severity;
use request_logger::server;

/// Request-scoped JSON logging demo server.
#[derive(Parser)]
#[command(name = "request-logger")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Bind address, overrides LISTEN
    #[arg(long)]
    listen: Option<String>,

    /// Minimum log level (debug, info, warn, error), overrides LOG_LEVEL
    #[arg(long)]
    log_level: Option<Severity>,

    /// Service name attached to every record, overrides SERVICE_NAME
    #[arg(long)]
    service_name: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = config::Config::from_env()?;
    if let Some(listen) = cli.listen {
        config.listen_addr = listen;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(service_name) = cli.service_name {
        config.service_name = service_name;
    }
    config.validate()?;

    server::run(config).await
}

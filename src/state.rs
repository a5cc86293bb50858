use crate::logging::LogProvider;

/// State shared by the logging middleware and handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub logging: LogProvider,
    /// When true, the client IP is read from `X-Forwarded-For` / `X-Real-IP`.
    /// Enable only behind a trusted reverse proxy.
    pub behind_proxy: bool,
}

impl AppState {
    pub fn new(logging: LogProvider, behind_proxy: bool) -> Self {
        Self {
            logging,
            behind_proxy,
        }
    }
}

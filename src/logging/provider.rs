//! Logger providers and the process-wide logger configuration.

use std::fmt;
use std::future::Future;
use std::sync::Mutex;

use tracing::Dispatch;
use tracing::instrument::{WithDispatch, WithSubscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::{Registry, reload};

use super::layer::JsonLayer;
use super::level::Severity;
use crate::error::LogError;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Reload handle of the installed global configuration.
static GLOBAL: Mutex<Option<reload::Handle<BoxedLayer, Registry>>> = Mutex::new(None);

/// An explicitly constructed logging configuration.
///
/// A provider owns its own `tracing` dispatcher writing JSON lines for one
/// service. Pass it to the request middleware (see
/// [`AppState`](crate::state::AppState)) and everything logged while a request
/// is handled goes through it. [`install`](LogProvider::install) additionally
/// makes it the process-wide configuration.
#[derive(Clone)]
pub struct LogProvider {
    level: Severity,
    layer: JsonLayer,
    dispatch: Dispatch,
}

impl LogProvider {
    /// Provider writing to standard output.
    pub fn new(service: impl Into<String>, level: Severity) -> Self {
        Self::with_writer(service, level, std::io::stdout)
    }

    /// Provider writing to `make_writer`.
    pub fn with_writer<W>(service: impl Into<String>, level: Severity, make_writer: W) -> Self
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        let layer = JsonLayer::new(service, level, make_writer);
        let dispatch = Dispatch::new(Registry::default().with(layer.clone()));

        Self {
            level,
            layer,
            dispatch,
        }
    }

    pub fn service(&self) -> &str {
        self.layer.service()
    }

    pub fn level(&self) -> Severity {
        self.level
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Runs `fut` with this provider as the current dispatcher.
    pub fn scope<F: Future>(&self, fut: F) -> WithDispatch<F> {
        fut.with_subscriber(self.dispatch.clone())
    }

    /// Runs `f` with this provider as the current dispatcher.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Makes this provider's configuration the process-wide default.
    ///
    /// The first call installs a global subscriber; later calls replace its
    /// configuration (last writer wins). Call during single-threaded startup.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Install`] if a global subscriber not managed by
    /// this crate is already installed.
    pub fn install(&self) -> Result<(), LogError> {
        let mut global = GLOBAL.lock().map_err(|_| LogError::Poisoned)?;
        let layer: BoxedLayer = Box::new(self.layer.clone());

        match global.as_ref() {
            Some(handle) => handle.reload(layer)?,
            None => {
                let (layer, handle) = reload::Layer::new(layer);
                tracing::subscriber::set_global_default(Registry::default().with(layer))?;
                *global = Some(handle);
            }
        }

        Ok(())
    }
}

impl fmt::Debug for LogProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogProvider")
            .field("service", &self.service())
            .field("level", &self.level)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::testing::Capture;

    #[test]
    fn test_accessors() {
        let provider = LogProvider::with_writer("orders", Severity::Warn, Capture::default());

        assert_eq!(provider.service(), "orders");
        assert_eq!(provider.level(), Severity::Warn);
    }

    #[test]
    fn test_in_scope_routes_to_provider() {
        let capture = Capture::default();
        let provider = LogProvider::with_writer("orders", Severity::Info, capture.clone());

        provider.in_scope(|| tracing::info!(order = 7, "placed"));
        tracing::info!("outside any provider");

        let records = capture.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["service"], "orders");
        assert_eq!(records[0]["order"], 7);
    }

    #[tokio::test]
    async fn test_scope_follows_the_future() {
        let capture = Capture::default();
        let provider = LogProvider::with_writer("orders", Severity::Info, capture.clone());

        provider
            .scope(async {
                tracing::info!("before yield");
                tokio::task::yield_now().await;
                tracing::info!("after yield");
            })
            .await;

        assert_eq!(capture.records().len(), 2);
    }

    #[test]
    fn test_providers_are_isolated() {
        let debug_sink = Capture::default();
        let error_sink = Capture::default();
        let debug = LogProvider::with_writer("a", Severity::Debug, debug_sink.clone());
        let error = LogProvider::with_writer("b", Severity::Error, error_sink.clone());

        debug.in_scope(|| tracing::info!("to a"));
        error.in_scope(|| tracing::info!("dropped by b"));

        assert_eq!(debug_sink.records().len(), 1);
        assert!(debug_sink.records()[0].get("source").is_some());
        assert!(error_sink.records().is_empty());
    }
}

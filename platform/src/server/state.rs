//! Application state shared by every handler.

use crate::app::Platform;
use crate::identity::IdentityProvider;
use std::sync::Arc;
use webnovel_runtime::metrics::MetricsServer;

/// Shared handler state.
///
/// Cloned per request; every field is reference counted.
pub struct AppState<D> {
    /// Command facade
    pub platform: Platform<D>,

    /// Token introspection and refresh
    pub identity: Arc<dyn IdentityProvider>,

    /// Prometheus recorder, when installed
    pub metrics: Option<Arc<MetricsServer>>,
}

impl<D> Clone for AppState<D> {
    fn clone(&self) -> Self {
        Self {
            platform: self.platform.clone(),
            identity: Arc::clone(&self.identity),
            metrics: self.metrics.clone(),
        }
    }
}

impl<D> AppState<D> {
    /// State without a metrics recorder.
    #[must_use]
    pub fn new(platform: Platform<D>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            platform,
            identity,
            metrics: None,
        }
    }

    /// Attach the Prometheus recorder rendered by `/metrics`.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<MetricsServer>) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

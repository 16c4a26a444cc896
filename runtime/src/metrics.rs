//! Prometheus metrics for observability and monitoring.
//!
//! The store and bindings record through the `metrics` facade. Nothing is
//! collected until a recorder is installed; [`MetricsRecorder`] installs an
//! in-process Prometheus recorder whose output can be rendered on demand.
//!
//! Recorded metrics:
//! - `store_dispatch_total`, `store_state_changes_total`
//! - `store_listener_notifications_total`, `store_listener_panics_total`
//! - `store_malformed_actions_total`
//! - `store_subscriptions` (gauge)
//! - `store_dispatch_duration_seconds` (histogram)
//! - `selector_updates_total`, `selector_suppressed_total`
//!
//! # Example
//!
//! ```rust,no_run
//! use haven_runtime::metrics::MetricsRecorder;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut recorder = MetricsRecorder::new();
//! recorder.install()?;
//!
//! // ... dispatch some actions ...
//!
//! if let Some(text) = recorder.render() {
//!     println!("{text}");
//! }
//! # Ok(())
//! # }
//! ```

use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use thiserror::Error;

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// In-process Prometheus recorder.
#[derive(Default)]
pub struct MetricsRecorder {
    handle: Option<PrometheusHandle>,
}

impl MetricsRecorder {
    /// Create a recorder that has not been installed yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { handle: None }
    }

    /// Register metric descriptions and install the global recorder.
    ///
    /// # Errors
    ///
    /// Returns error if the exporter cannot be built or installed.
    ///
    /// # Note
    ///
    /// Only one global recorder can exist per process. If one is already
    /// installed (e.g. another test installed it) this logs a warning and
    /// returns `Ok` without a handle.
    pub fn install(&mut self) -> Result<(), MetricsError> {
        register_metrics();

        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[
                    0.000_001, 0.000_005, 0.000_01, 0.000_05, 0.000_1, 0.000_5, 0.001, 0.005, 0.01,
                ],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        match builder.install_recorder() {
            Ok(handle) => {
                self.handle = Some(handle);
                tracing::info!("Prometheus recorder installed");
                Ok(())
            },
            Err(e) => {
                let err_msg = e.to_string();
                if err_msg.contains("already initialized") {
                    tracing::warn!("Metrics recorder already initialized, skipping re-initialization");
                    Ok(())
                } else {
                    Err(MetricsError::Install(err_msg))
                }
            },
        }
    }

    /// Get the Prometheus handle, if installed.
    #[must_use]
    pub const fn handle(&self) -> Option<&PrometheusHandle> {
        self.handle.as_ref()
    }

    /// Render current metrics in Prometheus text format.
    ///
    /// Returns `None` if the recorder hasn't been installed.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

impl std::fmt::Debug for MetricsRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsRecorder")
            .field("installed", &self.handle.is_some())
            .finish()
    }
}

/// Register all metric descriptions.
fn register_metrics() {
    // Store
    describe_counter!("store_dispatch_total", "Total number of dispatched actions");
    describe_counter!(
        "store_state_changes_total",
        "Dispatches that replaced the state reference"
    );
    describe_counter!(
        "store_listener_notifications_total",
        "Listener invocations across all notification rounds"
    );
    describe_counter!(
        "store_listener_panics_total",
        "Listener panics caught while listener isolation is enabled"
    );
    describe_counter!(
        "store_malformed_actions_total",
        "Encoded actions that could not be decoded"
    );
    describe_gauge!("store_subscriptions", "Currently registered listeners");
    describe_histogram!(
        "store_dispatch_duration_seconds",
        "Time spent reducing and notifying per dispatch"
    );

    // Bindings
    describe_counter!(
        "selector_updates_total",
        "Selector re-derivations that produced a new value"
    );
    describe_counter!(
        "selector_suppressed_total",
        "Selector re-derivations suppressed because the value was unchanged"
    );
}

//! Global subscriber setup
//!
//! # Example
//!
//! ```no_run
//! use zipkin_exporter::config::Metadata;
//! use zipkin_exporter::exporter::{Exporter, ZipkinExporter};
//! use zipkin_exporter::registry::ExporterRegistry;
//! use zipkin_exporter::telemetry::init_subscriber;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = ExporterRegistry::new();
//! let _guard = init_subscriber(&registry, "svc-a")?;
//!
//! let mut exporter = ZipkinExporter::new(registry.clone());
//! exporter.init("svc-a", "10.0.0.5", &Metadata::from_json(
//!     r#"{"exporterAddress": "http://localhost:9411/api/v2/spans", "enabled": "true"}"#,
//! )?)?;
//!
//! tracing::info_span!("request").in_scope(|| {
//!     // exported to Zipkin
//! });
//! # Ok(())
//! # }
//! ```

use crate::registry::ExporterRegistry;
use opentelemetry::global;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::TracerProvider;
use thiserror::Error;
use tracing::warn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

/// Errors that can occur while installing the subscriber
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Global subscriber already initialized: {0}")]
    AlreadyInitialized(String),

    #[error("Tracer provider error: {0}")]
    Provider(String),
}

/// RAII guard for the installed tracer provider.
///
/// Flushes pending spans to the registered exporters when dropped.
#[derive(Debug)]
pub struct TelemetryGuard {
    provider: Option<TracerProvider>,
}

impl TelemetryGuard {
    fn new(provider: TracerProvider) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    /// Flush pending spans now
    pub fn flush(&self) -> Result<(), TelemetryError> {
        if let Some(provider) = &self.provider {
            for result in provider.force_flush() {
                result.map_err(|e| TelemetryError::Provider(e.to_string()))?;
            }
        }
        Ok(())
    }

    /// Flush and release the provider
    pub fn shutdown(mut self) -> Result<(), TelemetryError> {
        let result = self.flush();
        self.provider = None;
        global::shutdown_tracer_provider();
        result
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            flush_on_teardown(&provider);
            global::shutdown_tracer_provider();
        }
    }
}

/// Flush without a caller to report to, returns the number of failures
fn flush_on_teardown(provider: &TracerProvider) -> usize {
    let mut failures = 0;
    for result in provider.force_flush() {
        if let Err(e) = result {
            warn!(error = %e, "Failed to flush spans during teardown");
            failures += 1;
        }
    }
    failures
}

/// Install a global subscriber exporting spans through `registry`.
///
/// Log levels come from `RUST_LOG` and default to `info`. The registry's
/// tracer provider also becomes the global OpenTelemetry provider.
pub fn init_subscriber(
    registry: &ExporterRegistry,
    service_name: &str,
) -> Result<TelemetryGuard, TelemetryError> {
    let provider = registry.tracer_provider();
    let tracer = provider.tracer(service_name.to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true);

    let subscriber = tracing_subscriber::registry()
        .with(tracing_opentelemetry::layer().with_tracer(tracer))
        .with(env_filter)
        .with(fmt_layer);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;

    global::set_tracer_provider(provider.clone());

    Ok(TelemetryGuard::new(provider))
}

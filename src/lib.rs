//! Zipkin Exporter Library
//!
//! Metadata-driven trace exporter that forwards spans to a Zipkin collector.
//!
//! # Features
//!
//! - **Metadata Driven**: Configured from a `{"exporterAddress", "enabled"}` property mapping
//! - **Explicit Registry**: Exporters register with an [`ExporterRegistry`] passed in at construction
//! - **OpenTelemetry**: Registries plug into an `opentelemetry_sdk` tracer provider
//! - **Component Files**: YAML component definitions with `${VAR}` expansion
//!
//! # Example
//!
//! ```no_run
//! use zipkin_exporter::config::Metadata;
//! use zipkin_exporter::exporter::{Exporter, ZipkinExporter};
//! use zipkin_exporter::registry::ExporterRegistry;
//!
//! fn main() -> anyhow::Result<()> {
//!     let registry = ExporterRegistry::new();
//!     let metadata = Metadata::from_json(
//!         r#"{"exporterAddress": "http://localhost:9411/api/v2/spans", "enabled": "true"}"#,
//!     )?;
//!
//!     let mut exporter = ZipkinExporter::new(registry.clone());
//!     exporter.init("svc-a", "10.0.0.5", &metadata)?;
//!
//!     let _provider = registry.tracer_provider();
//!     // ...
//!     exporter.unregister();
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod exporter;
pub mod registry;

#[cfg(feature = "telemetry")]
pub mod telemetry;

// Re-export commonly used types
pub use config::{ExporterConfig, Metadata};
pub use exporter::{Exporter, ExporterError, ZipkinExporter};
pub use registry::{ExporterHandle, ExporterRegistry, TraceConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Zipkin exporter
//!
//! Reports spans over HTTP to a Zipkin collector using `opentelemetry-zipkin`.
//!
//! # Example
//!
//! ```no_run
//! use zipkin_exporter::config::Metadata;
//! use zipkin_exporter::exporter::{Exporter, ZipkinExporter};
//! use zipkin_exporter::registry::ExporterRegistry;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = ExporterRegistry::new();
//! let metadata = Metadata::new()
//!     .with_property("exporterAddress", "http://localhost:9411/api/v2/spans")
//!     .with_property("enabled", "true");
//!
//! let mut exporter = ZipkinExporter::new(registry.clone());
//! exporter.init("svc-a", "10.0.0.5", &metadata)?;
//! assert_eq!(registry.len(), 1);
//!
//! exporter.unregister();
//! # Ok(())
//! # }
//! ```

use super::{Exporter, ExporterError, LocalEndpoint};
use crate::config::{ExporterConfig, Metadata};
use crate::registry::{ExporterHandle, ExporterRegistry, TraceConfig};
use tracing::{debug, info};

/// Exporter adapter forwarding spans to a Zipkin collector.
///
/// Holds at most one registration. Calling [`Exporter::init`] again while
/// registered adds a second exporter to the registry and only the newest
/// handle is kept.
#[derive(Debug)]
pub struct ZipkinExporter {
    registry: ExporterRegistry,
    handle: Option<ExporterHandle>,
}

impl ZipkinExporter {
    /// Create an unregistered exporter bound to `registry`
    pub fn new(registry: ExporterRegistry) -> Self {
        Self {
            registry,
            handle: None,
        }
    }

    /// Handle of the current registration, if any
    pub fn handle(&self) -> Option<ExporterHandle> {
        self.handle
    }

    pub fn is_registered(&self) -> bool {
        self.handle
            .map(|handle| self.registry.contains(handle))
            .unwrap_or(false)
    }

    pub fn registry(&self) -> &ExporterRegistry {
        &self.registry
    }
}

impl Default for ZipkinExporter {
    /// Exporter bound to the process-wide registry
    fn default() -> Self {
        Self::new(ExporterRegistry::global().clone())
    }
}

impl Exporter for ZipkinExporter {
    fn init(
        &mut self,
        service_id: &str,
        host_address: &str,
        metadata: &Metadata,
    ) -> Result<(), ExporterError> {
        let config = ExporterConfig::from_metadata(metadata)?;
        if !config.is_enabled() {
            debug!(service_id, "Zipkin exporter disabled");
            return Ok(());
        }

        // Nothing is registered until both endpoint and reporter are built
        let endpoint = LocalEndpoint::new(service_id, host_address)?;
        let reporter = build_reporter(&config, &endpoint)?;

        let handle = self.registry.register(reporter);
        self.registry.apply_config(TraceConfig::always_sample());
        self.handle = Some(handle);

        info!(
            %handle,
            %endpoint,
            address = %config.exporter_address,
            "Zipkin exporter registered"
        );
        Ok(())
    }

    fn unregister(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.registry.unregister(handle);
        }
    }
}

fn build_reporter(
    config: &ExporterConfig,
    endpoint: &LocalEndpoint,
) -> Result<opentelemetry_zipkin::Exporter, ExporterError> {
    let mut pipeline =
        opentelemetry_zipkin::new_pipeline().with_collector_endpoint(config.exporter_address.as_str());

    // Without a name the library falls back to the resource's service name
    if !endpoint.service_name().is_empty() {
        pipeline = pipeline.with_service_name(endpoint.service_name());
    }
    if let Some(address) = endpoint.address() {
        pipeline = pipeline.with_service_address(address);
    }

    pipeline
        .init_exporter()
        .map_err(|e| ExporterError::Reporter(e.to_string()))
}

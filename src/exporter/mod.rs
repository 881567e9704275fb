//! Metadata-driven trace exporters
//!
//! Every exporter is configured from a [`Metadata`] property mapping and
//! registers itself with the [`ExporterRegistry`] it was created with.

use crate::config::{Component, ConfigError, Metadata, EXPORTER_TYPE_PREFIX};
use crate::registry::ExporterRegistry;
use thiserror::Error;

pub mod endpoint;
pub mod zipkin;

pub use endpoint::{EndpointError, LocalEndpoint};
pub use zipkin::ZipkinExporter;

/// Exporter errors
#[derive(Error, Debug)]
pub enum ExporterError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid local endpoint: {0}")]
    Endpoint(#[from] EndpointError),

    #[error("Failed to build reporter: {0}")]
    Reporter(String),

    #[error("Unknown exporter type: {0}")]
    UnknownType(String),
}

/// A trace exporter configured from metadata
pub trait Exporter: Send {
    /// Configure the exporter and, when enabled, register it.
    ///
    /// `service_id` names the reporting service and `host_address` is its
    /// `host[:port]`.
    fn init(
        &mut self,
        service_id: &str,
        host_address: &str,
        metadata: &Metadata,
    ) -> Result<(), ExporterError>;

    /// Remove the exporter from its registry. A no-op if it never registered.
    fn unregister(&mut self);
}

/// Create an exporter by kind (`zipkin` or `exporters.zipkin`)
pub fn new_exporter(
    kind: &str,
    registry: ExporterRegistry,
) -> Result<Box<dyn Exporter>, ExporterError> {
    match kind.strip_prefix(EXPORTER_TYPE_PREFIX).unwrap_or(kind) {
        "zipkin" => Ok(Box::new(ZipkinExporter::new(registry))),
        _ => Err(ExporterError::UnknownType(kind.to_string())),
    }
}

/// Create and initialize the exporter a component describes
pub fn from_component(
    component: &Component,
    service_id: &str,
    host_address: &str,
    registry: ExporterRegistry,
) -> Result<Box<dyn Exporter>, ExporterError> {
    let mut exporter = new_exporter(component.exporter_kind(), registry)?;
    exporter.init(service_id, host_address, &component.to_metadata())?;
    Ok(exporter)
}

//! Trace exporter registry
//!
//! An [`ExporterRegistry`] holds every registered span exporter together with
//! the sampling configuration that applies to them. Adapters receive a
//! registry at construction instead of mutating process-wide state, so tests
//! and independent pipelines can each use their own. A lazily created
//! process-wide instance is still available through [`ExporterRegistry::global`].
//!
//! A registry is turned into an OpenTelemetry pipeline with
//! [`ExporterRegistry::tracer_provider`].

use lazy_static::lazy_static;
use opentelemetry_sdk::export::trace::SpanExporter;
use opentelemetry_sdk::trace::{Sampler, TracerProvider};
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

pub mod processor;

pub use processor::{RegistryProcessor, RegistrySampler};

lazy_static! {
    static ref GLOBAL_REGISTRY: ExporterRegistry = ExporterRegistry::new();
}

/// Handle identifying one registration within a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExporterHandle(u64);

impl fmt::Display for ExporterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "exporter-{}", self.0)
    }
}

/// Sampling configuration applied to spans routed through a registry
#[derive(Debug, Clone)]
pub struct TraceConfig {
    pub default_sampler: Sampler,
}

impl TraceConfig {
    /// Configuration that records every span
    pub fn always_sample() -> Self {
        Self {
            default_sampler: Sampler::AlwaysOn,
        }
    }
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            default_sampler: Sampler::ParentBased(Box::new(Sampler::AlwaysOn)),
        }
    }
}

/// A registered exporter, locked individually while it exports
pub(crate) type SharedExporter = Arc<Mutex<Box<dyn SpanExporter>>>;

struct Inner {
    next_id: AtomicU64,
    exporters: Mutex<BTreeMap<ExporterHandle, SharedExporter>>,
    config: RwLock<TraceConfig>,
}

/// Thread-safe registry of span exporters.
///
/// Cloning is cheap and yields a handle to the same registry.
#[derive(Clone)]
pub struct ExporterRegistry {
    inner: Arc<Inner>,
}

impl ExporterRegistry {
    /// Create an empty registry with the default sampling configuration
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                next_id: AtomicU64::new(1),
                exporters: Mutex::new(BTreeMap::new()),
                config: RwLock::new(TraceConfig::default()),
            }),
        }
    }

    /// The process-wide registry
    pub fn global() -> &'static ExporterRegistry {
        &GLOBAL_REGISTRY
    }

    /// Register an exporter.
    ///
    /// Every call adds a new entry, registering the same kind of exporter
    /// twice yields two entries.
    pub fn register<E>(&self, exporter: E) -> ExporterHandle
    where
        E: SpanExporter + 'static,
    {
        let handle = ExporterHandle(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let mut exporters = self.inner.exporters.lock();
        exporters.insert(handle, Arc::new(Mutex::new(Box::new(exporter))));
        info!(%handle, registered = exporters.len(), "Registered trace exporter");
        handle
    }

    /// Remove an exporter and shut it down.
    ///
    /// Returns `false` if the handle was not registered.
    pub fn unregister(&self, handle: ExporterHandle) -> bool {
        // Shutdown happens outside the lock
        let removed = self.inner.exporters.lock().remove(&handle);
        match removed {
            Some(exporter) => {
                exporter.lock().shutdown();
                info!(%handle, "Unregistered trace exporter");
                true
            }
            None => {
                debug!(%handle, "Exporter not registered, nothing to remove");
                false
            }
        }
    }

    /// Whether the handle is currently registered
    pub fn contains(&self, handle: ExporterHandle) -> bool {
        self.inner.exporters.lock().contains_key(&handle)
    }

    /// Number of registered exporters
    pub fn len(&self) -> usize {
        self.inner.exporters.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Handles of all registered exporters, in registration order
    pub fn handles(&self) -> Vec<ExporterHandle> {
        self.inner.exporters.lock().keys().copied().collect()
    }

    /// Replace the sampling configuration
    pub fn apply_config(&self, config: TraceConfig) {
        debug!(sampler = ?config.default_sampler, "Applying trace config");
        *self.inner.config.write() = config;
    }

    /// Current default sampler
    pub fn sampler(&self) -> Sampler {
        self.inner.config.read().default_sampler.clone()
    }

    /// Build a tracer provider that samples with this registry's config and
    /// exports to every registered exporter.
    pub fn tracer_provider(&self) -> TracerProvider {
        TracerProvider::builder()
            .with_span_processor(RegistryProcessor::new(self.clone()))
            .with_config(
                opentelemetry_sdk::trace::config()
                    .with_sampler(RegistrySampler::new(self.clone())),
            )
            .build()
    }

    /// Registered exporters at this instant. The registry lock is released
    /// before the caller exports through them.
    pub(crate) fn snapshot(&self) -> Vec<(ExporterHandle, SharedExporter)> {
        self.inner
            .exporters
            .lock()
            .iter()
            .map(|(handle, exporter)| (*handle, Arc::clone(exporter)))
            .collect()
    }
}

impl Default for ExporterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ExporterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExporterRegistry")
            .field("handles", &self.handles())
            .field("sampler", &self.sampler())
            .finish()
    }
}

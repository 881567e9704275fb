//! Subscriber wiring for an exporter registry
//!
//! Bridges `tracing` spans into OpenTelemetry so that everything the
//! application instruments ends up in the exporters registered with an
//! [`ExporterRegistry`](crate::registry::ExporterRegistry).
//!
//! # Layer Architecture
//!
//! ```text
//! Registry
//!   ├── OpenTelemetry Layer (tracer from ExporterRegistry::tracer_provider)
//!   ├── EnvFilter (RUST_LOG)
//!   └── Fmt Layer (console output)
//! ```

pub mod subscriber;

pub use subscriber::{init_subscriber, TelemetryError, TelemetryGuard};

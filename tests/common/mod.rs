//! Common Test Infrastructure
//!
//! Provides shared utilities for integration tests:
//! - A span exporter that records what it is handed
//! - Collector address fixtures

#![allow(dead_code)]

use futures::future::BoxFuture;
use opentelemetry_sdk::export::trace::{ExportResult, SpanData, SpanExporter};
use std::sync::{Arc, Mutex};

/// Default collector address used in metadata fixtures
pub const ZIPKIN_ADDRESS: &str = "http://localhost:9411/api/v2/spans";

/// Exporter that keeps every span it is handed
#[derive(Debug, Clone, Default)]
pub struct RecordingExporter {
    spans: Arc<Mutex<Vec<SpanData>>>,
}

impl RecordingExporter {
    /// Names of the recorded spans, in export order
    pub fn span_names(&self) -> Vec<String> {
        self.spans
            .lock()
            .unwrap()
            .iter()
            .map(|span| span.name.to_string())
            .collect()
    }
}

impl SpanExporter for RecordingExporter {
    fn export(&mut self, batch: Vec<SpanData>) -> BoxFuture<'static, ExportResult> {
        self.spans.lock().unwrap().extend(batch);
        Box::pin(std::future::ready(Ok(())))
    }
}

//! OpenTelemetry SDK integration for [`ExporterRegistry`]
//!
//! [`RegistryProcessor`] queues every finished, sampled span to a dedicated
//! export thread, which hands it to each exporter registered at that moment.
//! Ending a span never waits on an exporter or on the registry lock. Spans
//! ended on the export thread itself (by an instrumented exporter) are
//! dropped so exporting cannot feed back into itself.
//!
//! [`RegistrySampler`] reads the registry's sampler on every decision, so
//! `apply_config` affects spans started afterwards.

use super::ExporterRegistry;
use futures::executor::block_on;
use opentelemetry::trace::{Link, SamplingResult, SpanKind, TraceError, TraceId, TraceResult};
use opentelemetry::{Context, KeyValue};
use opentelemetry_sdk::export::trace::SpanData;
use opentelemetry_sdk::trace::{ShouldSample, Span, SpanProcessor};
use parking_lot::Mutex;
use std::sync::mpsc::{self, Receiver, Sender, SyncSender};
use std::thread::{self, JoinHandle, ThreadId};
use tracing::warn;

const EXPORT_THREAD_NAME: &str = "zipkin-exporter-registry";

enum Message {
    Export(SpanData),
    Flush(SyncSender<TraceResult<()>>),
    Shutdown(SyncSender<TraceResult<()>>),
}

/// Span processor exporting to all registered exporters from a background
/// thread
#[derive(Debug)]
pub struct RegistryProcessor {
    sender: Mutex<Sender<Message>>,
    export_thread: ThreadId,
    handle: Option<JoinHandle<()>>,
}

impl RegistryProcessor {
    pub fn new(registry: ExporterRegistry) -> Self {
        let (sender, receiver) = mpsc::channel();
        // Same failure mode as the SDK's SimpleSpanProcessor
        let handle = thread::Builder::new()
            .name(EXPORT_THREAD_NAME.to_string())
            .spawn(move || run(registry, receiver))
            .expect("failed to spawn registry export thread");

        Self {
            sender: Mutex::new(sender),
            export_thread: handle.thread().id(),
            handle: Some(handle),
        }
    }

    fn on_export_thread(&self) -> bool {
        thread::current().id() == self.export_thread
    }

    fn request(
        &self,
        message: impl FnOnce(SyncSender<TraceResult<()>>) -> Message,
    ) -> TraceResult<()> {
        let (reply, response) = mpsc::sync_channel(1);
        self.sender
            .lock()
            .send(message(reply))
            .map_err(|_| TraceError::from("registry export thread has stopped"))?;
        response
            .recv()
            .map_err(|_| TraceError::from("registry export thread has stopped"))?
    }
}

impl SpanProcessor for RegistryProcessor {
    fn on_start(&self, _span: &mut Span, _cx: &Context) {}

    fn on_end(&self, span: SpanData) {
        if !span.span_context.is_sampled() || self.on_export_thread() {
            return;
        }
        // Fails only after shutdown
        let _ = self.sender.lock().send(Message::Export(span));
    }

    fn force_flush(&self) -> TraceResult<()> {
        if self.on_export_thread() {
            return Ok(());
        }
        self.request(Message::Flush)
    }

    fn shutdown(&mut self) -> TraceResult<()> {
        if self.on_export_thread() {
            return Ok(());
        }
        let result = self.request(Message::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        result
    }
}

fn run(registry: ExporterRegistry, messages: Receiver<Message>) {
    for message in messages {
        match message {
            Message::Export(span) => export(&registry, span),
            Message::Flush(reply) => {
                let _ = reply.send(flush(&registry));
            }
            Message::Shutdown(reply) => {
                // Exporters stay owned by the registry and are shut down on unregister
                let _ = reply.send(flush(&registry));
                break;
            }
        }
    }
}

fn export(registry: &ExporterRegistry, span: SpanData) {
    for (handle, exporter) in registry.snapshot() {
        let result = block_on(exporter.lock().export(vec![span.clone()]));
        if let Err(e) = result {
            // Export failures never reach the instrumented code
            warn!(%handle, error = %e, "Failed to export span");
        }
    }
}

fn flush(registry: &ExporterRegistry) -> TraceResult<()> {
    let errors: Vec<String> = registry
        .snapshot()
        .into_iter()
        .filter_map(|(handle, exporter)| {
            block_on(exporter.lock().force_flush())
                .err()
                .map(|e| format!("{handle}: {e}"))
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(TraceError::from(format!(
            "Failed to flush exporters: {}",
            errors.join(", ")
        )))
    }
}

/// Sampler delegating to the registry's current default sampler
#[derive(Debug, Clone)]
pub struct RegistrySampler {
    registry: ExporterRegistry,
}

impl RegistrySampler {
    pub fn new(registry: ExporterRegistry) -> Self {
        Self { registry }
    }
}

impl ShouldSample for RegistrySampler {
    fn should_sample(
        &self,
        parent_context: Option<&Context>,
        trace_id: TraceId,
        name: &str,
        span_kind: &SpanKind,
        attributes: &[KeyValue],
        links: &[Link],
    ) -> SamplingResult {
        self.registry.sampler().should_sample(
            parent_context,
            trace_id,
            name,
            span_kind,
            attributes,
            links,
        )
    }
}

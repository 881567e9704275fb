//! Zipkin Collector Integration Tests
//!
//! Runs a registered Zipkin exporter against a mock collector and checks the
//! reported span body.

#[cfg(test)]
mod tests {
    use opentelemetry::trace::{Tracer, TracerProvider as _};
    use std::thread;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use zipkin_exporter::config::Metadata;
    use zipkin_exporter::exporter::{Exporter, ZipkinExporter};
    use zipkin_exporter::registry::ExporterRegistry;

    /// Init, trace one span, flush and unregister.
    ///
    /// The reporter uses a blocking HTTP client, so this runs on a plain thread
    /// outside the async runtime.
    fn report_one_span(collector_url: String) {
        let registry = ExporterRegistry::new();
        let mut exporter = ZipkinExporter::new(registry.clone());
        let metadata = Metadata::new()
            .with_property("exporterAddress", collector_url)
            .with_property("enabled", "true");

        exporter.init("Svc-A", "10.0.0.5:3500", &metadata).unwrap();

        let provider = registry.tracer_provider();
        provider.tracer("zipkin-test").in_span("checkout", |_cx| {});
        for result in provider.force_flush() {
            result.unwrap();
        }

        exporter.unregister();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_spans_are_reported_to_collector() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v2/spans"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&mock_server)
            .await;

        let collector_url = format!("{}/api/v2/spans", mock_server.uri());
        tokio::task::spawn_blocking(move || {
            thread::spawn(move || report_one_span(collector_url))
                .join()
                .unwrap()
        })
        .await
        .unwrap();

        let requests = mock_server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);

        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains("\"checkout\""));
        assert!(body.contains("\"svc-a\""));
        assert!(body.contains("10.0.0.5"));
    }

    #[tokio::test]
    async fn test_disabled_exporter_reports_nothing() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v2/spans"))
            .respond_with(ResponseTemplate::new(202))
            .expect(0)
            .mount(&mock_server)
            .await;

        let registry = ExporterRegistry::new();
        let mut exporter = ZipkinExporter::new(registry.clone());
        let metadata = Metadata::new()
            .with_property("exporterAddress", format!("{}/api/v2/spans", mock_server.uri()))
            .with_property("enabled", "false");

        exporter.init("svc-a", "10.0.0.5", &metadata).unwrap();
        assert!(registry.is_empty());

        let requests = mock_server.received_requests().await.unwrap();
        assert!(requests.is_empty());
    }
}

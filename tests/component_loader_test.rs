//! Tests for component definitions
//!
//! Validates YAML component parsing, environment variable expansion and
//! building exporters from a component file.

use serial_test::serial;
use std::io::Write;
use tempfile::NamedTempFile;
use zipkin_exporter::config::{ComponentLoader, ConfigError, ExporterConfig};
use zipkin_exporter::exporter::{self, ExporterError};
use zipkin_exporter::registry::ExporterRegistry;

fn write_component(yaml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(yaml.as_bytes()).expect("write component");
    file
}

const ZIPKIN_COMPONENT: &str = r#"
apiVersion: dapr.io/v1alpha1
kind: Component
metadata:
  name: zipkin
spec:
  type: exporters.zipkin
  metadata:
    - name: enabled
      value: "${ZIPKIN_TEST_ENABLED:-true}"
    - name: exporterAddress
      value: "${ZIPKIN_TEST_ADDRESS:-http://localhost:9411/api/v2/spans}"
"#;

#[test]
#[serial]
fn test_load_component_with_defaults() {
    std::env::remove_var("ZIPKIN_TEST_ENABLED");
    std::env::remove_var("ZIPKIN_TEST_ADDRESS");
    let file = write_component(ZIPKIN_COMPONENT);

    let component = ComponentLoader::load(file.path()).expect("load component");

    assert_eq!(component.metadata.name, "zipkin");
    assert_eq!(component.kind, "Component");
    assert_eq!(component.exporter_kind(), "zipkin");

    let config = ExporterConfig::from_metadata(&component.to_metadata()).unwrap();
    assert_eq!(config.exporter_address, "http://localhost:9411/api/v2/spans");
    assert!(config.is_enabled());
}

#[test]
#[serial]
fn test_load_component_with_env_overrides() {
    std::env::set_var("ZIPKIN_TEST_ENABLED", "false");
    std::env::set_var("ZIPKIN_TEST_ADDRESS", "http://zipkin.monitoring:9411/api/v2/spans");
    let file = write_component(ZIPKIN_COMPONENT);

    let component = ComponentLoader::load(file.path()).expect("load component");
    let config = ExporterConfig::from_metadata(&component.to_metadata()).unwrap();

    assert_eq!(
        config.exporter_address,
        "http://zipkin.monitoring:9411/api/v2/spans"
    );
    assert!(!config.is_enabled());

    std::env::remove_var("ZIPKIN_TEST_ENABLED");
    std::env::remove_var("ZIPKIN_TEST_ADDRESS");
}

#[test]
fn test_load_missing_file() {
    let result = ComponentLoader::load("/nonexistent/zipkin.yaml");
    assert!(matches!(result, Err(ConfigError::IoError(_))));
}

#[test]
fn test_load_invalid_yaml() {
    let file = write_component("metadata: [unterminated");
    let result = ComponentLoader::load(file.path());
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn test_load_rejects_empty_name() {
    let file = write_component(
        r#"
metadata:
  name: ""
spec:
  type: exporters.zipkin
"#,
    );
    let result = ComponentLoader::load(file.path());
    assert!(matches!(result, Err(ConfigError::ValidationError(_))));
}

#[test]
#[serial]
fn test_from_component_registers_exporter() {
    std::env::remove_var("ZIPKIN_TEST_ENABLED");
    std::env::remove_var("ZIPKIN_TEST_ADDRESS");
    let component = ComponentLoader::parse(ZIPKIN_COMPONENT).unwrap();
    let registry = ExporterRegistry::new();

    let mut exporter = exporter::from_component(&component, "svc-a", "10.0.0.5", registry.clone())
        .expect("exporter from component");
    assert_eq!(registry.len(), 1);

    exporter.unregister();
    assert!(registry.is_empty());
}

#[test]
fn test_from_component_unknown_exporter_type() {
    let component = ComponentLoader::parse(
        r#"
metadata:
  name: jaeger
spec:
  type: exporters.jaeger
"#,
    )
    .unwrap();

    let result = exporter::from_component(&component, "svc-a", "", ExporterRegistry::new());
    assert!(matches!(result, Err(ExporterError::UnknownType(_))));
}

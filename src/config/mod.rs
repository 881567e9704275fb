//! Configuration module for the Zipkin exporter
//!
//! Exporters are configured through an opaque property mapping ([`Metadata`])
//! which is decoded straight into a typed [`ExporterConfig`]. Component
//! definitions can also be loaded from YAML files with environment variable
//! expansion, see [`ComponentLoader`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

mod loader;

pub use loader::{
    Component, ComponentLoader, ComponentMeta, ComponentSpec, MetadataItem, EXPORTER_TYPE_PREFIX,
};

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Malformed exporter metadata: {0}")]
    MetadataError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// ============================================================================
// Metadata
// ============================================================================

/// Opaque property mapping handed to an exporter on `init`.
///
/// Values are kept as JSON values so that a malformed entry (for example a
/// number where a string is expected) is only rejected when decoded into a
/// typed config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl Metadata {
    /// Create empty metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property
    pub fn with_property(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    /// Parse metadata properties from a JSON object
    ///
    /// # Example
    ///
    /// ```
    /// use zipkin_exporter::config::Metadata;
    ///
    /// let metadata = Metadata::from_json(r#"{"enabled": "true"}"#).unwrap();
    /// assert_eq!(metadata.get("enabled"), Some("true"));
    /// ```
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let properties: Map<String, Value> = serde_json::from_str(json)?;
        Ok(Self { properties })
    }

    /// Get a string property
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }

    /// Decode the properties into a typed config
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        Ok(serde_json::from_value(Value::Object(self.properties.clone()))?)
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Metadata
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            properties: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// ============================================================================
// Exporter Configuration
// ============================================================================

/// Zipkin exporter configuration.
///
/// Both fields are strings. Missing keys decode to empty strings.
///
/// # Example
///
/// ```json
/// {
///   "exporterAddress": "http://localhost:9411/api/v2/spans",
///   "enabled": "true"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExporterConfig {
    /// Zipkin collector URL that spans are reported to
    #[serde(default)]
    pub exporter_address: String,

    /// Boolean flag as a string, see [`parse_bool`]
    #[serde(default)]
    pub enabled: String,
}

impl ExporterConfig {
    /// Decode the config from exporter metadata
    pub fn from_metadata(metadata: &Metadata) -> Result<Self, ConfigError> {
        metadata.decode()
    }

    /// Whether the exporter is enabled.
    ///
    /// Values that are not a recognised boolean count as disabled.
    pub fn is_enabled(&self) -> bool {
        match parse_bool(&self.enabled) {
            Some(enabled) => enabled,
            None => {
                if !self.enabled.is_empty() {
                    warn!(
                        enabled = %self.enabled,
                        "Unrecognised value for 'enabled', treating exporter as disabled"
                    );
                }
                false
            }
        }
    }
}

/// Parse a boolean flag.
///
/// Accepts `1`, `t`, `T`, `TRUE`, `true`, `True` and
/// `0`, `f`, `F`, `FALSE`, `false`, `False`. Returns `None` for anything else.
pub fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        for s in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(parse_bool(s), Some(true), "{s}");
        }
        for s in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(parse_bool(s), Some(false), "{s}");
        }
        for s in ["", "yes", "tRuE", " true", "2"] {
            assert_eq!(parse_bool(s), None, "{s:?}");
        }
    }

    #[test]
    fn test_decode_exporter_config() {
        let metadata = Metadata::new()
            .with_property("exporterAddress", "http://localhost:9411/api/v2/spans")
            .with_property("enabled", "true");

        let config = ExporterConfig::from_metadata(&metadata).unwrap();
        assert_eq!(config.exporter_address, "http://localhost:9411/api/v2/spans");
        assert!(config.is_enabled());
    }

    #[test]
    fn test_missing_keys_default_to_empty() {
        let config = ExporterConfig::from_metadata(&Metadata::new()).unwrap();
        assert_eq!(config, ExporterConfig::default());
        assert!(!config.is_enabled());
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let metadata: Metadata = [("enabled", "false"), ("somethingElse", "x")]
            .into_iter()
            .collect();
        let config = ExporterConfig::from_metadata(&metadata).unwrap();
        assert!(!config.is_enabled());
    }

    #[test]
    fn test_non_string_value_is_rejected() {
        let metadata = Metadata::new().with_property("enabled", true);
        let result = ExporterConfig::from_metadata(&metadata);
        assert!(matches!(result, Err(ConfigError::MetadataError(_))));
    }

    #[test]
    fn test_unparseable_enabled_is_disabled() {
        let config = ExporterConfig {
            exporter_address: String::new(),
            enabled: "yes please".to_string(),
        };
        assert!(!config.is_enabled());
    }

    #[test]
    fn test_metadata_from_json() {
        let metadata = Metadata::from_json(r#"{"exporterAddress": "http://zipkin:9411"}"#).unwrap();
        assert_eq!(metadata.get("exporterAddress"), Some("http://zipkin:9411"));
        assert_eq!(metadata.get("enabled"), None);

        assert!(Metadata::from_json("not json").is_err());
        assert!(Metadata::from_json(r#"["a", "b"]"#).is_err());
    }
}

//! Component loader with environment variable expansion
//!
//! Component files describe one exporter and its metadata:
//!
//! ```yaml
//! apiVersion: dapr.io/v1alpha1
//! kind: Component
//! metadata:
//!   name: zipkin
//! spec:
//!   type: exporters.zipkin
//!   metadata:
//!     - name: enabled
//!       value: "true"
//!     - name: exporterAddress
//!       value: "${ZIPKIN_ADDRESS:-http://localhost:9411/api/v2/spans}"
//! ```

use super::{ConfigError, Metadata};
use lazy_static::lazy_static;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

lazy_static! {
    // ${VAR} or ${VAR:-default}
    static ref ENV_VAR: Regex = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}")
        .expect("environment variable pattern is valid");
}

/// Prefix every exporter component type carries
pub const EXPORTER_TYPE_PREFIX: &str = "exporters.";

/// A component definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    pub metadata: ComponentMeta,
    pub spec: ComponentSpec,
}

/// Component identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentMeta {
    pub name: String,
}

/// Component type and its metadata entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentSpec {
    #[serde(rename = "type")]
    pub component_type: String,
    #[serde(default)]
    pub metadata: Vec<MetadataItem>,
}

/// A single `name`/`value` metadata entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataItem {
    pub name: String,
    #[serde(default)]
    pub value: Value,
}

impl Component {
    /// Validate the component
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.metadata.name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Component name cannot be empty".into(),
            ));
        }

        if !self.spec.component_type.starts_with(EXPORTER_TYPE_PREFIX) {
            return Err(ConfigError::ValidationError(format!(
                "Component '{}' has type '{}', expected an '{}*' type",
                self.metadata.name, self.spec.component_type, EXPORTER_TYPE_PREFIX
            )));
        }

        for item in &self.spec.metadata {
            if item.name.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "Component '{}' has a metadata entry without a name",
                    self.metadata.name
                )));
            }
        }

        Ok(())
    }

    /// Exporter kind without the type prefix, e.g. `zipkin`
    pub fn exporter_kind(&self) -> &str {
        self.spec
            .component_type
            .strip_prefix(EXPORTER_TYPE_PREFIX)
            .unwrap_or(&self.spec.component_type)
    }

    /// Convert the metadata entries into exporter [`Metadata`].
    ///
    /// Scalar YAML values are stringified; a later entry with the same name
    /// wins.
    pub fn to_metadata(&self) -> Metadata {
        self.spec
            .metadata
            .iter()
            .map(|item| {
                let value = match &item.value {
                    Value::Null => Value::String(String::new()),
                    Value::Bool(b) => Value::String(b.to_string()),
                    Value::Number(n) => Value::String(n.to_string()),
                    other => other.clone(),
                };
                (item.name.clone(), value)
            })
            .collect()
    }
}

/// Component loader
pub struct ComponentLoader;

impl ComponentLoader {
    /// Load a component definition from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Component, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate a component definition from YAML text
    pub fn parse(content: &str) -> Result<Component, ConfigError> {
        let expanded = Self::expand_env_vars(content);
        let component: Component = serde_yaml::from_str(&expanded)?;
        component.validate()?;
        Ok(component)
    }

    /// Expand environment variables in the format `${VAR_NAME}` or
    /// `${VAR_NAME:-default}`.
    ///
    /// Unset variables without a default keep their placeholder.
    fn expand_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |cap: &regex_lite::Captures<'_>| {
                match std::env::var(&cap[1]) {
                    Ok(value) => value,
                    Err(_) => match cap.get(2) {
                        Some(default) => default.as_str().to_string(),
                        None => cap[0].to_string(),
                    },
                }
            })
            .into_owned()
    }
}

//! Media bundle descriptors.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of a bundle's field map: copy the plugin-provided `source`
/// value into the entity field `destination`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub source: String,
    pub destination: String,
}

/// Configuration of one media bundle.
///
/// `field_map` is an ordered list: when two sources target the same
/// destination the first one to produce a value wins, because later entries
/// find the destination already populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaBundle {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
    /// Id of the bundle type plugin governing media of this bundle.
    pub type_plugin: String,
    /// Plugin-specific settings, e.g. `{"source_field": "image"}`.
    pub type_configuration: Value,
    pub field_map: Vec<FieldMapping>,
    /// Names of the bundle-specific fields media of this bundle carry.
    pub fields: Vec<String>,
}

impl MediaBundle {
    pub fn new(id: &str, label: &str, type_plugin: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            description: None,
            type_plugin: type_plugin.to_string(),
            type_configuration: Value::Object(Default::default()),
            field_map: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn with_fields(mut self, fields: &[&str]) -> Self {
        self.fields = fields.iter().map(|f| (*f).to_string()).collect();
        self
    }

    /// Append a `source -> destination` entry to the field map.
    pub fn map_field(mut self, source: &str, destination: &str) -> Self {
        self.field_map.push(FieldMapping {
            source: source.to_string(),
            destination: destination.to_string(),
        });
        self
    }

    pub fn with_configuration(mut self, configuration: Value) -> Self {
        self.type_configuration = configuration;
        self
    }

    /// A string setting from `type_configuration`, or `default` when absent.
    pub fn config_str<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.type_configuration
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(default)
    }
}

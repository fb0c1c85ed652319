//! Media bundle rows.

use mediavault_core::media::bundle::{FieldMapping, MediaBundle};
use mediavault_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `media_bundles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BundleRow {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
    pub type_plugin: String,
    pub type_configuration: serde_json::Value,
    pub field_map: serde_json::Value,
    pub fields: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl BundleRow {
    /// Decode into a bundle. Fails if `field_map` is not a list of
    /// `{source, destination}` objects.
    pub fn into_bundle(self) -> Result<MediaBundle, serde_json::Error> {
        let field_map: Vec<FieldMapping> = serde_json::from_value(self.field_map)?;
        Ok(MediaBundle {
            id: self.id,
            label: self.label,
            description: self.description,
            type_plugin: self.type_plugin,
            type_configuration: self.type_configuration,
            field_map,
            fields: self.fields,
        })
    }
}

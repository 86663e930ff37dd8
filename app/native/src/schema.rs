//! JSON Schema for the AlbumPaper configuration file.

use crate::config::AlbumPaperConfig;

/// Public location of the published schema.
const SCHEMA_ID: &str = "https://raw.githubusercontent.com/albumpaper/albumpaper/main/albumpaper.schema.json";

/// Generates a JSON Schema for the AlbumPaper configuration.
///
/// The schema includes all configuration options with their types,
/// descriptions, and default values.
#[must_use]
pub fn generate_schema() -> schemars::Schema {
    let mut schema = schemars::schema_for!(AlbumPaperConfig);

    if let Some(obj) = schema.as_object_mut() {
        obj.insert("$id".to_string(), serde_json::json!(SCHEMA_ID));
    }

    schema
}

/// Generates the schema as a pretty-printed JSON string.
#[must_use]
pub fn print_schema() -> String {
    serde_json::to_string_pretty(&generate_schema()).unwrap_or_default()
}

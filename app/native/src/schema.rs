//! JSON Schema for the configuration file.

use crate::config::BarikConfig;

/// Schema identifier advertised in the generated document.
const SCHEMA_ID: &str = "https://raw.githubusercontent.com/mocki-toki/barik/main/barik.schema.json";

/// Generates a JSON Schema for the barik configuration.
#[must_use]
pub fn generate_schema() -> schemars::Schema {
    let mut schema = schemars::schema_for!(BarikConfig);

    if let Some(obj) = schema.as_object_mut() {
        obj.insert("$id".to_string(), serde_json::json!(SCHEMA_ID));
    }

    schema
}

/// Pretty-printed schema, ready to be written to a file.
#[must_use]
pub fn print_schema() -> String {
    serde_json::to_string_pretty(&generate_schema()).unwrap_or_default()
}

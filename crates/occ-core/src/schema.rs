//! JSON Schema generation for harness output types.
//!
//! Consumers of `diagnostics.json` and the `--format json` payloads can
//! validate against these schemas.
//!
//! # Usage
//!
//! ```bash
//! # List available schema types
//! occ schema --list
//!
//! # Generate schema for a specific type
//! occ schema Diagnostics
//!
//! # Generate all schemas
//! occ schema --all
//! ```

use schemars::schema_for;
use serde_json::Value;
use std::collections::BTreeMap;

pub use crate::engine::{BacklogTrend, DailyRecord, InvariantViolation, RunSummary};
pub use crate::output::Diagnostics;
pub use occ_config::{ConfigSnapshot, HarnessConfig, UnknownEventPolicy};

/// Available schema types with their descriptions.
pub fn available_schemas() -> Vec<(&'static str, &'static str)> {
    vec![
        // Engine types
        ("DailyRecord", "One row of the daily metric table"),
        (
            "InvariantViolation",
            "Day whose attempts differ from stuck plus bounced",
        ),
        ("BacklogTrend", "Backlog regime over the evaluated range"),
        ("RunSummary", "Totals and regime over all evaluated days"),
        // Artifacts
        (
            "Diagnostics",
            "Contents of diagnostics.json written by every run",
        ),
        // Configuration
        ("HarnessConfig", "harness.json configuration file"),
        ("UnknownEventPolicy", "Loader policy for unknown event types"),
        (
            "ConfigSnapshot",
            "Effective configuration recorded in diagnostics",
        ),
    ]
}

/// Generate JSON Schema for a type by name.
///
/// Returns `None` if the type is unknown.
pub fn generate_schema(type_name: &str) -> Option<Value> {
    let schema = match type_name {
        "DailyRecord" => schema_for!(DailyRecord),
        "InvariantViolation" => schema_for!(InvariantViolation),
        "BacklogTrend" => schema_for!(BacklogTrend),
        "RunSummary" => schema_for!(RunSummary),
        "Diagnostics" => schema_for!(Diagnostics),
        "HarnessConfig" => schema_for!(HarnessConfig),
        "UnknownEventPolicy" => schema_for!(UnknownEventPolicy),
        "ConfigSnapshot" => schema_for!(ConfigSnapshot),
        _ => return None,
    };

    serde_json::to_value(schema).ok()
}

/// Generate all schemas as a map from type name to schema.
pub fn generate_all_schemas() -> BTreeMap<String, Value> {
    let mut schemas = BTreeMap::new();
    for (name, _desc) in available_schemas() {
        if let Some(schema) = generate_schema(name) {
            schemas.insert(name.to_string(), schema);
        }
    }
    schemas
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_schemas_generate() {
        for (name, _desc) in available_schemas() {
            let schema = generate_schema(name);
            assert!(schema.is_some(), "Schema for '{}' should generate", name);
        }
    }

    #[test]
    fn test_unknown_schema_returns_none() {
        assert!(generate_schema("UnknownType").is_none());
        assert!(generate_schema("").is_none());
    }

    #[test]
    fn test_daily_record_schema_lists_columns() {
        let schema = generate_schema("DailyRecord").unwrap();
        let props = schema["properties"].as_object().unwrap();
        for key in ["date", "arrivals", "attempts", "stuck", "bounced", "backlog"] {
            assert!(props.contains_key(key), "missing property {}", key);
        }
    }

    #[test]
    fn test_generate_all_schemas() {
        let all = generate_all_schemas();
        assert_eq!(all.len(), available_schemas().len());
        assert!(all.contains_key("Diagnostics"));
        assert!(all.contains_key("HarnessConfig"));
    }
}

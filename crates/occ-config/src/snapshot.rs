//! Configuration snapshots for run diagnostics and reproducibility.
//!
//! A snapshot captures the effective configuration at the start of a run so
//! a submission can be audited and reproduced later.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::harness::{HarnessConfig, UnknownEventPolicy};
use crate::resolve::ConfigSource;

/// A frozen snapshot of configuration state.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ConfigSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Schema version of the configuration.
    pub schema_version: String,

    /// SHA-256 of the raw harness.json content, when a file was loaded.
    #[serde(default)]
    pub file_hash: Option<String>,

    /// Path the file was loaded from.
    #[serde(default)]
    pub config_path: Option<String>,

    /// Where the configuration came from.
    pub config_source: String,

    /// SHA-256 of the effective configuration after overrides.
    pub effective_hash: String,

    pub horizon_days: i64,
    pub window_days: i64,
    pub boundary: String,
    pub standard: String,
    pub unknown_event_types: UnknownEventPolicy,
}

impl ConfigSnapshot {
    /// Create a snapshot from the effective configuration.
    pub fn new(
        config: &HarnessConfig,
        source: ConfigSource,
        path: Option<&std::path::Path>,
        raw_json: Option<&str>,
    ) -> Self {
        // HarnessConfig only holds strings, integers and a unit enum.
        let effective = serde_json::to_string(config).unwrap_or_default();

        ConfigSnapshot {
            timestamp: Utc::now(),
            schema_version: config.schema_version.clone(),
            file_hash: raw_json.map(hash_content),
            config_path: path.map(|p| p.display().to_string()),
            config_source: source.as_str().to_string(),
            effective_hash: hash_content(&effective),
            horizon_days: config.horizon_days,
            window_days: config.window_days,
            boundary: config.boundary.clone(),
            standard: config.standard.clone(),
            unknown_event_types: config.unknown_event_types,
        }
    }

    /// Create a snapshot with only defaults (no config file loaded).
    pub fn defaults_only() -> Self {
        Self::new(
            &HarnessConfig::default(),
            ConfigSource::BuiltinDefault,
            None,
            None,
        )
    }

    /// Serialize snapshot to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check if this snapshot matches another (same effective config).
    pub fn matches(&self, other: &ConfigSnapshot) -> bool {
        self.effective_hash == other.effective_hash
    }

    /// Short identifier for this snapshot (first 12 chars of hash).
    pub fn short_id(&self) -> &str {
        &self.effective_hash[..12.min(self.effective_hash.len())]
    }
}

/// Hash content with SHA-256 and return hex string.
pub(crate) fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

//! The `harness.json` configuration model.
//!
//! Every field has a built-in default so a missing file and an empty `{}`
//! file both produce a usable configuration.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::validate::ValidationError;

/// Default stick horizon `T` in days.
pub const DEFAULT_HORIZON_DAYS: i64 = 30;

/// Default rolling clearance window `W` in days.
pub const DEFAULT_WINDOW_DAYS: i64 = 90;

/// Boundary label used until the operator locks a real one.
pub const DEFAULT_BOUNDARY: &str = "placeholder-boundary";

/// Accounting standard recorded in the manifest.
pub const DEFAULT_STANDARD: &str = "OCC Tier-1";

/// How the ledger loader treats event-type codes outside start/attempt/done/reopen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum UnknownEventPolicy {
    /// Keep the event as unrecognized; it never moves a counter but can make
    /// a nearby completion unobservable.
    #[default]
    Retain,
    /// Treat the row as malformed input and abort the load.
    Reject,
}

impl std::fmt::Display for UnknownEventPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnknownEventPolicy::Retain => write!(f, "retain"),
            UnknownEventPolicy::Reject => write!(f, "reject"),
        }
    }
}

impl std::str::FromStr for UnknownEventPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "retain" | "keep" => Ok(UnknownEventPolicy::Retain),
            "reject" | "strict" => Ok(UnknownEventPolicy::Reject),
            _ => Err(format!("unknown event-type policy: {}", s)),
        }
    }
}

/// Harness configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HarnessConfig {
    /// Schema version of this file.
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Horizon `T` (days) within which a reopening counts against a completion.
    #[serde(default = "default_horizon_days")]
    pub horizon_days: i64,

    /// Trailing window `W` (days) for the rolling clearance ratio.
    #[serde(default = "default_window_days")]
    pub window_days: i64,

    /// Declared accounting boundary, copied into the manifest.
    #[serde(default = "default_boundary")]
    pub boundary: String,

    /// Accounting standard label, copied into the manifest.
    #[serde(default = "default_standard")]
    pub standard: String,

    /// Loader policy for unrecognized event-type codes.
    #[serde(default)]
    pub unknown_event_types: UnknownEventPolicy,
}

fn default_schema_version() -> String {
    crate::CONFIG_SCHEMA_VERSION.to_string()
}

fn default_horizon_days() -> i64 {
    DEFAULT_HORIZON_DAYS
}

fn default_window_days() -> i64 {
    DEFAULT_WINDOW_DAYS
}

fn default_boundary() -> String {
    DEFAULT_BOUNDARY.to_string()
}

fn default_standard() -> String {
    DEFAULT_STANDARD.to_string()
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            horizon_days: DEFAULT_HORIZON_DAYS,
            window_days: DEFAULT_WINDOW_DAYS,
            boundary: default_boundary(),
            standard: default_standard(),
            unknown_event_types: UnknownEventPolicy::default(),
        }
    }
}

impl HarnessConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::parse_json(&content)
    }

    /// Parse configuration from a JSON string.
    pub fn parse_json(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }

    /// Apply command-line or environment overrides on top of file values.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(horizon) = overrides.horizon_days {
            self.horizon_days = horizon;
        }
        if let Some(window) = overrides.window_days {
            self.window_days = window;
        }
        if let Some(ref boundary) = overrides.boundary {
            self.boundary = boundary.clone();
        }
        if let Some(policy) = overrides.unknown_event_types {
            self.unknown_event_types = policy;
        }
    }
}

/// Values supplied on the command line that win over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub horizon_days: Option<i64>,
    pub window_days: Option<i64>,
    pub boundary: Option<String>,
    pub unknown_event_types: Option<UnknownEventPolicy>,
}

impl ConfigOverrides {
    /// True when no override is set.
    pub fn is_empty(&self) -> bool {
        self.horizon_days.is_none()
            && self.window_days.is_none()
            && self.boundary.is_none()
            && self.unknown_event_types.is_none()
    }
}

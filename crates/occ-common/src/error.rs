//! Error types for the OCC harness.
//!
//! This module provides structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Recoverability hints for automation
//! - Remediation suggestions for humans
//!
//! # Human-Facing Output
//!
//! ```text
//! ✗ Malformed Ledger
//!   Reason: malformed ledger at row 17: unparseable timestamp '2013-13-01'
//!   Fix: Correct the offending row and rerun 'occ check --ledger <file>'.
//! ```
//!
//! # Agent-Facing Output
//!
//! ```json
//! {
//!   "code": 20,
//!   "category": "input",
//!   "message": "malformed ledger at row 17: unparseable timestamp '2013-13-01'",
//!   "recoverable": true,
//!   "suggested_action": "fix_input",
//!   "context": { "row": 17 }
//! }
//! ```
//!
//! Unobservable metrics and invariant violations are *not* errors; they are
//! reported as data by the engine and never pass through this type.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for harness operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Harness configuration errors.
    Config,
    /// Malformed ledger input.
    Input,
    /// Boundary contract failures between loader and engine.
    Contract,
    /// Submission package creation or verification errors.
    Package,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Input => write!(f, "input"),
            ErrorCategory::Contract => write!(f, "contract"),
            ErrorCategory::Package => write!(f, "package"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Suggested actions for agents to take in response to errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    /// Retry the operation.
    Retry,
    /// Correct the ledger file.
    FixInput,
    /// Correct the configuration file or flags.
    FixConfig,
    /// Run the validation command.
    RunCheck,
    /// Regenerate the submission package.
    Regenerate,
    /// Abort the operation.
    Abort,
    /// Manual intervention required.
    ManualIntervention,
}

impl std::fmt::Display for SuggestedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuggestedAction::Retry => write!(f, "retry"),
            SuggestedAction::FixInput => write!(f, "fix_input"),
            SuggestedAction::FixConfig => write!(f, "fix_config"),
            SuggestedAction::RunCheck => write!(f, "run_check"),
            SuggestedAction::Regenerate => write!(f, "regenerate"),
            SuggestedAction::Abort => write!(f, "abort"),
            SuggestedAction::ManualIntervention => write!(f, "manual_intervention"),
        }
    }
}

/// Unified error type for the harness.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid value for {field}: {message}")]
    InvalidConfig { field: String, message: String },

    // Input errors (20-29)
    #[error("malformed ledger at row {row}: {message}")]
    MalformedLedger { row: usize, message: String },

    #[error("ledger is missing required column '{0}'")]
    MissingColumn(String),

    // Contract errors (30-39)
    #[error("event stream not sorted: event {index} at {timestamp} precedes its predecessor")]
    UnsortedInput { index: usize, timestamp: String },

    #[error("invalid parameter {name}: {message}")]
    InvalidParameter { name: String, message: String },

    // Package errors (40-49)
    #[error("submission package error: {0}")]
    Package(String),

    #[error("checksum mismatch for '{path}'")]
    ChecksumMismatch { path: String },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 20-29: Input errors
    /// - 30-39: Contract errors
    /// - 40-49: Package errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidConfig { .. } => 11,
            Error::MalformedLedger { .. } => 20,
            Error::MissingColumn(_) => 21,
            Error::UnsortedInput { .. } => 30,
            Error::InvalidParameter { .. } => 31,
            Error::Package(_) => 40,
            Error::ChecksumMismatch { .. } => 41,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) | Error::InvalidConfig { .. } => ErrorCategory::Config,
            Error::MalformedLedger { .. } | Error::MissingColumn(_) => ErrorCategory::Input,
            Error::UnsortedInput { .. } | Error::InvalidParameter { .. } => {
                ErrorCategory::Contract
            }
            Error::Package(_) | Error::ChecksumMismatch { .. } => ErrorCategory::Package,
            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether this error is potentially recoverable.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Config(_) | Error::InvalidConfig { .. } => true,
            Error::MalformedLedger { .. } | Error::MissingColumn(_) => true,
            // The loader is supposed to sort; an unsorted stream is a bug upstream.
            Error::UnsortedInput { .. } => false,
            Error::InvalidParameter { .. } => true,
            Error::Package(_) => true,
            Error::ChecksumMismatch { .. } => false,
            Error::Io(_) => true,
            Error::Json(_) => true,
        }
    }

    /// Returns the suggested action for agents.
    pub fn suggested_action(&self) -> SuggestedAction {
        match self {
            Error::Config(_) => SuggestedAction::RunCheck,
            Error::InvalidConfig { .. } => SuggestedAction::FixConfig,
            Error::MalformedLedger { .. } | Error::MissingColumn(_) => SuggestedAction::FixInput,
            Error::UnsortedInput { .. } => SuggestedAction::Abort,
            Error::InvalidParameter { .. } => SuggestedAction::FixConfig,
            Error::Package(_) => SuggestedAction::Regenerate,
            Error::ChecksumMismatch { .. } => SuggestedAction::Regenerate,
            Error::Io(_) => SuggestedAction::Retry,
            Error::Json(_) => SuggestedAction::ManualIntervention,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Config(_) => {
                "Run 'occ config show' to see the effective configuration and where it came from."
            }
            Error::InvalidConfig { .. } => {
                "Fix the value in harness.json or override it with --horizon-days / --window-days."
            }
            Error::MalformedLedger { .. } => {
                "Correct the offending row and rerun 'occ check --ledger <file>'."
            }
            Error::MissingColumn(_) => {
                "The ledger needs item_id, event_type and timestamp columns in its header row."
            }
            Error::UnsortedInput { .. } => {
                "Events must reach the engine sorted by timestamp. Report this with the ledger attached."
            }
            Error::InvalidParameter { .. } => {
                "horizon_days must be >= 0 and window_days must be >= 1."
            }
            Error::Package(_) => {
                "Rerun 'occ run' to regenerate the submission package."
            }
            Error::ChecksumMismatch { .. } => {
                "The archive was modified after it was written. Regenerate it from the ledger."
            }
            Error::Io(_) => {
                "Check disk space, permissions, and that the output directory is writable."
            }
            Error::Json(_) => {
                "Invalid JSON. Check syntax with 'jq . <file>' or restore from backup."
            }
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::Config(_) => "Configuration Error",
            Error::InvalidConfig { .. } => "Invalid Configuration",
            Error::MalformedLedger { .. } => "Malformed Ledger",
            Error::MissingColumn(_) => "Missing Ledger Column",
            Error::UnsortedInput { .. } => "Unsorted Event Stream",
            Error::InvalidParameter { .. } => "Invalid Parameter",
            Error::Package(_) => "Submission Package Error",
            Error::ChecksumMismatch { .. } => "Checksum Mismatch",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Error",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Suggested action for agents.
    pub suggested_action: SuggestedAction,

    /// Additional structured context (e.g., row, path).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::MalformedLedger { row, .. } => {
                context.insert("row".to_string(), serde_json::json!(row));
            }
            Error::MissingColumn(column) => {
                context.insert("column".to_string(), serde_json::json!(column));
            }
            Error::UnsortedInput { index, timestamp } => {
                context.insert("index".to_string(), serde_json::json!(index));
                context.insert("timestamp".to_string(), serde_json::json!(timestamp));
            }
            Error::InvalidConfig { field, .. } => {
                context.insert("field".to_string(), serde_json::json!(field));
            }
            Error::InvalidParameter { name, .. } => {
                context.insert("parameter".to_string(), serde_json::json!(name));
            }
            Error::ChecksumMismatch { path } => {
                context.insert("path".to_string(), serde_json::json!(path));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            suggested_action: err.suggested_action(),
            context,
        }
    }
}

impl StructuredError {
    /// Serialize to a single-line JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}

/// Format an error for human-readable stderr output.
///
/// Output format:
/// ```text
/// ✗ [Headline]
///   Reason: [Error message]
///   Fix: [Remediation hint]
/// ```
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        red = red,
        cyan = cyan,
        reset = reset,
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}

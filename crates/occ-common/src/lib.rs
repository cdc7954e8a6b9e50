//! OCC harness common types, IDs, and errors.
//!
//! This crate provides foundational types shared across the harness crates:
//! - Run identifiers for correlating logs and outputs
//! - The unified error taxonomy with stable codes
//! - Output format selection for CLI payloads

pub mod error;
pub mod id;
pub mod output;

pub use error::{format_error_human, Error, ErrorCategory, Result, StructuredError, SuggestedAction};
pub use id::RunId;
pub use output::OutputFormat;

/// Schema version for every JSON artifact the harness emits.
pub const SCHEMA_VERSION: &str = "1.0.0";

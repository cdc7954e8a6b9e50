//! OCC harness configuration loading and validation.
//!
//! This crate provides:
//! - The typed `harness.json` model with built-in defaults
//! - Config resolution (CLI → env → XDG → system → defaults)
//! - Semantic validation of the horizon and window parameters
//! - Config snapshots recorded in diagnostics for reproducibility

pub mod harness;
pub mod load;
pub mod resolve;
pub mod snapshot;
pub mod validate;

pub use harness::{ConfigOverrides, HarnessConfig, UnknownEventPolicy};
pub use load::{load_config, ConfigError, ConfigOptions, ResolvedConfig};
pub use resolve::{resolve_config, ConfigPaths, ConfigSource};
pub use snapshot::ConfigSnapshot;
pub use validate::{validate_harness, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";

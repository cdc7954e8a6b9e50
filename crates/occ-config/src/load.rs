//! Configuration loading with provenance.
//!
//! Precedence for each value, highest first: CLI override, OCC_HORIZON_DAYS /
//! OCC_WINDOW_DAYS, the resolved harness.json, built-in defaults.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::harness::{ConfigOverrides, HarnessConfig};
use crate::resolve::{resolve_config, ConfigSource, ENV_HORIZON_DAYS, ENV_WINDOW_DAYS};
use crate::snapshot::{hash_content, ConfigSnapshot};
use crate::validate::{validate_harness, ValidationError};

/// Errors that can occur during config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Invalid JSON in config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error reading {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid value in {var}: {value:?} is not an integer")]
    InvalidEnv { var: String, value: String },

    #[error("Semantic validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl ConfigError {
    /// The offending field, when the error is about a single value.
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::ValidationError(ValidationError::InvalidValue { field, .. }) => {
                Some(field)
            }
            ConfigError::InvalidEnv { var, .. } => Some(var),
            _ => None,
        }
    }
}

impl From<ConfigError> for occ_common::Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::InvalidEnv { var, value } => occ_common::Error::InvalidConfig {
                field: var,
                message: format!("{:?} is not an integer", value),
            },
            ConfigError::ValidationError(ValidationError::InvalidValue { field, message }) => {
                occ_common::Error::InvalidConfig { field, message }
            }
            other => occ_common::Error::Config(other.to_string()),
        }
    }
}

/// Configuration resolution options.
#[derive(Debug, Default, Clone)]
pub struct ConfigOptions {
    /// Explicit harness.json path (`--config`).
    pub config_path: Option<PathBuf>,
    /// Command-line overrides applied last.
    pub overrides: ConfigOverrides,
}

/// Resolved configuration with provenance information.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The effective configuration.
    pub config: HarnessConfig,
    /// Path of the loaded file (None if using defaults).
    pub path: Option<PathBuf>,
    /// Where the file came from.
    pub source: ConfigSource,
    /// SHA-256 of the raw file content (None if using defaults).
    pub file_hash: Option<String>,
    raw: Option<String>,
}

impl ResolvedConfig {
    /// Configuration built purely from defaults.
    pub fn defaults() -> Self {
        ResolvedConfig {
            config: HarnessConfig::default(),
            path: None,
            source: ConfigSource::BuiltinDefault,
            file_hash: None,
            raw: None,
        }
    }

    /// Create a config snapshot for diagnostics.
    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot::new(
            &self.config,
            self.source,
            self.path.as_deref(),
            self.raw.as_deref(),
        )
    }
}

/// Load, override, and validate the harness configuration.
pub fn load_config(options: &ConfigOptions) -> Result<ResolvedConfig, ConfigError> {
    let paths = resolve_config(options.config_path.as_deref());

    let mut resolved = match paths.harness {
        Some(path) => {
            let (config, raw) = load_harness_file(&path)?;
            ResolvedConfig {
                config,
                file_hash: Some(hash_content(&raw)),
                path: Some(path),
                source: paths.harness_source,
                raw: Some(raw),
            }
        }
        None => ResolvedConfig::defaults(),
    };

    debug!(
        source = %resolved.source,
        path = ?resolved.path,
        "resolved harness configuration"
    );

    let env_overrides = env_overrides()?;
    resolved.config.apply_overrides(&env_overrides);
    resolved.config.apply_overrides(&options.overrides);

    validate_harness(&resolved.config)?;

    Ok(resolved)
}

fn load_harness_file(path: &Path) -> Result<(HarnessConfig, String), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: HarnessConfig =
        serde_json::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok((config, content))
}

fn env_overrides() -> Result<ConfigOverrides, ConfigError> {
    Ok(ConfigOverrides {
        horizon_days: env_days(ENV_HORIZON_DAYS)?,
        window_days: env_days(ENV_WINDOW_DAYS)?,
        ..ConfigOverrides::default()
    })
}

fn env_days(var: &str) -> Result<Option<i64>, ConfigError> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv {
                var: var.to_string(),
                value,
            }),
        _ => Ok(None),
    }
}

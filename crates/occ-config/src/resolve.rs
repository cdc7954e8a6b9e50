//! Configuration resolution and path discovery.
//!
//! Resolution order: CLI argument → environment variables → XDG paths → system → defaults.

use std::path::{Path, PathBuf};

/// Discovered configuration file path.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Path to harness.json (or None if not found).
    pub harness: Option<PathBuf>,

    /// Source of the harness config (for diagnostics).
    pub harness_source: ConfigSource,
}

/// Where a configuration file was found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via `--config`.
    CliArgument,

    /// Set via OCC_CONFIG or OCC_CONFIG_DIR.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Found in /etc/occ-harness/.
    SystemConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl ConfigSource {
    /// Stable snake_case label used in diagnostics JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigSource::CliArgument => "cli_argument",
            ConfigSource::Environment => "environment",
            ConfigSource::XdgConfig => "xdg_config",
            ConfigSource::SystemConfig => "system_config",
            ConfigSource::BuiltinDefault => "builtin_default",
        }
    }
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::SystemConfig => write!(f, "system config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Environment variable names.
pub const ENV_CONFIG_PATH: &str = "OCC_CONFIG";
pub const ENV_CONFIG_DIR: &str = "OCC_CONFIG_DIR";
pub const ENV_HORIZON_DAYS: &str = "OCC_HORIZON_DAYS";
pub const ENV_WINDOW_DAYS: &str = "OCC_WINDOW_DAYS";

/// Standard config file name.
pub const HARNESS_FILENAME: &str = "harness.json";

/// Application name for XDG directories.
const APP_NAME: &str = "occ-harness";

/// Resolve the harness configuration path.
///
/// 1. Explicit CLI path (returned even if missing so the loader can report it)
/// 2. OCC_CONFIG
/// 3. OCC_CONFIG_DIR + harness.json
/// 4. XDG config directory (~/.config/occ-harness/)
/// 5. System config (/etc/occ-harness/)
/// 6. Built-in defaults (None)
pub fn resolve_config(cli_config: Option<&Path>) -> ConfigPaths {
    if let Some(path) = cli_config {
        return ConfigPaths {
            harness: Some(path.to_path_buf()),
            harness_source: ConfigSource::CliArgument,
        };
    }

    let (harness, harness_source) = match discover(HARNESS_FILENAME) {
        Some((path, source)) => (Some(path), source),
        None => (None, ConfigSource::BuiltinDefault),
    };

    ConfigPaths {
        harness,
        harness_source,
    }
}

fn discover(filename: &str) -> Option<(PathBuf, ConfigSource)> {
    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        if !env_path.is_empty() {
            let path = PathBuf::from(env_path);
            if path.exists() {
                return Some((path, ConfigSource::Environment));
            }
        }
    }

    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        if !config_dir.is_empty() {
            let path = PathBuf::from(config_dir).join(filename);
            if path.exists() {
                return Some((path, ConfigSource::Environment));
            }
        }
    }

    if let Some(dir) = xdg_config_dir() {
        let path = dir.join(filename);
        if path.exists() {
            return Some((path, ConfigSource::XdgConfig));
        }
    }

    let system_path = system_config_dir().join(filename);
    if system_path.exists() {
        return Some((system_path, ConfigSource::SystemConfig));
    }

    None
}

/// Get the XDG config directory for occ-harness.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Get the system config directory.
pub fn system_config_dir() -> PathBuf {
    PathBuf::from("/etc").join(APP_NAME)
}

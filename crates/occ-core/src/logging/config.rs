//! Log level and format selection.
//!
//! Precedence, lowest first: built-in default (`warn`, human), `RUST_LOG`,
//! `OCC_LOG` / `OCC_LOG_FORMAT`, then `-v`/`-q` and `--log-format`.
//! RUST_LOG directives are passed through verbatim only when nothing above
//! them picked a level.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Level variable checked before RUST_LOG.
pub const ENV_LOG: &str = "OCC_LOG";
/// Format variable (`human` or `jsonl`).
pub const ENV_LOG_FORMAT: &str = "OCC_LOG_FORMAT";

/// Where log lines go and how they look. Always stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Console lines, ANSI colour on a terminal.
    #[default]
    #[value(alias = "console")]
    Human,
    /// One JSON object per line.
    #[value(alias = "json")]
    Jsonl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    #[value(alias = "warning")]
    Warn,
    Error,
    #[value(alias = "none")]
    Off,
}

impl LogLevel {
    /// Level implied by `-v` / `-q` counts. `None` when neither was given.
    pub fn from_verbosity(verbose: u8, quiet: bool) -> Option<Self> {
        if quiet {
            return Some(LogLevel::Error);
        }
        match verbose {
            0 => None,
            1 => Some(LogLevel::Info),
            2 => Some(LogLevel::Debug),
            _ => Some(LogLevel::Trace),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved logging setup for [`super::init_logging`].
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    /// Raw RUST_LOG directives, kept only when they decided the level.
    pub directives: Option<String>,
}

impl LogConfig {
    pub fn from_env(cli_level: Option<LogLevel>, cli_format: Option<LogFormat>) -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), cli_level, cli_format)
    }

    fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        cli_level: Option<LogLevel>,
        cli_format: Option<LogFormat>,
    ) -> Self {
        let format = cli_format
            .or_else(|| {
                lookup(ENV_LOG_FORMAT).and_then(|val| LogFormat::from_str(val.trim(), true).ok())
            })
            .unwrap_or_default();
        let explicit = cli_level.or_else(|| {
            lookup(ENV_LOG).and_then(|val| LogLevel::from_str(val.trim(), true).ok())
        });
        if let Some(level) = explicit {
            return LogConfig {
                format,
                level,
                directives: None,
            };
        }

        match lookup("RUST_LOG").filter(|val| !val.trim().is_empty()) {
            Some(directives) => LogConfig {
                format,
                level: coarse_level(&directives).unwrap_or_default(),
                directives: Some(directives),
            },
            None => LogConfig {
                format,
                ..LogConfig::default()
            },
        }
    }
}

/// Most verbose level named anywhere in a RUST_LOG directive string.
/// The EnvFilter built from RUST_LOG still does the real filtering.
fn coarse_level(directives: &str) -> Option<LogLevel> {
    [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
    ]
    .into_iter()
    .find(|level| directives.contains(level.as_str()))
}

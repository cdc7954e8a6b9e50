//! Structured event vocabulary for logging.
//!
//! Events carry a `run_id` and a pipeline `stage`; event names are stable
//! and used as the tracing target.

use serde::{Deserialize, Serialize};

/// Log levels as written to JSONL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Level::Trace,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::ERROR => Level::Error,
        }
    }
}

/// Pipeline stages of a harness run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Startup and configuration.
    Init,
    /// Ledger parsing.
    Load,
    /// Completion classification.
    Classify,
    /// Day bucketing and window ratios.
    Aggregate,
    /// Closure identity check.
    Check,
    /// Output file writing.
    Write,
    /// Submission archive creation.
    Bundle,
    /// Submission verification.
    Verify,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Init => "init",
            Stage::Load => "load",
            Stage::Classify => "classify",
            Stage::Aggregate => "aggregate",
            Stage::Check => "check",
            Stage::Write => "write",
            Stage::Bundle => "bundle",
            Stage::Verify => "verify",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Standard event names used in logging.
pub mod event_names {
    // Run lifecycle
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";

    pub const CONFIG_LOADED: &str = "config.loaded";

    pub const LEDGER_LOADED: &str = "ledger.loaded";

    pub const ENGINE_FINISHED: &str = "engine.finished";
    pub const INVARIANT_VIOLATION: &str = "invariant.violation";

    pub const OUTPUT_WRITTEN: &str = "output.written";
    pub const PACKAGE_WRITTEN: &str = "package.written";

    pub const VERIFY_RESULT: &str = "verify.result";
}

/// Correlation context shared by every event of one run.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub run_id: String,
    /// Accounting boundary the run reports on.
    pub boundary: String,
}

impl LogContext {
    pub fn new(run_id: impl Into<String>, boundary: impl Into<String>) -> Self {
        LogContext {
            run_id: run_id.into(),
            boundary: boundary.into(),
        }
    }
}

//! Exit codes for the `occ` CLI.
//!
//! Exit codes communicate the outcome without requiring output parsing.
//!
//! Exit code ranges:
//! - 0-1: Operational outcomes
//! - 10-19: User/input errors (recoverable by fixing input or config)
//! - 20-29: Internal errors (bugs, should be reported)

use occ_common::{Error, ErrorCategory};

/// Exit codes for harness operations.
///
/// These codes are a stable contract for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    // ========================================================================
    // Operational Outcomes (0-1)
    // ========================================================================
    /// Run completed, no invariant violations
    Clean = 0,

    /// Run completed, outputs written, but invariant violations were recorded
    ViolationsRecorded = 1,

    // ========================================================================
    // User / Input Errors (10-19)
    // ========================================================================
    /// Invalid arguments
    ArgsError = 10,

    /// Malformed ledger
    InputError = 11,

    /// Invalid or unreadable configuration
    ConfigError = 12,

    /// Loader/engine contract failure (unsorted stream, bad parameters)
    ContractError = 13,

    /// Submission package failed verification
    VerificationFailed = 14,

    // ========================================================================
    // Internal Errors (20-29)
    // ========================================================================
    /// Internal error (bug - please report)
    InternalError = 20,

    /// I/O error
    IoError = 21,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Clean)
    }

    /// Run finished and produced outputs (with or without violations).
    pub fn is_operational(self) -> bool {
        (self as i32) < 10
    }

    pub fn is_user_error(self) -> bool {
        (10..20).contains(&(self as i32))
    }

    pub fn is_internal_error(self) -> bool {
        (self as i32) >= 20
    }

    pub fn is_error(self) -> bool {
        !self.is_operational()
    }

    /// Stable name for logs and JSON output.
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::ViolationsRecorded => "OK_VIOLATIONS",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::InputError => "ERR_INPUT",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::ContractError => "ERR_CONTRACT",
            ExitCode::VerificationFailed => "ERR_VERIFY",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }

    /// Exit code for a harness error.
    pub fn for_error(err: &Error) -> Self {
        match err {
            Error::ChecksumMismatch { .. } => ExitCode::VerificationFailed,
            Error::Json(_) => ExitCode::InternalError,
            _ => match err.category() {
                ErrorCategory::Config => ExitCode::ConfigError,
                ErrorCategory::Input => ExitCode::InputError,
                ErrorCategory::Contract => ExitCode::ContractError,
                ErrorCategory::Package => ExitCode::IoError,
                ErrorCategory::Io => ExitCode::IoError,
            },
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}

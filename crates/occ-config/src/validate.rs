//! Configuration validation errors and semantic validation.

use thiserror::Error;

use crate::harness::HarnessConfig;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::SemanticError(_) => 63,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

/// Validate harness configuration semantically.
pub fn validate_harness(config: &HarnessConfig) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    if config.horizon_days < 0 {
        return Err(ValidationError::InvalidValue {
            field: "horizon_days".to_string(),
            message: format!("Must be >= 0, got {}", config.horizon_days),
        });
    }

    if config.window_days < 1 {
        return Err(ValidationError::InvalidValue {
            field: "window_days".to_string(),
            message: format!("Must be >= 1, got {}", config.window_days),
        });
    }

    if config.boundary.trim().is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "boundary".to_string(),
            message: "Must not be empty".to_string(),
        });
    }

    if config.standard.trim().is_empty() {
        return Err(ValidationError::SemanticError(
            "standard label must not be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(validate_harness(&HarnessConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_horizon_is_valid() {
        let config = HarnessConfig {
            horizon_days: 0,
            ..HarnessConfig::default()
        };
        assert!(validate_harness(&config).is_ok());
    }

    #[test]
    fn test_negative_horizon_rejected() {
        let config = HarnessConfig {
            horizon_days: -1,
            ..HarnessConfig::default()
        };
        let err = validate_harness(&config).unwrap_err();
        assert!(
            matches!(err, ValidationError::InvalidValue { ref field, .. } if field == "horizon_days")
        );
        assert_eq!(err.code(), 65);
    }

    #[test]
    fn test_zero_window_rejected() {
        let config = HarnessConfig {
            window_days: 0,
            ..HarnessConfig::default()
        };
        let err = validate_harness(&config).unwrap_err();
        assert!(
            matches!(err, ValidationError::InvalidValue { ref field, .. } if field == "window_days")
        );
    }

    #[test]
    fn test_blank_boundary_rejected() {
        let config = HarnessConfig {
            boundary: "   ".to_string(),
            ..HarnessConfig::default()
        };
        assert!(validate_harness(&config).is_err());
    }

    #[test]
    fn test_version_mismatch() {
        let config = HarnessConfig {
            schema_version: "0.9.0".to_string(),
            ..HarnessConfig::default()
        };
        let err = validate_harness(&config).unwrap_err();
        assert!(matches!(err, ValidationError::VersionMismatch { .. }));
        assert_eq!(err.code(), 66);
    }
}

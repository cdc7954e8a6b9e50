//! Error types for submission package operations.

use thiserror::Error;

/// Errors that can occur while writing or verifying a submission package.
#[derive(Error, Debug)]
pub enum BundleError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Checksum verification failed
    #[error("checksum mismatch for '{path}': expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    /// Size recorded in the manifest disagrees with the archived file
    #[error("size mismatch for '{path}': manifest says {expected} bytes, archive has {actual}")]
    SizeMismatch {
        path: String,
        expected: u64,
        actual: u64,
    },

    /// Missing required file in the package
    #[error("missing required file: {0}")]
    MissingFile(String),

    /// Unknown or unsupported manifest version
    #[error("unsupported manifest version: {version} (supported: {supported})")]
    UnsupportedVersion { version: String, supported: String },

    /// Corrupted manifest
    #[error("corrupted manifest: {0}")]
    CorruptedManifest(String),

    /// File listed in the manifest but absent from the archive
    #[error("file not found in package: {0}")]
    FileNotFound(String),

    /// Two files were added under the same path
    #[error("duplicate file in package: {0}")]
    DuplicateFile(String),

    /// Package has no content files
    #[error("package has no content to write")]
    EmptyBundle,
}

/// Result type alias for package operations.
pub type Result<T> = std::result::Result<T, BundleError>;

impl From<BundleError> for occ_common::Error {
    fn from(err: BundleError) -> Self {
        match err {
            BundleError::Io(source) => occ_common::Error::Io(source),
            BundleError::ChecksumMismatch { path, .. } | BundleError::SizeMismatch { path, .. } => {
                occ_common::Error::ChecksumMismatch { path }
            }
            other => occ_common::Error::Package(other.to_string()),
        }
    }
}

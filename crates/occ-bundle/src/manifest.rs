//! Submission manifest types and serialization.
//!
//! The manifest declares the accounting context of a run (boundary, standard,
//! horizon and window) and lists every packaged file with its SHA-256.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Current manifest schema version.
pub const MANIFEST_SCHEMA_VERSION: &str = "1.0.0";

/// Manifest file name, both inside the archive and in the output directory.
pub const MANIFEST_FILE_NAME: &str = "occ_manifest.json";

/// Manifest for one OCC submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionManifest {
    /// Manifest format version.
    pub manifest_version: String,

    /// Declared accounting boundary.
    pub boundary: String,

    /// Accounting standard label.
    pub standard: String,

    /// Stick horizon `T` in days.
    pub horizon_days: i64,

    /// Clearance window `W` in days.
    pub window_days: i64,

    /// Run identifier shared with diagnostics.json.
    pub run_id: String,

    /// When the manifest was created.
    pub created_at: DateTime<Utc>,

    /// Files included in the submission with checksums.
    pub files: Vec<FileEntry>,

    /// Harness version that produced the submission.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_version: Option<String>,
}

impl SubmissionManifest {
    /// Create a new manifest with required fields.
    pub fn new(
        run_id: impl Into<String>,
        boundary: impl Into<String>,
        standard: impl Into<String>,
        horizon_days: i64,
        window_days: i64,
    ) -> Self {
        Self {
            manifest_version: MANIFEST_SCHEMA_VERSION.to_string(),
            boundary: boundary.into(),
            standard: standard.into(),
            horizon_days,
            window_days,
            run_id: run_id.into(),
            created_at: Utc::now(),
            files: Vec::new(),
            tool_version: None,
        }
    }

    /// Set the harness version.
    pub fn with_tool_version(mut self, version: impl Into<String>) -> Self {
        self.tool_version = Some(version.into());
        self
    }

    /// Add a file entry to the manifest.
    pub fn add_file(&mut self, entry: FileEntry) {
        self.files.push(entry);
    }

    /// Total size of all listed files in bytes.
    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.bytes).sum()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Find a file by path.
    pub fn find_file(&self, path: &str) -> Option<&FileEntry> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Validate the manifest structure.
    pub fn validate(&self) -> crate::Result<()> {
        if self.manifest_version != MANIFEST_SCHEMA_VERSION {
            return Err(crate::BundleError::UnsupportedVersion {
                version: self.manifest_version.clone(),
                supported: MANIFEST_SCHEMA_VERSION.to_string(),
            });
        }

        if self.boundary.trim().is_empty() {
            return Err(crate::BundleError::CorruptedManifest(
                "boundary is empty".to_string(),
            ));
        }

        if self.standard.trim().is_empty() {
            return Err(crate::BundleError::CorruptedManifest(
                "standard is empty".to_string(),
            ));
        }

        if self.horizon_days < 0 || self.window_days < 1 {
            return Err(crate::BundleError::CorruptedManifest(format!(
                "horizon/window out of range: T={} W={}",
                self.horizon_days, self.window_days
            )));
        }

        for (idx, file) in self.files.iter().enumerate() {
            if file.path.is_empty() {
                return Err(crate::BundleError::CorruptedManifest(
                    "file entry has empty path".to_string(),
                ));
            }
            if file.path == MANIFEST_FILE_NAME {
                return Err(crate::BundleError::CorruptedManifest(
                    "manifest lists itself".to_string(),
                ));
            }
            if file.sha256.len() != 64 || !file.sha256.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(crate::BundleError::CorruptedManifest(format!(
                    "file '{}' has invalid checksum",
                    file.path
                )));
            }
            if self.files[..idx].iter().any(|f| f.path == file.path) {
                return Err(crate::BundleError::DuplicateFile(file.path.clone()));
            }
        }

        Ok(())
    }

    /// Sort files for deterministic ordering.
    pub fn sort_files(&mut self) {
        self.files.sort_by(|a, b| a.path.cmp(&b.path));
    }

    /// Serialize to JSON with consistent formatting.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// File entry in the manifest with checksum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Path within the package (relative).
    pub path: String,

    /// SHA-256 checksum (64 hex characters).
    pub sha256: String,

    /// Size in bytes.
    pub bytes: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl FileEntry {
    /// Create a new file entry.
    pub fn new(path: impl Into<String>, sha256: impl Into<String>, bytes: u64) -> Self {
        Self {
            path: path.into(),
            sha256: sha256.into(),
            bytes,
            mime_type: None,
        }
    }

    /// Build an entry directly from file content.
    pub fn for_data(path: impl Into<String>, data: &[u8]) -> Self {
        Self::new(path, Self::compute_checksum(data), data.len() as u64)
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Compute SHA-256 checksum of data.
    pub fn compute_checksum(data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        hex::encode(hasher.finalize())
    }

    /// Verify the checksum against data.
    pub fn verify(&self, data: &[u8]) -> bool {
        Self::compute_checksum(data) == self.sha256
    }
}

//! Submission reader for opening and verifying `submission.zip`.

use crate::manifest::MANIFEST_FILE_NAME;
use crate::{BundleError, FileEntry, Result, SubmissionManifest};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use tracing::{debug, info, warn};
use zip::ZipArchive;

/// Outcome of verifying every file a manifest lists.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VerificationReport {
    /// Files whose size and checksum matched.
    pub verified: Vec<String>,
    /// Files that failed, with the reason.
    pub failures: Vec<VerificationFailure>,
    /// Archive members the manifest does not mention.
    pub unlisted: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerificationFailure {
    pub path: String,
    pub reason: String,
}

impl VerificationReport {
    /// True when every listed file verified and nothing extra was found.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.unlisted.is_empty()
    }
}

/// Reader for submission packages with verification.
pub struct SubmissionReader<R: Read + Seek> {
    manifest: SubmissionManifest,
    archive: ZipArchive<R>,
}

impl SubmissionReader<File> {
    /// Open a package from a file path.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }
}

impl SubmissionReader<Cursor<Vec<u8>>> {
    /// Open a package from bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }
}

impl<R: Read + Seek> SubmissionReader<R> {
    /// Create a reader from any Read + Seek source.
    pub fn from_reader(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let manifest = Self::read_manifest(&mut archive)?;
        manifest.validate()?;

        info!(
            run_id = %manifest.run_id,
            files = manifest.file_count(),
            boundary = %manifest.boundary,
            "Submission opened"
        );

        Ok(Self { manifest, archive })
    }

    fn read_manifest(archive: &mut ZipArchive<R>) -> Result<SubmissionManifest> {
        let mut manifest_file = archive
            .by_name(MANIFEST_FILE_NAME)
            .map_err(|_| BundleError::MissingFile(MANIFEST_FILE_NAME.to_string()))?;

        let mut json = String::new();
        manifest_file.read_to_string(&mut json)?;

        SubmissionManifest::from_json(&json)
    }

    pub fn manifest(&self) -> &SubmissionManifest {
        &self.manifest
    }

    /// List all files the manifest declares.
    pub fn files(&self) -> &[FileEntry] {
        &self.manifest.files
    }

    pub fn has_file(&self, path: &str) -> bool {
        self.manifest.find_file(path).is_some()
    }

    /// Read a file without verification.
    pub fn read_raw(&mut self, path: &str) -> Result<Vec<u8>> {
        let mut file = self
            .archive
            .by_name(path)
            .map_err(|_| BundleError::FileNotFound(path.to_string()))?;

        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Read a file and check its size and checksum against the manifest.
    pub fn read_verified(&mut self, path: &str) -> Result<Vec<u8>> {
        let entry = self
            .manifest
            .find_file(path)
            .ok_or_else(|| BundleError::FileNotFound(path.to_string()))?
            .clone();

        let data = self.read_raw(path)?;

        let actual_bytes = data.len() as u64;
        if actual_bytes != entry.bytes {
            return Err(BundleError::SizeMismatch {
                path: path.to_string(),
                expected: entry.bytes,
                actual: actual_bytes,
            });
        }

        let actual_checksum = FileEntry::compute_checksum(&data);
        if actual_checksum != entry.sha256 {
            return Err(BundleError::ChecksumMismatch {
                path: path.to_string(),
                expected: entry.sha256,
                actual: actual_checksum,
            });
        }

        debug!(path, "File verified");
        Ok(data)
    }

    /// Read and parse a verified JSON file.
    pub fn read_json<T: serde::de::DeserializeOwned>(&mut self, path: &str) -> Result<T> {
        let data = self.read_verified(path)?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// Verify every listed file and flag archive members nobody listed.
    pub fn verify_all(&mut self) -> VerificationReport {
        let mut report = VerificationReport::default();

        let listed: Vec<String> = self.manifest.files.iter().map(|f| f.path.clone()).collect();
        for path in &listed {
            match self.read_verified(path) {
                Ok(_) => report.verified.push(path.clone()),
                Err(e) => {
                    warn!(path = %path, error = %e, "Verification failed");
                    report.failures.push(VerificationFailure {
                        path: path.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let listed: BTreeSet<&str> = listed.iter().map(String::as_str).collect();
        report.unlisted = self
            .archive
            .file_names()
            .filter(|name| *name != MANIFEST_FILE_NAME && !listed.contains(name))
            .map(str::to_string)
            .collect();
        report.unlisted.sort();

        if report.is_clean() {
            info!(files = report.verified.len(), "All files verified");
        } else {
            warn!(
                failures = report.failures.len(),
                unlisted = report.unlisted.len(),
                "Submission failed verification"
            );
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SubmissionWriter;

    fn create_package() -> Vec<u8> {
        let mut writer = SubmissionWriter::new(SubmissionManifest::new(
            "occ-run",
            "placeholder-boundary",
            "OCC Tier-1",
            30,
            90,
        ));
        writer
            .add_json("diagnostics.json", &serde_json::json!({"n_days": 2}))
            .unwrap();
        writer
            .add_file("timeseries.csv", b"date,lambda_exo\n".to_vec())
            .unwrap();
        let (bytes, _) = writer.write_to_vec().unwrap();
        bytes
    }

    #[test]
    fn test_reader_from_bytes() {
        let reader = SubmissionReader::from_bytes(create_package()).unwrap();
        assert_eq!(reader.manifest().run_id, "occ-run");
        assert_eq!(reader.files().len(), 2);
        assert!(reader.has_file("timeseries.csv"));
        assert!(!reader.has_file("missing.csv"));
    }

    #[test]
    fn test_reader_read_verified() {
        let mut reader = SubmissionReader::from_bytes(create_package()).unwrap();
        let data = reader.read_verified("timeseries.csv").unwrap();
        assert_eq!(data, b"date,lambda_exo\n");
    }

    #[test]
    fn test_reader_read_json() {
        let mut reader = SubmissionReader::from_bytes(create_package()).unwrap();
        let diagnostics: serde_json::Value = reader.read_json("diagnostics.json").unwrap();
        assert_eq!(diagnostics["n_days"], 2);
    }

    #[test]
    fn test_reader_verify_all_clean() {
        let mut reader = SubmissionReader::from_bytes(create_package()).unwrap();
        let report = reader.verify_all();
        assert!(report.is_clean(), "{:?}", report);
        assert_eq!(report.verified.len(), 2);
    }

    #[test]
    fn test_reader_missing_file() {
        let mut reader = SubmissionReader::from_bytes(create_package()).unwrap();
        let result = reader.read_verified("missing.csv");
        assert!(matches!(result, Err(BundleError::FileNotFound(_))));
    }

    #[test]
    fn test_reader_rejects_non_zip() {
        let result = SubmissionReader::from_bytes(b"not a zip".to_vec());
        assert!(matches!(result, Err(BundleError::Zip(_))));
    }
}

//! Submission writer for creating `submission.zip`.
//!
//! The manifest is always the first archive member; content files follow in
//! path order so two runs over the same outputs list files identically.

use crate::manifest::MANIFEST_FILE_NAME;
use crate::{BundleError, FileEntry, Result, SubmissionManifest};
use std::fs::File;
use std::io::{Cursor, Seek, Write};
use std::path::Path;
use tracing::{debug, info};
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

/// Content kinds found in a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Csv,
    Json,
    Binary,
}

impl FileType {
    fn mime_type(&self) -> &'static str {
        match self {
            FileType::Csv => "text/csv",
            FileType::Json => "application/json",
            FileType::Binary => "application/octet-stream",
        }
    }

    fn from_path(path: &str) -> Self {
        if path.ends_with(".csv") {
            FileType::Csv
        } else if path.ends_with(".json") {
            FileType::Json
        } else {
            FileType::Binary
        }
    }
}

/// Builder for submission packages.
pub struct SubmissionWriter {
    manifest: SubmissionManifest,
    files: Vec<(String, Vec<u8>)>,
}

impl SubmissionWriter {
    /// Create a writer around a manifest that has no files yet.
    pub fn new(manifest: SubmissionManifest) -> Self {
        Self {
            manifest,
            files: Vec::new(),
        }
    }

    /// Add a file with automatic checksum.
    pub fn add_file(&mut self, path: impl Into<String>, data: Vec<u8>) -> Result<()> {
        let path = path.into();
        if path == MANIFEST_FILE_NAME || self.manifest.find_file(&path).is_some() {
            return Err(BundleError::DuplicateFile(path));
        }

        let entry = FileEntry::for_data(path.as_str(), &data)
            .with_mime_type(FileType::from_path(&path).mime_type());
        let bytes = entry.bytes;

        debug!(path = %path, bytes, "Added file to submission");

        self.manifest.add_file(entry);
        self.files.push((path, data));
        Ok(())
    }

    /// Add a JSON-serializable value as a file.
    pub fn add_json<T: serde::Serialize>(
        &mut self,
        path: impl Into<String>,
        value: &T,
    ) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        self.add_file(path, json.into_bytes())
    }

    /// The manifest as it will be written (files sorted).
    pub fn manifest(&self) -> SubmissionManifest {
        let mut manifest = self.manifest.clone();
        manifest.sort_files();
        manifest
    }

    /// Total size in bytes before compression.
    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|(_, data)| data.len() as u64).sum()
    }

    /// File count (not including the manifest).
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Write the package to a file.
    pub fn write(self, path: &Path) -> Result<SubmissionManifest> {
        let file = File::create(path)?;
        let (manifest, files) = self.write_archive(file)?;

        info!(
            path = %path.display(),
            files,
            boundary = %manifest.boundary,
            "Submission written"
        );

        Ok(manifest)
    }

    /// Write the package to a byte vector (for in-memory use).
    pub fn write_to_vec(self) -> Result<(Vec<u8>, SubmissionManifest)> {
        let mut buffer = Cursor::new(Vec::new());
        let (manifest, files) = self.write_archive(&mut buffer)?;
        let bytes = buffer.into_inner();

        info!(
            files,
            compressed_bytes = bytes.len(),
            "Submission written to memory"
        );

        Ok((bytes, manifest))
    }

    fn write_archive<W: Write + Seek>(
        mut self,
        sink: W,
    ) -> Result<(SubmissionManifest, usize)> {
        if self.files.is_empty() {
            return Err(BundleError::EmptyBundle);
        }

        self.manifest.sort_files();
        self.files.sort_by(|a, b| a.0.cmp(&b.0));
        self.manifest.validate()?;

        let manifest_json = self.manifest.to_json()?;

        let mut zip = ZipWriter::new(sink);
        let options: FileOptions<'_, ()> = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);

        zip.start_file(MANIFEST_FILE_NAME, options)?;
        zip.write_all(manifest_json.as_bytes())?;

        for (file_path, data) in &self.files {
            zip.start_file(file_path.as_str(), options)?;
            zip.write_all(data)?;
        }

        zip.finish()?;

        Ok((self.manifest, self.files.len()))
    }
}

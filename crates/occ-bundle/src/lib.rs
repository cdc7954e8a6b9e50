//! Submission package writer/reader for the OCC harness.
//!
//! A submission is a ZIP archive that bundles the outputs of one run:
//! - `occ_manifest.json`: boundary, standard, horizon/window, file checksums
//! - `timeseries.csv`: the daily metric table
//! - `diagnostics.json`: run summary and invariant violations
//!
//! # Example
//!
//! ```no_run
//! use occ_bundle::{SubmissionManifest, SubmissionReader, SubmissionWriter};
//! use std::path::Path;
//!
//! let manifest = SubmissionManifest::new("occ-run", "placeholder-boundary", "OCC Tier-1", 30, 90);
//! let mut writer = SubmissionWriter::new(manifest);
//! writer.add_file("timeseries.csv", b"date\n".to_vec()).unwrap();
//! writer.write(Path::new("submission.zip")).unwrap();
//!
//! let mut reader = SubmissionReader::open(Path::new("submission.zip")).unwrap();
//! assert!(reader.verify_all().is_clean());
//! ```

pub mod error;
pub mod manifest;
pub mod reader;
pub mod writer;

pub use error::{BundleError, Result};
pub use manifest::{FileEntry, SubmissionManifest, MANIFEST_FILE_NAME, MANIFEST_SCHEMA_VERSION};
pub use reader::{SubmissionReader, VerificationFailure, VerificationReport};
pub use writer::{FileType, SubmissionWriter};

/// Archive file name written next to the other outputs.
pub const SUBMISSION_FILE_NAME: &str = "submission.zip";

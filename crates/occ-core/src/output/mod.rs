//! Output writers for a harness run.
//!
//! Every artifact is rendered to bytes first. The same bytes are written to
//! the output directory and packed into `submission.zip`, so the loose files
//! and the archived copies always carry identical checksums.

pub mod diagnostics;
pub mod timeseries;

pub use diagnostics::{Diagnostics, RunContext, DIAGNOSTICS_FILE_NAME};
pub use timeseries::{render_timeseries, write_timeseries, TIMESERIES_FILE_NAME};

use occ_bundle::{
    BundleError, SubmissionManifest, SubmissionWriter, MANIFEST_FILE_NAME, SUBMISSION_FILE_NAME,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Bundle(#[from] BundleError),
}

/// Paths of everything a run wrote.
#[derive(Debug, Clone, Serialize)]
pub struct WrittenOutputs {
    pub output_dir: PathBuf,
    pub timeseries: PathBuf,
    pub diagnostics: PathBuf,
    pub manifest: PathBuf,
    /// `None` when archiving was disabled.
    pub archive: Option<PathBuf>,
    #[serde(skip)]
    pub submission: SubmissionManifest,
}

/// Write timeseries, diagnostics, manifest and (optionally) the archive.
pub fn write_outputs(
    output_dir: &Path,
    manifest: SubmissionManifest,
    timeseries: Vec<u8>,
    diagnostics: &Diagnostics,
    archive: bool,
) -> Result<WrittenOutputs, OutputError> {
    fs::create_dir_all(output_dir).map_err(|source| OutputError::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let diagnostics_bytes = diagnostics.to_json()?.into_bytes();

    let timeseries_path = output_dir.join(TIMESERIES_FILE_NAME);
    let diagnostics_path = output_dir.join(DIAGNOSTICS_FILE_NAME);
    write_file(&timeseries_path, &timeseries)?;
    write_file(&diagnostics_path, &diagnostics_bytes)?;

    let mut writer = SubmissionWriter::new(manifest);
    writer.add_file(TIMESERIES_FILE_NAME, timeseries)?;
    writer.add_file(DIAGNOSTICS_FILE_NAME, diagnostics_bytes)?;

    let (submission, archive_path) = if archive {
        let path = output_dir.join(SUBMISSION_FILE_NAME);
        let submission = writer.write(&path)?;
        (submission, Some(path))
    } else {
        let submission = writer.manifest();
        submission.validate()?;
        (submission, None)
    };

    let manifest_path = output_dir.join(MANIFEST_FILE_NAME);
    write_file(&manifest_path, submission.to_json()?.as_bytes())?;

    Ok(WrittenOutputs {
        output_dir: output_dir.to_path_buf(),
        timeseries: timeseries_path,
        diagnostics: diagnostics_path,
        manifest: manifest_path,
        archive: archive_path,
        submission,
    })
}

fn write_file(path: &Path, data: &[u8]) -> Result<(), OutputError> {
    fs::write(path, data).map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = data.len(), "Wrote output file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{evaluate, EngineParams};
    use occ_bundle::SubmissionReader;
    use occ_config::ConfigSnapshot;
    use tempfile::TempDir;

    fn diagnostics() -> Diagnostics {
        let evaluation = evaluate(&[], &EngineParams::new(30, 90)).unwrap();
        Diagnostics::build(
            &evaluation,
            RunContext {
                run_id: "occ-run",
                ledger_path: Path::new("ledger.csv"),
                n_events: 0,
                unrecognized_events: 0,
                config: ConfigSnapshot::defaults_only(),
            },
        )
    }

    fn manifest() -> SubmissionManifest {
        SubmissionManifest::new("occ-run", "placeholder-boundary", "OCC Tier-1", 30, 90)
    }

    #[test]
    fn test_write_outputs_with_archive() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("nested").join("out");
        let timeseries = render_timeseries(&[], 30, 90).unwrap();

        let written = write_outputs(&out, manifest(), timeseries, &diagnostics(), true).unwrap();

        assert!(written.timeseries.exists());
        assert!(written.diagnostics.exists());
        assert!(written.manifest.exists());
        let archive = written.archive.clone().unwrap();
        assert!(archive.exists());

        let mut reader = SubmissionReader::open(&archive).unwrap();
        assert!(reader.verify_all().is_clean());

        let loose = fs::read(&written.timeseries).unwrap();
        assert_eq!(reader.read_verified(TIMESERIES_FILE_NAME).unwrap(), loose);
    }

    #[test]
    fn test_write_outputs_without_archive() {
        let temp = TempDir::new().unwrap();
        let timeseries = render_timeseries(&[], 30, 90).unwrap();

        let written =
            write_outputs(temp.path(), manifest(), timeseries, &diagnostics(), false).unwrap();

        assert!(written.archive.is_none());
        assert!(!temp.path().join(SUBMISSION_FILE_NAME).exists());
        let manifest_json = fs::read_to_string(&written.manifest).unwrap();
        let parsed = SubmissionManifest::from_json(&manifest_json).unwrap();
        assert_eq!(parsed.file_count(), 2);
        assert!(parsed.find_file(DIAGNOSTICS_FILE_NAME).is_some());
    }
}

//! No-mock submission package integration tests.
//!
//! Exercises real package creation and verification:
//! - Write to disk, reopen, verify every checksum
//! - Standalone manifest matches the archived copy
//! - Tampered content, tampered sizes and unlisted members are detected

use occ_bundle::{
    BundleError, SubmissionManifest, SubmissionReader, SubmissionWriter, MANIFEST_FILE_NAME,
};
use serde_json::json;
use std::io::{Cursor, Read, Write};
use tempfile::TempDir;
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

// ============================================================================
// Helpers
// ============================================================================

const TIMESERIES: &str = "date,lambda_exo,mu_a,mu_d_T30,rho_gen_T30,q_T30,backlog,dcr_W90\n\
2024-01-01,1,1,1,0,1.0000,0,1.0000\n";

fn build_package() -> (Vec<u8>, SubmissionManifest) {
    let manifest = SubmissionManifest::new(
        "occ-20260115-143022-abcd",
        "support-queue",
        "OCC Tier-1",
        30,
        90,
    )
    .with_tool_version("0.1.0-test");

    let mut writer = SubmissionWriter::new(manifest);
    writer
        .add_file("timeseries.csv", TIMESERIES.as_bytes().to_vec())
        .expect("add timeseries");
    writer
        .add_json(
            "diagnostics.json",
            &json!({
                "n_days": 1,
                "total_arrivals": 1,
                "invariant_violations": [],
            }),
        )
        .expect("add diagnostics");

    writer.write_to_vec().expect("write package")
}

/// Rebuild an archive from `entries`, keeping the original manifest.
fn rebuild(original: &[u8], entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut archive = zip::ZipArchive::new(Cursor::new(original.to_vec())).expect("open zip");
    let mut manifest = String::new();
    archive
        .by_name(MANIFEST_FILE_NAME)
        .expect("manifest present")
        .read_to_string(&mut manifest)
        .expect("read manifest");

    let mut buffer = Cursor::new(Vec::new());
    {
        let mut zip = ZipWriter::new(&mut buffer);
        let options: FileOptions<'_, ()> =
            FileOptions::default().compression_method(CompressionMethod::Deflated);
        zip.start_file(MANIFEST_FILE_NAME, options).unwrap();
        zip.write_all(manifest.as_bytes()).unwrap();
        for (name, data) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
    }
    buffer.into_inner()
}

// ============================================================================
// Round trip
// ============================================================================

#[test]
fn test_package_roundtrip_on_disk() {
    let temp = TempDir::new().expect("temp dir");
    let path = temp.path().join("submission.zip");

    let manifest = SubmissionManifest::new("occ-run", "support-queue", "OCC Tier-1", 14, 28);
    let mut writer = SubmissionWriter::new(manifest);
    writer
        .add_file("timeseries.csv", TIMESERIES.as_bytes().to_vec())
        .unwrap();
    writer
        .add_json("diagnostics.json", &json!({"n_days": 1}))
        .unwrap();
    let written = writer.write(&path).expect("write package");

    let mut reader = SubmissionReader::open(&path).expect("open package");
    assert_eq!(reader.manifest().boundary, "support-queue");
    assert_eq!(reader.manifest().horizon_days, 14);
    assert_eq!(reader.manifest().window_days, 28);
    assert_eq!(reader.manifest().files, written.files);

    let report = reader.verify_all();
    assert!(report.is_clean(), "unexpected failures: {:?}", report);
    assert_eq!(report.verified, vec!["diagnostics.json", "timeseries.csv"]);
}

#[test]
fn test_standalone_manifest_matches_archive_copy() {
    let (bytes, manifest) = build_package();
    let standalone = manifest.to_json().expect("manifest json");

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut archived = String::new();
    archive
        .by_name(MANIFEST_FILE_NAME)
        .unwrap()
        .read_to_string(&mut archived)
        .unwrap();

    assert_eq!(standalone, archived);
}

#[test]
fn test_timeseries_survives_compression() {
    let (bytes, _) = build_package();
    let mut reader = SubmissionReader::from_bytes(bytes).unwrap();
    let data = reader.read_verified("timeseries.csv").unwrap();
    assert_eq!(String::from_utf8(data).unwrap(), TIMESERIES);
}

// ============================================================================
// Tamper detection
// ============================================================================

#[test]
fn test_tampered_content_same_size_detected() {
    let (bytes, _) = build_package();
    let tampered_csv = TIMESERIES.replace("1.0000,0,", "0.0000,0,");
    assert_eq!(tampered_csv.len(), TIMESERIES.len());

    let mut reader = SubmissionReader::from_bytes(bytes.clone()).unwrap();
    let diagnostics = reader.read_raw("diagnostics.json").unwrap();

    let tampered = rebuild(
        &bytes,
        &[
            ("diagnostics.json", diagnostics.as_slice()),
            ("timeseries.csv", tampered_csv.as_bytes()),
        ],
    );

    let mut reader = SubmissionReader::from_bytes(tampered).unwrap();
    let err = reader.read_verified("timeseries.csv").unwrap_err();
    assert!(matches!(err, BundleError::ChecksumMismatch { .. }));

    let report = reader.verify_all();
    assert!(!report.is_clean());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path, "timeseries.csv");
}

#[test]
fn test_truncated_content_detected_as_size_mismatch() {
    let (bytes, _) = build_package();
    let mut reader = SubmissionReader::from_bytes(bytes.clone()).unwrap();
    let diagnostics = reader.read_raw("diagnostics.json").unwrap();

    let tampered = rebuild(
        &bytes,
        &[
            ("diagnostics.json", diagnostics.as_slice()),
            ("timeseries.csv", &b"date\n"[..]),
        ],
    );

    let mut reader = SubmissionReader::from_bytes(tampered).unwrap();
    let err = reader.read_verified("timeseries.csv").unwrap_err();
    assert!(matches!(err, BundleError::SizeMismatch { .. }));
}

#[test]
fn test_missing_and_unlisted_members_reported() {
    let (bytes, _) = build_package();

    let tampered = rebuild(
        &bytes,
        &[
            ("timeseries.csv", TIMESERIES.as_bytes()),
            ("extra.txt", &b"smuggled"[..]),
        ],
    );

    let mut reader = SubmissionReader::from_bytes(tampered).unwrap();
    let report = reader.verify_all();
    assert_eq!(report.verified, vec!["timeseries.csv"]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path, "diagnostics.json");
    assert_eq!(report.unlisted, vec!["extra.txt"]);
}

#[test]
fn test_archive_without_manifest_rejected() {
    let mut buffer = Cursor::new(Vec::new());
    {
        let mut zip = ZipWriter::new(&mut buffer);
        let options: FileOptions<'_, ()> = FileOptions::default();
        zip.start_file("timeseries.csv", options).unwrap();
        zip.write_all(TIMESERIES.as_bytes()).unwrap();
        zip.finish().unwrap();
    }

    let result = SubmissionReader::from_bytes(buffer.into_inner());
    assert!(matches!(result, Err(BundleError::MissingFile(_))));
}

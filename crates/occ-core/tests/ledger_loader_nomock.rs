//! Ledger loading and full pipeline runs against real files on disk.

use occ_bundle::{MANIFEST_FILE_NAME, SUBMISSION_FILE_NAME};
use occ_common::Error;
use occ_config::{ResolvedConfig, UnknownEventPolicy};
use occ_core::ledger::{load_ledger, EventKind, LedgerError, LoadOptions};
use occ_core::output::{DIAGNOSTICS_FILE_NAME, TIMESERIES_FILE_NAME};
use occ_core::pipeline::{self, RunRequest};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_ledger(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

const SAMPLE: &str = "\
item_id,event_type,timestamp,event_id,raw_event
X,start,2024-01-01T09:00:00Z,e1,opened
Y,start,2024-01-01 10:00:00,e2,opened
X,done,2024-01-01T17:00:00+00:00,e3,resolved
Y,attempt,2024-01-02,e4,worked
X,reopen,2024-01-05T10:00:00Z,e5,reopened
";

// ============================================================================
// Loader
// ============================================================================

mod loader {
    use super::*;

    #[test]
    fn loads_mixed_timestamp_formats() {
        let temp = TempDir::new().unwrap();
        let path = write_ledger(temp.path(), "ledger.csv", SAMPLE);

        let ledger = load_ledger(&path, &LoadOptions::default()).unwrap();
        assert_eq!(ledger.len(), 5);
        assert_eq!(ledger.item_count(), 2);
        assert_eq!(ledger.unrecognized, 0);
        assert_eq!(ledger.source.as_deref(), Some(path.as_path()));
        assert_eq!(ledger.events[0].event_id.as_deref(), Some("e1"));
        assert!(ledger
            .events
            .windows(2)
            .all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn sorts_out_of_order_rows_stably() {
        let temp = TempDir::new().unwrap();
        let path = write_ledger(
            temp.path(),
            "ledger.csv",
            "item_id,event_type,timestamp\n\
             B,start,2024-01-02T00:00:00Z\n\
             A,start,2024-01-01T00:00:00Z\n\
             C,start,2024-01-02T00:00:00Z\n",
        );

        let ledger = load_ledger(&path, &LoadOptions::default()).unwrap();
        let order: Vec<_> = ledger.events.iter().map(|e| e.item_id.as_str()).collect();
        assert_eq!(order, ["A", "B", "C"]);
    }

    #[test]
    fn retains_unknown_types_by_default() {
        let temp = TempDir::new().unwrap();
        let path = write_ledger(
            temp.path(),
            "ledger.csv",
            "item_id,event_type,timestamp\nA,Escalate,2024-01-01T00:00:00Z\n",
        );

        let ledger = load_ledger(&path, &LoadOptions::default()).unwrap();
        assert_eq!(ledger.unrecognized, 1);
        assert_eq!(
            ledger.events[0].kind,
            EventKind::Unrecognized("Escalate".to_string())
        );
    }

    #[test]
    fn rejects_unknown_types_when_strict() {
        let temp = TempDir::new().unwrap();
        let path = write_ledger(
            temp.path(),
            "ledger.csv",
            "item_id,event_type,timestamp\nA,start,2024-01-01T00:00:00Z\nA,escalate,2024-01-02T00:00:00Z\n",
        );
        let options = LoadOptions {
            unknown_event_types: UnknownEventPolicy::Reject,
        };

        let err = load_ledger(&path, &options).unwrap_err();
        assert!(matches!(err, LedgerError::UnknownEventType { row: 2, .. }));
    }

    #[test]
    fn missing_column_fails() {
        let temp = TempDir::new().unwrap();
        let path = write_ledger(
            temp.path(),
            "ledger.csv",
            "item_id,timestamp\nA,2024-01-01T00:00:00Z\n",
        );

        let err = load_ledger(&path, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LedgerError::MissingColumn(ref c) if c == "event_type"));
    }

    #[test]
    fn bad_timestamp_reports_row() {
        let temp = TempDir::new().unwrap();
        let path = write_ledger(
            temp.path(),
            "ledger.csv",
            "item_id,event_type,timestamp\nA,start,2024-01-01T00:00:00Z\nB,start,yesterday\n",
        );

        let err = load_ledger(&path, &LoadOptions::default()).unwrap_err();
        assert_eq!(err.row(), Some(2));
        assert!(matches!(err, LedgerError::BadTimestamp { ref value, .. } if value == "yesterday"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_ledger(Path::new("/nonexistent/ledger.csv"), &LoadOptions::default())
            .unwrap_err();
        assert!(matches!(err, LedgerError::Io { .. }));
    }
}

// ============================================================================
// Pipeline
// ============================================================================

mod pipeline_runs {
    use super::*;

    fn request(ledger: PathBuf, out: PathBuf, archive: bool) -> RunRequest {
        RunRequest {
            ledger_path: ledger,
            output_dir: out,
            config: ResolvedConfig::defaults(),
            archive,
        }
    }

    #[test]
    fn full_run_writes_verifiable_package() {
        let temp = TempDir::new().unwrap();
        let ledger = write_ledger(temp.path(), "ledger.csv", SAMPLE);
        let out = temp.path().join("out");

        let report = pipeline::run(&request(ledger, out.clone(), true)).unwrap();

        assert_eq!(report.n_events, 5);
        assert_eq!(report.summary.n_days, 5);
        assert_eq!(report.summary.total_bounced, 1);
        assert!(!report.has_violations());

        for name in [
            TIMESERIES_FILE_NAME,
            DIAGNOSTICS_FILE_NAME,
            MANIFEST_FILE_NAME,
            SUBMISSION_FILE_NAME,
        ] {
            assert!(out.join(name).exists(), "{} missing", name);
        }

        let (manifest, verification) =
            pipeline::verify_submission(&out.join(SUBMISSION_FILE_NAME)).unwrap();
        assert!(verification.is_clean());
        assert_eq!(manifest.run_id, report.run_id);
        assert_eq!(manifest.horizon_days, 30);
        assert_eq!(manifest.window_days, 90);
    }

    #[test]
    fn timeseries_matches_engine_output() {
        let temp = TempDir::new().unwrap();
        let ledger = write_ledger(temp.path(), "ledger.csv", SAMPLE);
        let out = temp.path().join("out");

        pipeline::run(&request(ledger, out.clone(), false)).unwrap();

        let text = fs::read_to_string(out.join(TIMESERIES_FILE_NAME)).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines[0],
            "date,lambda_exo,mu_a,mu_d_T30,rho_gen_T30,q_T30,backlog,dcr_W90"
        );
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[1], "2024-01-01,2,1,0,1,0.0000,1,0.0000");
        assert_eq!(lines[5], "2024-01-05,0,0,0,0,,2,0.0000");
        assert!(!out.join(SUBMISSION_FILE_NAME).exists());
    }

    #[test]
    fn diagnostics_record_provenance() {
        let temp = TempDir::new().unwrap();
        let ledger = write_ledger(temp.path(), "ledger.csv", SAMPLE);
        let out = temp.path().join("out");

        let report = pipeline::run(&request(ledger, out.clone(), true)).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.join(DIAGNOSTICS_FILE_NAME)).unwrap())
                .unwrap();
        assert_eq!(value["run_id"], report.run_id.as_str());
        assert_eq!(value["n_days"], 5);
        assert_eq!(value["total_arrivals"], 2);
        assert_eq!(value["regime_classification"], "backlog_growth");
        assert!(Path::new(value["ledger_path"].as_str().unwrap()).is_absolute());
    }

    #[test]
    fn malformed_ledger_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let ledger = write_ledger(
            temp.path(),
            "ledger.csv",
            "item_id,event_type,timestamp\nA,start,not-a-time\n",
        );
        let out = temp.path().join("out");

        let err = pipeline::run(&request(ledger, out.clone(), true)).unwrap_err();
        assert!(matches!(err, Error::MalformedLedger { row: 1, .. }));
        assert!(!out.exists());
    }
}

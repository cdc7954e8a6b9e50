//! End-to-end tests for the `occ` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const LEDGER: &str = "\
item_id,event_type,timestamp
X,start,2024-01-01T09:00:00Z
Y,start,2024-01-01T10:00:00Z
X,done,2024-01-01T17:00:00Z
X,reopen,2024-01-05T10:00:00Z
Y,done,2024-01-06T10:00:00Z
";

/// `occ` with configuration discovery pinned to `home`.
fn occ(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("occ").unwrap();
    cmd.env_remove("OCC_CONFIG")
        .env_remove("OCC_CONFIG_DIR")
        .env_remove("OCC_HORIZON_DAYS")
        .env_remove("OCC_WINDOW_DAYS")
        .env_remove("OCC_LOG")
        .env_remove("OCC_LOG_FORMAT")
        .env_remove("RUST_LOG")
        .env("XDG_CONFIG_HOME", home.join("xdg"))
        .env("HOME", home);
    cmd
}

fn write_ledger(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("ledger.csv");
    fs::write(&path, contents).unwrap();
    path
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

// ============================================================================
// run
// ============================================================================

mod run {
    use super::*;

    #[test]
    fn writes_outputs_and_reports_json() {
        let temp = TempDir::new().unwrap();
        let ledger = write_ledger(temp.path(), LEDGER);
        let out = temp.path().join("out");

        let output = occ(temp.path())
            .args(["run", "--ledger"])
            .arg(&ledger)
            .arg("--output-dir")
            .arg(&out)
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(0));
        let json = stdout_json(&output);
        assert_eq!(json["status"], "OK_CLEAN");
        assert_eq!(json["summary"]["n_days"], 6);
        assert_eq!(json["summary"]["total_bounced"], 1);
        assert!(json["run_id"].as_str().unwrap().starts_with("occ-"));

        for name in [
            "timeseries.csv",
            "diagnostics.json",
            "occ_manifest.json",
            "submission.zip",
        ] {
            assert!(out.join(name).exists(), "{} missing", name);
        }
    }

    #[test]
    fn parameter_overrides_shape_header() {
        let temp = TempDir::new().unwrap();
        let ledger = write_ledger(temp.path(), LEDGER);
        let out = temp.path().join("out");

        occ(temp.path())
            .args(["run", "--horizon-days", "2", "--window-days", "7", "--ledger"])
            .arg(&ledger)
            .arg("--output-dir")
            .arg(&out)
            .assert()
            .success();

        let csv = fs::read_to_string(out.join("timeseries.csv")).unwrap();
        assert!(csv.starts_with("date,lambda_exo,mu_a,mu_d_T2,rho_gen_T2,q_T2,backlog,dcr_W7\n"));
        // Reopen on day 5 is beyond a 2-day horizon, so day 1 sticks.
        assert!(csv.contains("2024-01-01,2,1,1,0,1.0000,1,0.5000"));
    }

    #[test]
    fn no_archive_skips_zip() {
        let temp = TempDir::new().unwrap();
        let ledger = write_ledger(temp.path(), LEDGER);
        let out = temp.path().join("out");

        occ(temp.path())
            .args(["run", "--no-archive", "--ledger"])
            .arg(&ledger)
            .arg("--output-dir")
            .arg(&out)
            .assert()
            .success();

        assert!(out.join("occ_manifest.json").exists());
        assert!(!out.join("submission.zip").exists());
    }

    #[test]
    fn summary_format_is_one_line() {
        let temp = TempDir::new().unwrap();
        let ledger = write_ledger(temp.path(), LEDGER);

        occ(temp.path())
            .args(["-f", "summary", "run", "--ledger"])
            .arg(&ledger)
            .arg("--output-dir")
            .arg(temp.path().join("out"))
            .assert()
            .success()
            .stdout(predicate::str::starts_with("[occ-").and(predicate::str::contains("6 days")));
    }

    #[test]
    fn malformed_ledger_exits_with_input_error() {
        let temp = TempDir::new().unwrap();
        let ledger = write_ledger(
            temp.path(),
            "item_id,event_type,timestamp\nX,start,not-a-date\n",
        );
        let out = temp.path().join("out");

        occ(temp.path())
            .args(["run", "--ledger"])
            .arg(&ledger)
            .arg("--output-dir")
            .arg(&out)
            .assert()
            .code(11)
            .stderr(predicate::str::contains("\"status\": \"error\""))
            .stderr(predicate::str::contains("not-a-date"));

        assert!(!out.exists());
    }

    #[test]
    fn missing_column_exits_with_input_error() {
        let temp = TempDir::new().unwrap();
        let ledger = write_ledger(temp.path(), "item_id,timestamp\nX,2024-01-01\n");

        occ(temp.path())
            .args(["run", "--ledger"])
            .arg(&ledger)
            .arg("--output-dir")
            .arg(temp.path().join("out"))
            .assert()
            .code(11)
            .stderr(predicate::str::contains("event_type"));
    }

    #[test]
    fn invalid_window_exits_with_config_error() {
        let temp = TempDir::new().unwrap();
        let ledger = write_ledger(temp.path(), LEDGER);

        occ(temp.path())
            .args(["run", "--window-days", "0", "--ledger"])
            .arg(&ledger)
            .arg("--output-dir")
            .arg(temp.path().join("out"))
            .assert()
            .code(12)
            .stderr(predicate::str::contains("window_days"));
    }

    #[test]
    fn strict_policy_rejects_unknown_types() {
        let temp = TempDir::new().unwrap();
        let ledger = write_ledger(
            temp.path(),
            "item_id,event_type,timestamp\nX,start,2024-01-01\nX,escalate,2024-01-02\n",
        );

        occ(temp.path())
            .args(["run", "--unknown-event-types", "reject", "--ledger"])
            .arg(&ledger)
            .arg("--output-dir")
            .arg(temp.path().join("out"))
            .assert()
            .code(11);
    }

    #[test]
    fn jsonl_logs_go_to_stderr() {
        let temp = TempDir::new().unwrap();
        let ledger = write_ledger(temp.path(), LEDGER);

        let output = occ(temp.path())
            .args(["-v", "--log-format", "jsonl", "run", "--ledger"])
            .arg(&ledger)
            .arg("--output-dir")
            .arg(temp.path().join("out"))
            .output()
            .unwrap();

        assert!(output.status.success());
        // stdout stays a single JSON document
        stdout_json(&output);
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("\"event\":\"run.started\""));
        assert!(stderr.contains("\"event\":\"package.written\""));
    }
}

// ============================================================================
// check / verify
// ============================================================================

mod check_and_verify {
    use super::*;

    #[test]
    fn check_reports_valid_ledger() {
        let temp = TempDir::new().unwrap();
        let ledger = write_ledger(temp.path(), LEDGER);

        let output = occ(temp.path())
            .args(["check", "--ledger"])
            .arg(&ledger)
            .output()
            .unwrap();

        assert!(output.status.success());
        let json = stdout_json(&output);
        assert_eq!(json["status"], "valid");
        assert_eq!(json["ledger"]["events"], 5);
        assert_eq!(json["ledger"]["items"], 2);
        assert!(!temp.path().join("out").exists());
    }

    #[test]
    fn verify_accepts_fresh_package() {
        let temp = TempDir::new().unwrap();
        let ledger = write_ledger(temp.path(), LEDGER);
        let out = temp.path().join("out");

        occ(temp.path())
            .args(["run", "--ledger"])
            .arg(&ledger)
            .arg("--output-dir")
            .arg(&out)
            .assert()
            .success();

        occ(temp.path())
            .arg("verify")
            .arg(out.join("submission.zip"))
            .assert()
            .success()
            .stdout(predicate::str::contains("\"status\": \"verified\""));
    }

    #[test]
    fn verify_rejects_non_archive() {
        let temp = TempDir::new().unwrap();
        let bogus = temp.path().join("submission.zip");
        fs::write(&bogus, b"not a zip").unwrap();

        occ(temp.path())
            .arg("verify")
            .arg(&bogus)
            .assert()
            .failure()
            .stderr(predicate::str::contains("error"));
    }
}

// ============================================================================
// config / schema / version
// ============================================================================

mod inspection {
    use super::*;

    #[test]
    fn config_show_defaults() {
        let temp = TempDir::new().unwrap();

        let output = occ(temp.path())
            .args(["config", "show"])
            .output()
            .unwrap();

        assert!(output.status.success());
        let json = stdout_json(&output);
        assert_eq!(json["source"]["using_defaults"], true);
        assert_eq!(json["values"]["horizon_days"], 30);
        assert_eq!(json["values"]["window_days"], 90);
    }

    #[test]
    fn config_show_explicit_file() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("harness.json");
        fs::write(&config, r#"{"horizon_days": 7, "boundary": "support-queue"}"#).unwrap();

        let output = occ(temp.path())
            .arg("--config")
            .arg(&config)
            .args(["config", "show"])
            .output()
            .unwrap();

        assert!(output.status.success());
        let json = stdout_json(&output);
        assert_eq!(json["source"]["kind"], "cli_argument");
        assert_eq!(json["values"]["horizon_days"], 7);
        assert_eq!(json["values"]["boundary"], "support-queue");
    }

    #[test]
    fn missing_config_file_is_config_error() {
        let temp = TempDir::new().unwrap();

        occ(temp.path())
            .arg("--config")
            .arg(temp.path().join("absent.json"))
            .args(["config", "show"])
            .assert()
            .code(12);
    }

    #[test]
    fn schema_list_names_types() {
        let temp = TempDir::new().unwrap();

        occ(temp.path())
            .args(["schema", "--list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("DailyRecord"))
            .stdout(predicate::str::contains("Diagnostics"));
    }

    #[test]
    fn schema_for_type() {
        let temp = TempDir::new().unwrap();

        let output = occ(temp.path())
            .args(["schema", "RunSummary"])
            .output()
            .unwrap();

        assert!(output.status.success());
        let json = stdout_json(&output);
        assert!(json["properties"]["max_backlog"].is_object());
    }

    #[test]
    fn unknown_schema_is_args_error() {
        let temp = TempDir::new().unwrap();

        occ(temp.path())
            .args(["schema", "NoSuchType"])
            .assert()
            .code(10);
    }

    #[test]
    fn version_reports_json() {
        let temp = TempDir::new().unwrap();

        occ(temp.path())
            .arg("version")
            .assert()
            .success()
            .stdout(predicate::str::contains("occ_version"));
    }
}

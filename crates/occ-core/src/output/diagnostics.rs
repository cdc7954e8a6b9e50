//! `diagnostics.json`: run summary, invariant violations, and provenance.

use crate::engine::{Evaluation, InvariantViolation};
use chrono::{DateTime, Utc};
use occ_config::ConfigSnapshot;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DIAGNOSTICS_FILE_NAME: &str = "diagnostics.json";

/// Contents of `diagnostics.json`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Diagnostics {
    pub schema_version: String,
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub tool_version: String,

    /// Absolute path of the ledger the run read.
    pub ledger_path: String,
    pub boundary: String,
    pub standard: String,
    pub horizon_days: i64,
    pub window_days: i64,

    pub n_days: usize,
    pub n_events: usize,
    pub total_arrivals: u64,
    pub total_attempts: u64,
    /// Sum of observable stuck completions.
    pub total_completions: u64,
    pub total_bounced: u64,
    pub max_backlog: u64,
    /// Days whose stuck/bounced counts could not be measured.
    pub unobservable_days: usize,
    pub unobservable_completions: usize,
    /// Retained events whose type was not a lifecycle primitive.
    pub unrecognized_events: usize,

    pub invariant_violations: Vec<InvariantViolation>,
    /// `backlog_growth`, `stable_or_declining`, or empty when there are no days.
    pub regime_classification: String,

    pub config: ConfigSnapshot,
}

/// Inputs describing a run that the engine does not know about.
#[derive(Debug, Clone)]
pub struct RunContext<'a> {
    pub run_id: &'a str,
    pub ledger_path: &'a Path,
    pub n_events: usize,
    pub unrecognized_events: usize,
    pub config: ConfigSnapshot,
}

impl Diagnostics {
    pub fn build(evaluation: &Evaluation, ctx: RunContext<'_>) -> Self {
        let summary = &evaluation.summary;
        let ledger_path = std::path::absolute(ctx.ledger_path)
            .unwrap_or_else(|_| ctx.ledger_path.to_path_buf());

        Diagnostics {
            schema_version: occ_common::SCHEMA_VERSION.to_string(),
            run_id: ctx.run_id.to_string(),
            generated_at: Utc::now(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            ledger_path: ledger_path.display().to_string(),
            boundary: ctx.config.boundary.clone(),
            standard: ctx.config.standard.clone(),
            horizon_days: ctx.config.horizon_days,
            window_days: ctx.config.window_days,
            n_days: summary.n_days,
            n_events: ctx.n_events,
            total_arrivals: summary.total_arrivals,
            total_attempts: summary.total_attempts,
            total_completions: summary.total_stuck,
            total_bounced: summary.total_bounced,
            max_backlog: summary.max_backlog,
            unobservable_days: summary.unobservable_days,
            unobservable_completions: evaluation.unobservable_completions,
            unrecognized_events: ctx.unrecognized_events,
            invariant_violations: evaluation.violations.clone(),
            regime_classification: summary.regime_label().to_string(),
            config: ctx.config,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{evaluate, EngineParams};
    use crate::ledger::{Event, EventKind};

    fn evaluation() -> Evaluation {
        let ts = |s: &str| chrono::DateTime::parse_from_rfc3339(s).unwrap();
        let events = vec![
            Event::new("X", EventKind::Start, ts("2024-01-01T09:00:00Z")),
            Event::new("Y", EventKind::Start, ts("2024-01-02T09:00:00Z")),
        ];
        evaluate(&events, &EngineParams::new(30, 90)).unwrap()
    }

    #[test]
    fn test_build_from_evaluation() {
        let diagnostics = Diagnostics::build(
            &evaluation(),
            RunContext {
                run_id: "occ-20260115-143022-a7xq",
                ledger_path: Path::new("ledger.csv"),
                n_events: 2,
                unrecognized_events: 0,
                config: ConfigSnapshot::defaults_only(),
            },
        );

        assert_eq!(diagnostics.n_days, 2);
        assert_eq!(diagnostics.total_arrivals, 2);
        assert_eq!(diagnostics.total_completions, 0);
        assert_eq!(diagnostics.max_backlog, 2);
        assert_eq!(diagnostics.regime_classification, "backlog_growth");
        assert!(Path::new(&diagnostics.ledger_path).is_absolute());
        assert_eq!(diagnostics.horizon_days, 30);
        assert_eq!(diagnostics.boundary, "placeholder-boundary");
    }

    #[test]
    fn test_json_shape() {
        let diagnostics = Diagnostics::build(
            &evaluation(),
            RunContext {
                run_id: "occ-run",
                ledger_path: Path::new("/tmp/ledger.csv"),
                n_events: 2,
                unrecognized_events: 1,
                config: ConfigSnapshot::defaults_only(),
            },
        );
        let value: serde_json::Value =
            serde_json::from_str(&diagnostics.to_json().unwrap()).unwrap();
        assert_eq!(value["ledger_path"], "/tmp/ledger.csv");
        assert_eq!(value["invariant_violations"], serde_json::json!([]));
        assert_eq!(value["unrecognized_events"], 1);
        assert_eq!(value["config"]["window_days"], 90);
    }
}

//! Run-level summary scalars.

use super::aggregate::DailyRecord;
use super::invariants::InvariantViolation;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Coarse backlog direction, comparing the first and last day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BacklogTrend {
    BacklogGrowth,
    StableOrDeclining,
}

impl BacklogTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            BacklogTrend::BacklogGrowth => "backlog_growth",
            BacklogTrend::StableOrDeclining => "stable_or_declining",
        }
    }
}

impl std::fmt::Display for BacklogTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Totals across all days of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RunSummary {
    pub n_days: usize,
    pub total_arrivals: u64,
    pub total_attempts: u64,
    /// Sum of observable stuck counts.
    pub total_stuck: u64,
    /// Sum of observable bounce counts.
    pub total_bounced: u64,
    pub max_backlog: u64,
    /// `None` when there are no days.
    pub backlog_trend: Option<BacklogTrend>,
    /// Days whose stuck/bounced counts are unobservable.
    pub unobservable_days: usize,
    pub violation_count: usize,
}

impl RunSummary {
    pub fn summarize(records: &[DailyRecord], violations: &[InvariantViolation]) -> Self {
        let backlog_trend = match (records.first(), records.last()) {
            (Some(first), Some(last)) if last.backlog > first.backlog => {
                Some(BacklogTrend::BacklogGrowth)
            }
            (Some(_), Some(_)) => Some(BacklogTrend::StableOrDeclining),
            _ => None,
        };

        RunSummary {
            n_days: records.len(),
            total_arrivals: records.iter().map(|r| r.arrivals).sum(),
            total_attempts: records.iter().map(|r| r.attempts).sum(),
            total_stuck: records.iter().filter_map(|r| r.stuck).sum(),
            total_bounced: records.iter().filter_map(|r| r.bounced).sum(),
            max_backlog: records.iter().map(|r| r.backlog).max().unwrap_or(0),
            backlog_trend,
            unobservable_days: records.iter().filter(|r| r.stuck.is_none()).count(),
            violation_count: violations.len(),
        }
    }

    /// Regime label as written to diagnostics; empty when there are no days.
    pub fn regime_label(&self) -> &'static str {
        self.backlog_trend.map(|t| t.as_str()).unwrap_or("")
    }
}

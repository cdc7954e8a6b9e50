//! Closure identity check: `attempts == stuck + bounced` on observable days.

use super::aggregate::DailyRecord;
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A day where the closure identity does not hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct InvariantViolation {
    pub date: NaiveDate,
    pub attempts: u64,
    pub stuck: u64,
    pub bounced: u64,
}

/// Check every record. Days with unobservable counts are skipped, not passed.
pub fn check_closure(records: &[DailyRecord]) -> Vec<InvariantViolation> {
    records
        .iter()
        .filter_map(|r| match (r.stuck, r.bounced) {
            (Some(stuck), Some(bounced)) if stuck + bounced != r.attempts => {
                debug!(
                    date = %r.date,
                    attempts = r.attempts,
                    stuck,
                    bounced,
                    "Closure identity violated"
                );
                Some(InvariantViolation {
                    date: r.date,
                    attempts: r.attempts,
                    stuck,
                    bounced,
                })
            }
            _ => None,
        })
        .collect()
}

//! Event correlation and daily aggregation engine.
//!
//! Data flows one way:
//! 1. [`classify`] flags every completion as stuck, bounced or unobservable
//! 2. [`aggregate`] buckets the stream into days and tracks the backlog
//! 3. [`window`] attaches the trailing clearance ratio to each day
//! 4. [`invariants`] checks the closure identity without touching the records
//!
//! The engine is pure: no I/O, no global state. All mutable state lives for a
//! single call to [`evaluate`].

pub mod aggregate;
pub mod classify;
pub mod invariants;
pub mod summary;
pub mod window;

pub use aggregate::{aggregate_days, DailyRecord, OpenItemSet};
pub use classify::{classify_completions, Classification};
pub use invariants::{check_closure, InvariantViolation};
pub use summary::{BacklogTrend, RunSummary};
pub use window::RollingWindow;

use crate::ledger::Event;
use chrono::{DateTime, FixedOffset};
use thiserror::Error;
use tracing::debug;

/// Engine errors. Both are boundary contract failures raised before any
/// aggregation happens.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter { name: &'static str, message: String },

    #[error("event {index} at {current} precedes its predecessor at {previous}")]
    UnsortedInput {
        index: usize,
        previous: DateTime<FixedOffset>,
        current: DateTime<FixedOffset>,
    },
}

/// Horizon and window for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineParams {
    /// Horizon `T` in days; `>= 0`.
    pub horizon_days: i64,
    /// Window `W` in days; `>= 1`.
    pub window_days: i64,
}

impl EngineParams {
    pub fn new(horizon_days: i64, window_days: i64) -> Self {
        Self {
            horizon_days,
            window_days,
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.horizon_days < 0 {
            return Err(EngineError::InvalidParameter {
                name: "horizon_days",
                message: format!("must be >= 0, got {}", self.horizon_days),
            });
        }
        if self.window_days < 1 {
            return Err(EngineError::InvalidParameter {
                name: "window_days",
                message: format!("must be >= 1, got {}", self.window_days),
            });
        }
        Ok(())
    }
}

/// Full engine output.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub records: Vec<DailyRecord>,
    pub violations: Vec<InvariantViolation>,
    pub summary: RunSummary,
    /// Completions classified unobservable.
    pub unobservable_completions: usize,
}

/// Run the engine over a sorted event stream.
pub fn evaluate(events: &[Event], params: &EngineParams) -> Result<Evaluation, EngineError> {
    params.validate()?;
    ensure_sorted(events)?;

    let classifications = classify_completions(events, params.horizon_days);
    let unobservable_completions = classifications
        .iter()
        .filter(|c| matches!(c, Some(Classification::Unobservable)))
        .count();
    debug!(
        events = events.len(),
        completions = classifications.iter().flatten().count(),
        unobservable = unobservable_completions,
        "Completions classified"
    );

    let mut window = RollingWindow::new(params.window_days);
    let records = aggregate_days(events, &classifications, &mut window);
    let violations = check_closure(&records);
    let summary = RunSummary::summarize(&records, &violations);

    debug!(
        days = summary.n_days,
        violations = violations.len(),
        "Aggregation complete"
    );

    Ok(Evaluation {
        records,
        violations,
        summary,
        unobservable_completions,
    })
}

/// Reject a stream whose timestamps go backwards.
pub fn ensure_sorted(events: &[Event]) -> Result<(), EngineError> {
    match events
        .windows(2)
        .position(|pair| pair[1].timestamp < pair[0].timestamp)
    {
        Some(pos) => Err(EngineError::UnsortedInput {
            index: pos + 1,
            previous: events[pos].timestamp,
            current: events[pos + 1].timestamp,
        }),
        None => Ok(()),
    }
}

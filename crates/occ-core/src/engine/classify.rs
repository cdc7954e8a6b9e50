//! Completion classification.
//!
//! Each `done` event is classified by a forward scan over the remaining events
//! of the same item, bounded by the horizon. Items never look at each other's
//! timelines.

use crate::ledger::{Event, EventKind};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Outcome for one completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// No same-item reopening within the horizon.
    Stuck,
    /// A same-item reopening at or before `t + T`.
    Bounced,
    /// The item's timeline holds an event that cannot be resolved inside the
    /// horizon, so the outcome is not measurable.
    Unobservable,
}

/// Horizon as a duration. `None` means the horizon does not fit in a
/// `TimeDelta` and is treated as unbounded.
pub fn horizon_delta(horizon_days: i64) -> Option<TimeDelta> {
    TimeDelta::try_days(horizon_days)
}

/// Classify every completion in `events`.
///
/// The result is indexed by event position: `Some` for `done` events, `None`
/// for everything else. `events` must already be sorted by timestamp.
pub fn classify_completions(events: &[Event], horizon_days: i64) -> Vec<Option<Classification>> {
    let horizon = horizon_delta(horizon_days);
    let mut out = vec![None; events.len()];

    for positions in timelines(events).values() {
        for (cursor, &origin) in positions.iter().enumerate() {
            if events[origin].kind != EventKind::Done {
                continue;
            }
            out[origin] = Some(scan_forward(events, &positions[cursor + 1..], origin, horizon));
        }
    }

    out
}

/// Per-item arena of event positions, in stream order.
fn timelines(events: &[Event]) -> HashMap<&str, Vec<usize>> {
    let mut arena: HashMap<&str, Vec<usize>> = HashMap::new();
    for (idx, event) in events.iter().enumerate() {
        arena.entry(event.item_id.as_str()).or_default().push(idx);
    }
    arena
}

fn scan_forward(
    events: &[Event],
    rest: &[usize],
    origin: usize,
    horizon: Option<TimeDelta>,
) -> Classification {
    let deadline = horizon.and_then(|h| events[origin].timestamp.checked_add_signed(h));

    for &idx in rest {
        let event = &events[idx];
        if let Some(deadline) = deadline {
            if event.timestamp > deadline {
                break;
            }
        }
        match event.kind {
            EventKind::Reopen => return Classification::Bounced,
            EventKind::Unrecognized(_) => return Classification::Unobservable,
            EventKind::Start | EventKind::Attempt | EventKind::Done => {}
        }
    }

    Classification::Stuck
}

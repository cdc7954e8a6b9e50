//! Day-bucketed aggregation.
//!
//! One chronological pass over the sorted stream. Days run from the first
//! event's date to the last event's date inclusive, in the UTC offset of the
//! first event, and every day in between gets a record.

use super::classify::Classification;
use super::window::RollingWindow;
use crate::ledger::{Event, EventKind};
use chrono::{DateTime, FixedOffset, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::trace;

/// Metrics for one calendar day. `None` means unobservable, never zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DailyRecord {
    pub date: NaiveDate,
    /// `start` events on this day.
    pub arrivals: u64,
    /// `done` events on this day.
    pub attempts: u64,
    /// Completions that did not reopen within the horizon.
    pub stuck: Option<u64>,
    /// Completions that reopened within the horizon.
    pub bounced: Option<u64>,
    /// `stuck / attempts`; null when there were no attempts.
    pub stick_rate: Option<f64>,
    /// Open items after the day's last event.
    pub backlog: u64,
    /// Trailing-window `Σstuck / Σarrivals`.
    pub clearance_ratio: Option<f64>,
}

/// Items currently open, keyed by item id, holding the time they (re)entered.
#[derive(Debug, Default)]
pub struct OpenItemSet<'a> {
    items: HashMap<&'a str, DateTime<FixedOffset>>,
}

impl<'a> OpenItemSet<'a> {
    pub fn open(&mut self, item_id: &'a str, at: DateTime<FixedOffset>) {
        self.items.insert(item_id, at);
    }

    pub fn close(&mut self, item_id: &str) {
        self.items.remove(item_id);
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.items.contains_key(item_id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Default)]
struct DayCounts {
    arrivals: u64,
    attempts: u64,
    stuck: u64,
    bounced: u64,
    poisoned: bool,
}

impl DayCounts {
    fn finish(self, date: NaiveDate, backlog: usize) -> DailyRecord {
        let (stuck, bounced) = if self.poisoned {
            (None, None)
        } else {
            (Some(self.stuck), Some(self.bounced))
        };
        let stick_rate = stuck
            .filter(|_| self.attempts > 0)
            .map(|s| s as f64 / self.attempts as f64);

        DailyRecord {
            date,
            arrivals: self.arrivals,
            attempts: self.attempts,
            stuck,
            bounced,
            stick_rate,
            backlog: backlog as u64,
            clearance_ratio: None,
        }
    }
}

/// Local calendar date of `ts` in `offset`.
pub fn bucket_date(ts: &DateTime<FixedOffset>, offset: &FixedOffset) -> NaiveDate {
    ts.with_timezone(offset).date_naive()
}

/// Build one record per day, attaching the window ratio as each day closes.
///
/// `classifications` is indexed like `events`. `events` must be sorted.
pub fn aggregate_days(
    events: &[Event],
    classifications: &[Option<Classification>],
    window: &mut RollingWindow,
) -> Vec<DailyRecord> {
    let (Some(first), Some(last)) = (events.first(), events.last()) else {
        return Vec::new();
    };

    let offset = *first.timestamp.offset();
    let first_day = bucket_date(&first.timestamp, &offset);
    let last_day = bucket_date(&last.timestamp, &offset);

    let mut open = OpenItemSet::default();
    let mut records = Vec::new();
    let mut cursor = 0usize;
    let mut day = Some(first_day);

    while let Some(date) = day.filter(|d| *d <= last_day) {
        let mut counts = DayCounts::default();

        while let Some(event) = events.get(cursor) {
            if bucket_date(&event.timestamp, &offset) != date {
                break;
            }
            apply_event(event, classifications[cursor], &mut counts, &mut open);
            cursor += 1;
        }

        let mut record = counts.finish(date, open.len());
        record.clearance_ratio = window.push(date, record.arrivals, record.stuck);
        trace!(date = %date, arrivals = record.arrivals, backlog = record.backlog, "Day closed");
        records.push(record);

        day = date.succ_opt();
    }

    records
}

fn apply_event<'a>(
    event: &'a Event,
    classification: Option<Classification>,
    counts: &mut DayCounts,
    open: &mut OpenItemSet<'a>,
) {
    match event.kind {
        EventKind::Start => {
            counts.arrivals += 1;
            open.open(&event.item_id, event.timestamp);
        }
        EventKind::Reopen => open.open(&event.item_id, event.timestamp),
        EventKind::Done => {
            counts.attempts += 1;
            open.close(&event.item_id);
            match classification {
                Some(Classification::Stuck) => counts.stuck += 1,
                Some(Classification::Bounced) => counts.bounced += 1,
                Some(Classification::Unobservable) | None => counts.poisoned = true,
            }
        }
        EventKind::Attempt | EventKind::Unrecognized(_) => {}
    }
}

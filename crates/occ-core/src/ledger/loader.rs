//! CSV ledger loader.
//!
//! The ledger is a header-led CSV with at least `item_id`, `event_type` and
//! `timestamp` columns. `event_id` is optional; anything else is ignored.
//! Rows are parsed completely before anything is returned: a single bad row
//! fails the whole load.

use super::event::{Event, EventKind};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use occ_config::UnknownEventPolicy;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

pub const COLUMN_ITEM_ID: &str = "item_id";
pub const COLUMN_EVENT_TYPE: &str = "event_type";
pub const COLUMN_TIMESTAMP: &str = "timestamp";
pub const COLUMN_EVENT_ID: &str = "event_id";

/// Naive formats tried after RFC 3339. All are read as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const OFFSET_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Errors raised while reading a ledger. Rows are 1-based data rows.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("failed to read ledger {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("row {row}: {message}")]
    Csv { row: usize, message: String },

    #[error("ledger is missing required column '{0}'")]
    MissingColumn(String),

    #[error("row {row}: required field '{field}' is empty")]
    EmptyField { row: usize, field: String },

    #[error("row {row}: cannot parse timestamp {value:?}")]
    BadTimestamp { row: usize, value: String },

    #[error("row {row}: unknown event type {value:?}")]
    UnknownEventType { row: usize, value: String },
}

impl LedgerError {
    /// Data row the error refers to, when there is one.
    pub fn row(&self) -> Option<usize> {
        match self {
            LedgerError::Csv { row, .. }
            | LedgerError::EmptyField { row, .. }
            | LedgerError::BadTimestamp { row, .. }
            | LedgerError::UnknownEventType { row, .. } => Some(*row),
            LedgerError::Io { .. } | LedgerError::MissingColumn(_) => None,
        }
    }
}

/// Loader options.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    pub unknown_event_types: UnknownEventPolicy,
}

/// A parsed ledger, sorted by timestamp.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    /// Events in non-decreasing timestamp order; ties keep file order.
    pub events: Vec<Event>,
    /// Number of retained events whose type was not one of the four primitives.
    pub unrecognized: usize,
    /// File the ledger was read from, if any.
    pub source: Option<PathBuf>,
}

impl Ledger {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Distinct item ids seen in the ledger.
    pub fn item_count(&self) -> usize {
        let mut ids: Vec<&str> = self.events.iter().map(|e| e.item_id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }
}

/// Load a ledger file from disk.
pub fn load_ledger(path: &Path, options: &LoadOptions) -> Result<Ledger, LedgerError> {
    let file = File::open(path).map_err(|source| LedgerError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut ledger = read_ledger(file, options)?;
    ledger.source = Some(path.to_path_buf());

    debug!(
        path = %path.display(),
        events = ledger.len(),
        unrecognized = ledger.unrecognized,
        "Ledger file read"
    );

    Ok(ledger)
}

/// Read a ledger from any reader.
pub fn read_ledger<R: Read>(reader: R, options: &LoadOptions) -> Result<Ledger, LedgerError> {
    let mut csv = ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = csv
        .headers()
        .map_err(|e| LedgerError::Csv {
            row: 0,
            message: e.to_string(),
        })?
        .clone();
    let columns = Columns::locate(&headers)?;

    let mut events = Vec::new();
    let mut unrecognized = 0usize;

    for (idx, record) in csv.records().enumerate() {
        let row = idx + 1;
        let record = record.map_err(|e| LedgerError::Csv {
            row,
            message: e.to_string(),
        })?;

        let event = parse_row(&record, &columns, row)?;
        if let EventKind::Unrecognized(raw) = &event.kind {
            match options.unknown_event_types {
                UnknownEventPolicy::Reject => {
                    return Err(LedgerError::UnknownEventType {
                        row,
                        value: raw.clone(),
                    });
                }
                UnknownEventPolicy::Retain => {
                    debug!(row, event_type = %raw, "Retaining unrecognized event type");
                    unrecognized += 1;
                }
            }
        }
        events.push(event);
    }

    if unrecognized > 0 {
        warn!(count = unrecognized, "Ledger contains unrecognized event types");
    }

    // Stable: events sharing a timestamp keep their file order.
    events.sort_by_key(|e| e.timestamp);

    Ok(Ledger {
        events,
        unrecognized,
        source: None,
    })
}

struct Columns {
    item_id: usize,
    event_type: usize,
    timestamp: usize,
    event_id: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self, LedgerError> {
        let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
        let require =
            |name: &str| find(name).ok_or_else(|| LedgerError::MissingColumn(name.to_string()));

        Ok(Self {
            item_id: require(COLUMN_ITEM_ID)?,
            event_type: require(COLUMN_EVENT_TYPE)?,
            timestamp: require(COLUMN_TIMESTAMP)?,
            event_id: find(COLUMN_EVENT_ID),
        })
    }
}

fn parse_row(record: &StringRecord, columns: &Columns, row: usize) -> Result<Event, LedgerError> {
    let field = |idx: usize, name: &str| -> Result<&str, LedgerError> {
        match record.get(idx) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(LedgerError::EmptyField {
                row,
                field: name.to_string(),
            }),
        }
    };

    let item_id = field(columns.item_id, COLUMN_ITEM_ID)?;
    let kind = EventKind::parse(field(columns.event_type, COLUMN_EVENT_TYPE)?);
    let raw_ts = field(columns.timestamp, COLUMN_TIMESTAMP)?;
    let timestamp = parse_timestamp(raw_ts).ok_or_else(|| LedgerError::BadTimestamp {
        row,
        value: raw_ts.to_string(),
    })?;

    let event_id = columns
        .event_id
        .and_then(|idx| record.get(idx))
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    Ok(Event {
        event_id,
        item_id: item_id.to_string(),
        kind,
        timestamp,
    })
}

/// Parse a ledger timestamp.
///
/// Accepts RFC 3339 (`Z` or numeric offset), ISO-8601 date-times with a `T`
/// or space separator and optional fractional seconds, and bare dates.
/// Values without an offset are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts);
    }

    for fmt in OFFSET_DATETIME_FORMATS {
        if let Ok(ts) = DateTime::parse_from_str(raw, fmt) {
            return Some(ts);
        }
    }

    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc().fixed_offset());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

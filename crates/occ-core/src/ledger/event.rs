//! Typed ledger events.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Lifecycle primitive carried by one ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Item arrives and enters the backlog.
    Start,
    /// Work was done on the item; never moves a counter.
    Attempt,
    /// Item marked complete; a qualifying attempt.
    Done,
    /// Item re-enters the backlog after completion.
    Reopen,
    /// A code outside the four primitives, kept verbatim.
    Unrecognized(String),
}

impl EventKind {
    /// Parse an event-type code. Matching is trimmed and case-insensitive.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "start" => EventKind::Start,
            "attempt" => EventKind::Attempt,
            "done" => EventKind::Done,
            "reopen" => EventKind::Reopen,
            _ => EventKind::Unrecognized(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Start => "start",
            EventKind::Attempt => "attempt",
            EventKind::Done => "done",
            EventKind::Reopen => "reopen",
            EventKind::Unrecognized(raw) => raw,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, EventKind::Unrecognized(_))
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable ledger event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Upstream identifier; carried for traceability only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    pub item_id: String,
    pub kind: EventKind,
    pub timestamp: DateTime<FixedOffset>,
}

impl Event {
    pub fn new(item_id: impl Into<String>, kind: EventKind, timestamp: DateTime<FixedOffset>) -> Self {
        Self {
            event_id: None,
            item_id: item_id.into(),
            kind,
            timestamp,
        }
    }

    pub fn with_event_id(mut self, event_id: impl Into<String>) -> Self {
        self.event_id = Some(event_id.into());
        self
    }
}

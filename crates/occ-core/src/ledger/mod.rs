//! Ledger model and CSV loading.

pub mod event;
pub mod loader;

pub use event::{Event, EventKind};
pub use loader::{load_ledger, parse_timestamp, read_ledger, Ledger, LedgerError, LoadOptions};

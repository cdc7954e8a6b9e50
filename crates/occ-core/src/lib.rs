//! OCC Tier-1 closure harness core library.
//!
//! This library provides:
//! - The item lifecycle ledger model and CSV loader
//! - The correlation engine (bounce classification, daily aggregation,
//!   rolling clearance window, closure invariant check)
//! - Output writers for `timeseries.csv`, `diagnostics.json` and the
//!   submission package
//! - Structured logging and exit codes for the `occ` binary
//!
//! The binary entry point is in `main.rs`.

pub mod engine;
pub mod exit_codes;
pub mod ledger;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod schema;

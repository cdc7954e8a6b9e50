//! Fuzz target for CSV ledger loading.
//!
//! Arbitrary bytes must produce either a ledger or a `LedgerError`. Whatever
//! loads must also survive the engine, since the loader sorts its output.

#![no_main]

use libfuzzer_sys::fuzz_target;
use occ_core::engine::{evaluate, EngineParams};
use occ_core::ledger::{read_ledger, LoadOptions};

fuzz_target!(|data: &[u8]| {
    if let Ok(ledger) = read_ledger(data, &LoadOptions::default()) {
        let result = evaluate(&ledger.events, &EngineParams::new(30, 90));
        assert!(result.is_ok(), "loader output rejected by engine");
    }
});

//! Fuzz target for harness.json configuration parsing.

#![no_main]

use libfuzzer_sys::fuzz_target;
use occ_config::{validate_harness, HarnessConfig};

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(config) = HarnessConfig::parse_json(text) {
            let _ = validate_harness(&config);
        }
    }
});

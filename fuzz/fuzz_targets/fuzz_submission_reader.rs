//! Fuzz target for submission package reading.
//!
//! Packages may come from untrusted sources; parsing and verification
//! must return errors, never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use occ_bundle::SubmissionReader;

fuzz_target!(|data: &[u8]| {
    if let Ok(mut reader) = SubmissionReader::from_bytes(data.to_vec()) {
        let _ = reader.verify_all();
    }
});

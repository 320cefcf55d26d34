//! Fuzz target for transfer payload deserialization
//!
//! This target ensures:
//! 1. Payload deserialization never panics on arbitrary input
//! 2. Anything that parses re-serializes to the same bytes
//! 3. The operation code gate holds

#![no_main]

use libfuzzer_sys::fuzz_target;
use jetdrop_dispatch::{TOKEN_TRANSFER_OP, TransferPayload};

fuzz_target!(|data: &[u8]| {
    // Parsing should NEVER panic, even with garbage input
    match TransferPayload::from_bytes(data) {
        Ok(payload) => {
            // The fixed-width format leaves no slack: accepted bytes must
            // reproduce themselves
            assert_eq!(payload.to_bytes(), data, "accepted payload must be canonical");
            assert_eq!(&data[..4], TOKEN_TRANSFER_OP.to_be_bytes());
        }
        Err(_) => {
            // Expected: wrong width or wrong operation code
        }
    }
});

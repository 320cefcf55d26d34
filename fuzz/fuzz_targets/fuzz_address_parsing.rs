//! Fuzz target for address parsing
//!
//! This target ensures:
//! 1. Address parsing never panics on arbitrary text
//! 2. Accepted addresses roundtrip through both renderings
//! 3. Friendly-form checksum validation holds

#![no_main]

use libfuzzer_sys::fuzz_target;
use jetdrop_primitives::Address;

fuzz_target!(|data: &[u8]| {
    let text = match std::str::from_utf8(data) {
        Ok(text) => text,
        Err(_) => return,
    };

    // Parsing should NEVER panic, even with garbage input
    let address = match text.parse::<Address>() {
        Ok(address) => address,
        Err(_) => return,
    };

    // Raw form roundtrip
    let raw = address.to_raw();
    let reparsed: Address = raw.parse().unwrap();
    assert_eq!(reparsed, address, "raw form should roundtrip");

    // Friendly form roundtrip, both flag combinations
    for (bounceable, testnet) in [(true, false), (false, false), (true, true)] {
        let friendly = address.to_friendly(bounceable, testnet);
        let recovered: Address = friendly.parse().unwrap();
        assert_eq!(recovered, address, "friendly form should roundtrip");
    }
});

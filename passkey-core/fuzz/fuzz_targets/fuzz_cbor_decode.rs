#![no_main]

//! Fuzz target for the CBOR decoder
//!
//! Any input must either decode or fail with an error. The returned offset
//! must stay inside the buffer.
//!
//! Run with: cargo +nightly fuzz run fuzz_cbor_decode

use libfuzzer_sys::fuzz_target;
use passkey_core::cbor;

fuzz_target!(|data: &[u8]| {
    if let Ok((_, next)) = cbor::decode_first(data) {
        assert!(next > 0 && next <= data.len());
    }
});

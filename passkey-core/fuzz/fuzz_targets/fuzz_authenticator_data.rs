#![no_main]

//! Fuzz target for authenticator data parsing
//!
//! Parses arbitrary bytes as authenticator data and, when attested data is
//! present, runs the embedded COSE key through JWK conversion.
//!
//! Run with: cargo +nightly fuzz run fuzz_authenticator_data

use libfuzzer_sys::fuzz_target;
use passkey_core::{AuthenticatorData, JsonWebKey};

fuzz_target!(|data: &[u8]| {
    if let Ok(parsed) = AuthenticatorData::parse(data) {
        assert_eq!(
            parsed.cose_public_key.is_some(),
            parsed.has_attested_credential_data()
        );
        if let Some(key) = parsed.cose_public_key {
            if let Ok(jwk) = JsonWebKey::from_cose(&key) {
                let _ = jwk.verifying_key();
            }
        }
    }
});

//! URL-safe, unpadded base64 as used by every binary WebAuthn field.
//!
//! Decoding is lenient and never fails: padding, standard
//! alphabet characters and stray characters are tolerated, and whatever
//! bytes can be recovered are returned. Consumers validate the decoded
//! length or structure themselves.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use serde::Serializer;

const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::RequireNone)
        .with_decode_allow_trailing_bits(true),
);

/// Encode bytes as unpadded base64url.
pub fn encode(bytes: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode a base64url (or standard base64) string.
///
/// Characters outside the alphabet, including `=` padding, are skipped. A
/// dangling final character that cannot form a byte is dropped.
pub fn decode(value: &str) -> Vec<u8> {
    let mut sextets: String = value
        .chars()
        .filter_map(|c| match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '_' => Some(c),
            '+' => Some('-'),
            '/' => Some('_'),
            _ => None,
        })
        .collect();

    if sextets.len() % 4 == 1 {
        sextets.pop();
    }

    LENIENT.decode(sextets).unwrap_or_default()
}

/// Serde `serialize_with` helper writing bytes as a base64url string.
pub fn serialize<T, S>(bytes: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: AsRef<[u8]>,
    S: Serializer,
{
    serializer.serialize_str(&encode(bytes))
}

/// Re-encode a base64url value into its canonical unpadded form.
pub fn normalize(value: &str) -> String {
    encode(decode(value))
}

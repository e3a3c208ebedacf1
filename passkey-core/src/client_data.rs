//! `clientDataJSON` parsing.

use serde_json::Value;

use crate::base64url;
use crate::error::{Result, WebAuthnError};

/// `type` value of a registration ceremony.
pub const CEREMONY_CREATE: &str = "webauthn.create";
/// `type` value of an authentication ceremony.
pub const CEREMONY_GET: &str = "webauthn.get";

/// Fields of the collected client data the verifier checks.
///
/// Each field is optional: a missing challenge or origin simply fails the
/// corresponding equality check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedClientData {
    pub ceremony_type: Option<String>,
    pub challenge: Option<String>,
    pub origin: Option<String>,
    pub cross_origin: Option<bool>,
}

/// Decoded client data together with the exact bytes the browser hashed.
#[derive(Debug, Clone)]
pub struct ParsedClientData {
    pub raw: Vec<u8>,
    pub data: CollectedClientData,
}

impl CollectedClientData {
    /// Decode a base64url `clientDataJSON` field.
    pub fn parse(encoded: &str) -> Result<ParsedClientData> {
        let raw = base64url::decode(encoded);
        let data = Self::from_slice(&raw)?;
        Ok(ParsedClientData { raw, data })
    }

    /// Parse raw client data bytes. The top level must be a JSON object.
    pub fn from_slice(raw: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(raw)
            .map_err(|e| WebAuthnError::InvalidClientData(e.to_string()))?;

        let Value::Object(fields) = value else {
            return Err(WebAuthnError::InvalidClientData(
                "expected a JSON object".into(),
            ));
        };

        let text = |name: &str| fields.get(name).and_then(Value::as_str).map(str::to_owned);

        Ok(Self {
            ceremony_type: text("type"),
            challenge: text("challenge"),
            origin: text("origin"),
            cross_origin: fields.get("crossOrigin").and_then(Value::as_bool),
        })
    }

    /// Check `type`, then `challenge`, then `origin`, first failure wins.
    pub fn verify(
        &self,
        expected_type: &'static str,
        expected_challenge: &str,
        expected_origin: &str,
    ) -> Result<()> {
        if self.ceremony_type.as_deref() != Some(expected_type) {
            return Err(WebAuthnError::WrongCeremonyType {
                expected: expected_type,
                actual: self.ceremony_type.clone(),
            });
        }
        if self.challenge.as_deref() != Some(expected_challenge) {
            return Err(WebAuthnError::ChallengeMismatch);
        }
        if self.origin.as_deref() != Some(expected_origin) {
            return Err(WebAuthnError::OriginMismatch);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(json: serde_json::Value) -> String {
        base64url::encode(serde_json::to_vec(&json).unwrap())
    }

    #[test]
    fn test_parse_keeps_raw_bytes() {
        let value = serde_json::json!({
            "type": "webauthn.get",
            "challenge": "abc",
            "origin": "https://example.com",
            "crossOrigin": false
        });
        let parsed = CollectedClientData::parse(&encoded(value.clone())).unwrap();
        assert_eq!(parsed.raw, serde_json::to_vec(&value).unwrap());
        assert_eq!(parsed.data.ceremony_type.as_deref(), Some(CEREMONY_GET));
        assert_eq!(parsed.data.challenge.as_deref(), Some("abc"));
        assert_eq!(parsed.data.cross_origin, Some(false));
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        let result = CollectedClientData::parse(&base64url::encode(b"{not json"));
        assert!(matches!(result, Err(WebAuthnError::InvalidClientData(_))));

        let array = CollectedClientData::parse(&base64url::encode(b"[1,2]"));
        assert!(matches!(array, Err(WebAuthnError::InvalidClientData(_))));
    }

    #[test]
    fn test_verify_order() {
        let data = CollectedClientData {
            ceremony_type: Some(CEREMONY_CREATE.into()),
            challenge: Some("c".into()),
            origin: Some("https://a.example".into()),
            cross_origin: None,
        };

        assert!(data.verify(CEREMONY_CREATE, "c", "https://a.example").is_ok());
        assert_eq!(
            data.verify(CEREMONY_GET, "other", "https://b.example"),
            Err(WebAuthnError::WrongCeremonyType {
                expected: CEREMONY_GET,
                actual: Some(CEREMONY_CREATE.into()),
            })
        );
        assert_eq!(
            data.verify(CEREMONY_CREATE, "other", "https://b.example"),
            Err(WebAuthnError::ChallengeMismatch)
        );
        assert_eq!(
            data.verify(CEREMONY_CREATE, "c", "https://a.example/"),
            Err(WebAuthnError::OriginMismatch)
        );
    }

    #[test]
    fn test_missing_fields_fail_their_checks() {
        let data = CollectedClientData::from_slice(b"{}").unwrap();
        assert!(matches!(
            data.verify(CEREMONY_CREATE, "c", "o"),
            Err(WebAuthnError::WrongCeremonyType { actual: None, .. })
        ));

        let typed_only = CollectedClientData::from_slice(br#"{"type":"webauthn.create"}"#).unwrap();
        assert_eq!(
            typed_only.verify(CEREMONY_CREATE, "c", "o"),
            Err(WebAuthnError::ChallengeMismatch)
        );
    }
}

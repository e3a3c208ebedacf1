//! COSE EC2 public keys and their JSON Web Key form.
//!
//! Only ES256 (ECDSA over P-256 with SHA-256) credentials are accepted. The
//! JWK produced here is the only representation of a credential public key
//! that callers persist.

use p256::ecdsa::VerifyingKey;
use serde::{Deserialize, Serialize};

use crate::base64url;
use crate::cbor::{self, DecodedItem};
use crate::error::{Result, WebAuthnError};

/// COSE key parameter labels (RFC 9053).
const COSE_KTY: i64 = 1;
const COSE_ALG: i64 = 3;
const COSE_EC2_CRV: i64 = -1;
const COSE_EC2_X: i64 = -2;
const COSE_EC2_Y: i64 = -3;

const COSE_KTY_EC2: i128 = 2;
const COSE_CRV_P256: i128 = 1;
/// COSE algorithm identifier for ES256.
pub const COSE_ALG_ES256: i64 = -7;

const COORDINATE_LEN: usize = 32;

/// EC public key in JWK form, restricted to P-256 / ES256.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonWebKey {
    pub kty: String,
    pub crv: String,
    /// Base64url X coordinate.
    pub x: String,
    /// Base64url Y coordinate.
    pub y: String,
    pub alg: String,
    /// WebCrypto `ext` flag, always `true` for keys produced here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<bool>,
}

impl JsonWebKey {
    /// Convert a CBOR-encoded COSE key into a JWK.
    ///
    /// The key must be an EC2 map with `kty = 2`, `crv = 1` (P-256) and
    /// `alg = -7` (ES256), and byte-string `x`/`y` coordinates.
    pub fn from_cose(cose_public_key: &[u8]) -> Result<Self> {
        let (decoded, _) = cbor::decode_first(cose_public_key)?;
        let map = decoded
            .as_map()
            .ok_or_else(|| WebAuthnError::InvalidKey("COSE key is not a map".into()))?;

        let int_param = |label| map.get_int(label).and_then(DecodedItem::as_integer);
        if int_param(COSE_KTY) != Some(COSE_KTY_EC2)
            || int_param(COSE_EC2_CRV) != Some(COSE_CRV_P256)
            || int_param(COSE_ALG) != Some(i128::from(COSE_ALG_ES256))
        {
            return Err(WebAuthnError::UnsupportedAlgorithm);
        }

        let x = map.get_int(COSE_EC2_X).and_then(DecodedItem::as_bytes);
        let y = map.get_int(COSE_EC2_Y).and_then(DecodedItem::as_bytes);
        let (Some(x), Some(y)) = (x, y) else {
            return Err(WebAuthnError::InvalidKey(
                "EC key coordinates must be byte strings".into(),
            ));
        };

        Ok(Self::es256(x, y))
    }

    /// Build a JWK from a P-256 verifying key.
    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        let point = key.to_encoded_point(false);
        // Uncompressed SEC1: 0x04 | X | Y
        let bytes = point.as_bytes();
        Self::es256(
            &bytes[1..1 + COORDINATE_LEN],
            &bytes[1 + COORDINATE_LEN..],
        )
    }

    /// Reconstruct the P-256 verifying key this JWK describes.
    pub fn verifying_key(&self) -> Result<VerifyingKey> {
        if self.kty != "EC" || self.crv != "P-256" {
            return Err(WebAuthnError::InvalidKey(format!(
                "expected an EC P-256 key, got kty={} crv={}",
                self.kty, self.crv
            )));
        }

        let x = base64url::decode(&self.x);
        let y = base64url::decode(&self.y);
        if x.len() != COORDINATE_LEN || y.len() != COORDINATE_LEN {
            return Err(WebAuthnError::InvalidKey(
                "EC coordinates must be 32 bytes".into(),
            ));
        }

        let mut sec1 = Vec::with_capacity(1 + 2 * COORDINATE_LEN);
        sec1.push(0x04);
        sec1.extend_from_slice(&x);
        sec1.extend_from_slice(&y);

        VerifyingKey::from_sec1_bytes(&sec1)
            .map_err(|_| WebAuthnError::InvalidKey("point is not on the P-256 curve".into()))
    }

    fn es256(x: &[u8], y: &[u8]) -> Self {
        Self {
            kty: "EC".into(),
            crv: "P-256".into(),
            x: base64url::encode(x),
            y: base64url::encode(y),
            alg: "ES256".into(),
            ext: Some(true),
        }
    }
}

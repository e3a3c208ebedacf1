//! Software authenticator used to build synthetic ceremonies.
//!
//! CBOR is produced with `ciborium` so the decoder is exercised against an
//! independent encoder, and assertions are signed with a real P-256 key.

#![allow(dead_code)]

use ciborium::value::Value;
use p256::ecdsa::{signature::Signer, Signature, SigningKey};
use sha2::{Digest, Sha256};

use passkey_core::base64url;
use passkey_core::{AuthenticatorResponse, JsonWebKey, PublicKeyCredential};

pub const RP_ID: &str = "example.com";
pub const ORIGIN: &str = "https://example.com";
pub const CHALLENGE: &str = "c2VydmVyLWlzc3VlZC1jaGFsbGVuZ2UtMzItYnl0ZXM";

/// UP | UV | AT
pub const FLAGS_REGISTRATION: u8 = 0x45;
/// UP | UV
pub const FLAGS_ASSERTION: u8 = 0x05;

pub fn sha256(input: impl AsRef<[u8]>) -> [u8; 32] {
    Sha256::digest(input).into()
}

pub fn cbor(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    ciborium::into_writer(value, &mut out).expect("CBOR encoding failed");
    out
}

pub fn client_data_json(ceremony_type: &str, challenge: &str, origin: &str) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "type": ceremony_type,
        "challenge": challenge,
        "origin": origin,
        "crossOrigin": false
    }))
    .expect("JSON encoding failed")
}

/// `{"fmt": "none", "attStmt": {}, "authData": auth_data}`
pub fn attestation_object(auth_data: &[u8]) -> Vec<u8> {
    cbor(&Value::Map(vec![
        (Value::Text("fmt".into()), Value::Text("none".into())),
        (Value::Text("attStmt".into()), Value::Map(Vec::new())),
        (Value::Text("authData".into()), Value::Bytes(auth_data.to_vec())),
    ]))
}

pub struct Authenticator {
    pub key: SigningKey,
    pub credential_id: Vec<u8>,
    /// COSE algorithm advertised in the attested key.
    pub alg: i64,
}

impl Authenticator {
    pub fn new(seed: u8, credential_id: &[u8]) -> Self {
        Self {
            key: SigningKey::from_slice(&[seed; 32]).expect("valid P-256 scalar"),
            credential_id: credential_id.to_vec(),
            alg: -7,
        }
    }

    pub fn credential_id_b64(&self) -> String {
        base64url::encode(&self.credential_id)
    }

    pub fn jwk(&self) -> JsonWebKey {
        JsonWebKey::from_verifying_key(self.key.verifying_key())
    }

    /// `{1: 2, 3: alg, -1: 1, -2: x, -3: y}`
    pub fn cose_key(&self) -> Vec<u8> {
        let point = self.key.verifying_key().to_encoded_point(false);
        let bytes = point.as_bytes();
        let int = |v: i64| Value::Integer(v.into());

        cbor(&Value::Map(vec![
            (int(1), int(2)),
            (int(3), int(self.alg)),
            (int(-1), int(1)),
            (int(-2), Value::Bytes(bytes[1..33].to_vec())),
            (int(-3), Value::Bytes(bytes[33..65].to_vec())),
        ]))
    }

    pub fn auth_data(&self, rp_id: &str, flags: u8, sign_count: u32) -> Vec<u8> {
        let mut out = sha256(rp_id).to_vec();
        out.push(flags);
        out.extend_from_slice(&sign_count.to_be_bytes());

        if flags & 0x40 != 0 {
            out.extend_from_slice(&[0x11; 16]);
            out.extend_from_slice(&(self.credential_id.len() as u16).to_be_bytes());
            out.extend_from_slice(&self.credential_id);
            out.extend_from_slice(&self.cose_key());
        }
        out
    }

    /// Registration response with counter 0.
    pub fn register(&self, challenge: &str, origin: &str) -> PublicKeyCredential {
        self.register_with(
            &client_data_json("webauthn.create", challenge, origin),
            &self.auth_data(RP_ID, FLAGS_REGISTRATION, 0),
        )
    }

    pub fn register_with(&self, client_data: &[u8], auth_data: &[u8]) -> PublicKeyCredential {
        let id = self.credential_id_b64();
        PublicKeyCredential {
            id: Some(id.clone()),
            raw_id: Some(id),
            credential_type: Some("public-key".into()),
            authenticator_attachment: Some("platform".into()),
            response: Some(AuthenticatorResponse {
                client_data_json: Some(base64url::encode(client_data)),
                attestation_object: Some(base64url::encode(attestation_object(auth_data))),
                transports: Some(vec!["internal".into(), "hybrid".into()]),
                ..Default::default()
            }),
        }
    }

    /// Signed assertion reporting `sign_count`.
    pub fn assert(&self, challenge: &str, origin: &str, sign_count: u32) -> PublicKeyCredential {
        self.assert_with(
            &client_data_json("webauthn.get", challenge, origin),
            &self.auth_data(RP_ID, FLAGS_ASSERTION, sign_count),
        )
    }

    pub fn assert_with(&self, client_data: &[u8], auth_data: &[u8]) -> PublicKeyCredential {
        let mut signed = auth_data.to_vec();
        signed.extend_from_slice(&sha256(client_data));
        let signature: Signature = self.key.sign(&signed);

        let id = self.credential_id_b64();
        PublicKeyCredential {
            id: Some(id.clone()),
            raw_id: Some(id),
            credential_type: Some("public-key".into()),
            authenticator_attachment: None,
            response: Some(AuthenticatorResponse {
                client_data_json: Some(base64url::encode(client_data)),
                authenticator_data: Some(base64url::encode(auth_data)),
                signature: Some(base64url::encode(signature.to_der().as_bytes())),
                user_handle: Some(base64url::encode(b"user-handle")),
                ..Default::default()
            }),
        }
    }
}

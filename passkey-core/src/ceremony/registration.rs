use serde::Serialize;

use super::{
    ensure_credential_type, ensure_rp_id, ensure_user_verified, required, sha256,
    verify_client_data,
};
use crate::authenticator_data::AuthenticatorData;
use crate::base64url;
use crate::cbor::{self, DecodedItem};
use crate::client_data::CEREMONY_CREATE;
use crate::cose::JsonWebKey;
use crate::credential::PublicKeyCredential;
use crate::error::{Result, WebAuthnError};

/// Outcome of a successful registration ceremony.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationVerificationResult {
    /// Base64url credential ID from the attested credential data.
    pub credential_id: String,
    pub public_key_jwk: JsonWebKey,
    /// Counter reported at registration, the initial stored counter.
    pub sign_count: u32,
    /// SHA-256 of the raw client data bytes.
    #[serde(serialize_with = "base64url::serialize")]
    pub client_data_hash: [u8; 32],
}

/// Verify a `navigator.credentials.create()` response.
///
/// The attestation statement is not verified; only the `none` trust model
/// is supported.
pub fn verify_registration(
    credential: &PublicKeyCredential,
    expected_challenge: &str,
    expected_origin: &str,
    expected_rp_id: &str,
) -> Result<RegistrationVerificationResult> {
    match verify(credential, expected_challenge, expected_origin, expected_rp_id) {
        Ok(result) => {
            tracing::info!(
                credential_id = %result.credential_id,
                sign_count = result.sign_count,
                "Passkey registration verified"
            );
            Ok(result)
        }
        Err(err) => {
            tracing::debug!(code = err.code(), "Passkey registration rejected");
            Err(err)
        }
    }
}

fn verify(
    credential: &PublicKeyCredential,
    expected_challenge: &str,
    expected_origin: &str,
    expected_rp_id: &str,
) -> Result<RegistrationVerificationResult> {
    ensure_credential_type(credential)?;

    let response = credential.response.as_ref();
    let client_data_json = required(
        response.and_then(|r| r.client_data_json.as_ref()),
        "clientDataJSON",
    )?;
    let attestation_object = required(
        response.and_then(|r| r.attestation_object.as_ref()),
        "attestationObject",
    )?;

    let client_data = verify_client_data(
        client_data_json,
        CEREMONY_CREATE,
        expected_challenge,
        expected_origin,
    )?;

    let auth_data_bytes = attested_auth_data(&base64url::decode(attestation_object))?;
    let auth_data = AuthenticatorData::parse(&auth_data_bytes)?;

    ensure_rp_id(&auth_data, expected_rp_id)?;
    ensure_user_verified(&auth_data)?;

    let (Some(credential_id), Some(cose_public_key)) =
        (&auth_data.credential_id, &auth_data.cose_public_key)
    else {
        return Err(WebAuthnError::MissingAttestedCredentialData);
    };

    let public_key_jwk = JsonWebKey::from_cose(cose_public_key)?;

    Ok(RegistrationVerificationResult {
        credential_id: base64url::encode(credential_id),
        public_key_jwk,
        sign_count: auth_data.sign_count,
        client_data_hash: sha256(&client_data),
    })
}

/// Extract the `authData` byte string from a CBOR attestation object.
fn attested_auth_data(attestation_object: &[u8]) -> Result<Vec<u8>> {
    let (decoded, _) =
        cbor::decode_first(attestation_object).map_err(|_| WebAuthnError::InvalidAttestationObject)?;

    let DecodedItem::Map(map) = decoded else {
        return Err(WebAuthnError::InvalidAttestationObject);
    };

    map.get_text("authData")
        .and_then(DecodedItem::as_bytes)
        .map(<[u8]>::to_vec)
        .ok_or(WebAuthnError::MissingAuthData)
}

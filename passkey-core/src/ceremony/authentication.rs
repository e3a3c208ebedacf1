use p256::ecdsa::signature::Verifier;
use p256::ecdsa::Signature;
use serde::Serialize;

use super::{
    ensure_credential_type, ensure_rp_id, ensure_user_verified, required, sha256,
    verify_client_data,
};
use crate::authenticator_data::AuthenticatorData;
use crate::base64url;
use crate::client_data::CEREMONY_GET;
use crate::cose::JsonWebKey;
use crate::credential::PublicKeyCredential;
use crate::error::{Result, WebAuthnError};

/// Outcome of a successful authentication ceremony.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationVerificationResult {
    /// Counter reported by the authenticator, to be persisted.
    pub sign_count: u32,
    /// Normalized credential ID, equal to the expected one.
    pub credential_id: String,
}

/// Verify a `navigator.credentials.get()` response against a stored
/// credential.
///
/// `expected_credential_id` is compared after base64url normalization of
/// both sides. `stored_sign_count` is the counter persisted by the last
/// successful ceremony.
pub fn verify_authentication(
    credential: &PublicKeyCredential,
    expected_challenge: &str,
    expected_origin: &str,
    expected_rp_id: &str,
    expected_credential_id: &str,
    stored_public_key: &JsonWebKey,
    stored_sign_count: u32,
) -> Result<AuthenticationVerificationResult> {
    let result = verify(
        credential,
        expected_challenge,
        expected_origin,
        expected_rp_id,
        expected_credential_id,
        stored_public_key,
        stored_sign_count,
    );

    match &result {
        Ok(verified) => tracing::info!(
            credential_id = %verified.credential_id,
            sign_count = verified.sign_count,
            "Passkey authentication verified"
        ),
        Err(WebAuthnError::CounterDidNotAdvance { stored, reported }) => tracing::warn!(
            credential_id = %expected_credential_id,
            stored,
            reported,
            "Signature counter did not advance, possible cloned authenticator"
        ),
        Err(err) => tracing::debug!(code = err.code(), "Passkey authentication rejected"),
    }

    result
}

fn verify(
    credential: &PublicKeyCredential,
    expected_challenge: &str,
    expected_origin: &str,
    expected_rp_id: &str,
    expected_credential_id: &str,
    stored_public_key: &JsonWebKey,
    stored_sign_count: u32,
) -> Result<AuthenticationVerificationResult> {
    ensure_credential_type(credential)?;

    let response = credential.response.as_ref();
    let client_data_json = required(
        response.and_then(|r| r.client_data_json.as_ref()),
        "clientDataJSON",
    )?;
    let authenticator_data = required(
        response.and_then(|r| r.authenticator_data.as_ref()),
        "authenticatorData",
    )?;
    let signature = required(response.and_then(|r| r.signature.as_ref()), "signature")?;

    let credential_id = credential
        .credential_id()
        .filter(|id| *id == base64url::normalize(expected_credential_id))
        .ok_or(WebAuthnError::CredentialIdMismatch)?;

    let client_data = verify_client_data(
        client_data_json,
        CEREMONY_GET,
        expected_challenge,
        expected_origin,
    )?;

    let auth_data_bytes = base64url::decode(authenticator_data);
    let signature = base64url::decode(signature);

    let auth_data = AuthenticatorData::parse(&auth_data_bytes)?;
    ensure_rp_id(&auth_data, expected_rp_id)?;
    ensure_user_verified(&auth_data)?;

    let mut signed_payload = auth_data_bytes;
    signed_payload.extend_from_slice(&sha256(&client_data));
    verify_signature(stored_public_key, &signed_payload, &signature)?;

    ensure_counter_advanced(stored_sign_count, auth_data.sign_count)?;

    Ok(AuthenticationVerificationResult {
        sign_count: auth_data.sign_count,
        credential_id,
    })
}

/// Verify a DER-encoded ECDSA P-256 signature. The message is hashed with
/// SHA-256 by the verifier.
fn verify_signature(key: &JsonWebKey, message: &[u8], signature: &[u8]) -> Result<()> {
    let verifying_key = key.verifying_key()?;
    let signature = Signature::from_der(signature).map_err(|_| WebAuthnError::InvalidSignature)?;

    verifying_key
        .verify(message, &signature)
        .map_err(|_| WebAuthnError::InvalidSignature)
}

/// Reject a counter that did not move past the stored value. Authenticators
/// without a counter report 0, which always passes.
fn ensure_counter_advanced(stored: u32, reported: u32) -> Result<()> {
    if stored > 0 && reported > 0 && reported <= stored {
        return Err(WebAuthnError::CounterDidNotAdvance { stored, reported });
    }
    Ok(())
}

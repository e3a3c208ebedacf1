//! Registration and authentication ceremony verification.
//!
//! Both ceremonies are single-pass pipelines over their inputs. Checks run in
//! a fixed order and the first failing check decides the error; nothing is
//! persisted here. Callers store the returned counter and key themselves.

mod authentication;
mod registration;

pub use authentication::{verify_authentication, AuthenticationVerificationResult};
pub use registration::{verify_registration, RegistrationVerificationResult};

use sha2::{Digest, Sha256};

use crate::authenticator_data::AuthenticatorData;
use crate::client_data::CollectedClientData;
use crate::credential::PublicKeyCredential;
use crate::error::{Result, WebAuthnError};

/// The only credential type WebAuthn defines.
pub const PUBLIC_KEY_CREDENTIAL_TYPE: &str = "public-key";

pub(crate) fn sha256(input: impl AsRef<[u8]>) -> [u8; 32] {
    Sha256::digest(input).into()
}

fn ensure_credential_type(credential: &PublicKeyCredential) -> Result<()> {
    if credential.credential_type.as_deref() != Some(PUBLIC_KEY_CREDENTIAL_TYPE) {
        return Err(WebAuthnError::InvalidCredentialType);
    }
    Ok(())
}

/// A response field that must be present and non-empty.
fn required<'a>(value: Option<&'a String>, name: &'static str) -> Result<&'a str> {
    value
        .map(String::as_str)
        .filter(|value| !value.is_empty())
        .ok_or(WebAuthnError::MalformedResponse(name))
}

/// Parse and check client data, returning the raw bytes the signature covers.
fn verify_client_data(
    encoded: &str,
    ceremony_type: &'static str,
    expected_challenge: &str,
    expected_origin: &str,
) -> Result<Vec<u8>> {
    let parsed = CollectedClientData::parse(encoded)?;
    parsed
        .data
        .verify(ceremony_type, expected_challenge, expected_origin)?;
    Ok(parsed.raw)
}

fn ensure_rp_id(auth_data: &AuthenticatorData, expected_rp_id: &str) -> Result<()> {
    if auth_data.rp_id_hash != sha256(expected_rp_id) {
        return Err(WebAuthnError::RpIdMismatch);
    }
    Ok(())
}

fn ensure_user_verified(auth_data: &AuthenticatorData) -> Result<()> {
    if !auth_data.is_user_verified() {
        return Err(WebAuthnError::UserVerificationRequired);
    }
    Ok(())
}

//! Challenge generation, transport hints and allow-list checks.

use crate::base64url;
use crate::credential::PublicKeyCredential;
use crate::error::{Result, WebAuthnError};

/// Bytes of entropy in a ceremony challenge.
pub const CHALLENGE_LEN: usize = 32;

/// Transports kept per credential.
pub const MAX_TRANSPORTS: usize = 5;

/// `size` bytes from the OS CSPRNG, base64url encoded.
pub fn random_base64url(size: usize) -> std::result::Result<String, getrandom::Error> {
    let mut bytes = vec![0u8; size];
    getrandom::fill(&mut bytes)?;
    Ok(base64url::encode(bytes))
}

/// A fresh ceremony challenge.
pub fn generate_challenge() -> std::result::Result<String, getrandom::Error> {
    random_base64url(CHALLENGE_LEN)
}

/// Trim transport hints, drop empty ones and keep at most [`MAX_TRANSPORTS`].
pub fn normalize_transports<I, S>(transports: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    transports
        .into_iter()
        .filter_map(|transport| {
            let trimmed = transport.as_ref().trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        })
        .take(MAX_TRANSPORTS)
        .collect()
}

/// Check the credential a browser returned against the IDs offered in
/// `allowCredentials`, returning its normalized ID.
pub fn ensure_credential_allowed<S: AsRef<str>>(
    credential: &PublicKeyCredential,
    allowed: &[S],
) -> Result<String> {
    let id = credential
        .credential_id()
        .ok_or(WebAuthnError::CredentialNotAllowed)?;

    if allowed
        .iter()
        .any(|candidate| base64url::normalize(candidate.as_ref()) == id)
    {
        Ok(id)
    } else {
        Err(WebAuthnError::CredentialNotAllowed)
    }
}

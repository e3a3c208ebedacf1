//! A configured relying party: option builders, verifiers bound to the
//! configured origin and RP ID, and store-backed ceremony completion.

use uuid::Uuid;

use crate::ceremony::{
    verify_authentication, verify_registration, AuthenticationVerificationResult,
    RegistrationVerificationResult,
};
use crate::challenge::ensure_credential_allowed;
use crate::config::RelyingPartyConfig;
use crate::cose::JsonWebKey;
use crate::credential::PublicKeyCredential;
use crate::error::WebAuthnError;
use crate::options::{
    CreationOptions, CredentialDescriptor, RelyingPartyEntity, RequestOptions, UserEntity,
};
use crate::store::{CredentialRecord, CredentialStore, StoreError};

/// Failure of a store-backed ceremony.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CeremonyError {
    #[error(transparent)]
    Verification(#[from] WebAuthnError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Relying party bound to one validated configuration.
#[derive(Debug, Clone)]
pub struct RelyingParty {
    config: RelyingPartyConfig,
}

impl RelyingParty {
    pub fn new(config: RelyingPartyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RelyingPartyConfig {
        &self.config
    }

    /// Registration options for `user`, excluding credentials they already
    /// hold.
    pub fn creation_options(
        &self,
        challenge: &str,
        user: UserEntity,
        existing: &[CredentialRecord],
    ) -> CreationOptions {
        let rp = RelyingPartyEntity {
            id: self.config.rp_id.clone(),
            name: self.config.rp_name.clone(),
        };
        CreationOptions::new(challenge, rp, user)
            .with_timeout(self.config.timeout)
            .exclude(existing.iter().map(descriptor))
    }

    /// Authentication options allowing any of `credentials`.
    pub fn request_options(&self, challenge: &str, credentials: &[CredentialRecord]) -> RequestOptions {
        RequestOptions::new(challenge, &self.config.rp_id)
            .with_timeout(self.config.timeout)
            .allow(credentials.iter().map(descriptor))
    }

    pub fn verify_registration(
        &self,
        credential: &PublicKeyCredential,
        expected_challenge: &str,
    ) -> Result<RegistrationVerificationResult, WebAuthnError> {
        verify_registration(
            credential,
            expected_challenge,
            &self.config.origin,
            &self.config.rp_id,
        )
    }

    pub fn verify_authentication(
        &self,
        credential: &PublicKeyCredential,
        expected_challenge: &str,
        expected_credential_id: &str,
        stored_public_key: &JsonWebKey,
        stored_sign_count: u32,
    ) -> Result<AuthenticationVerificationResult, WebAuthnError> {
        verify_authentication(
            credential,
            expected_challenge,
            &self.config.origin,
            &self.config.rp_id,
            expected_credential_id,
            stored_public_key,
            stored_sign_count,
        )
    }

    /// Verify a registration and persist the new credential for `user_id`.
    pub fn complete_registration(
        &self,
        store: &dyn CredentialStore,
        user_id: Uuid,
        credential: &PublicKeyCredential,
        expected_challenge: &str,
    ) -> Result<CredentialRecord, CeremonyError> {
        let verified = self.verify_registration(credential, expected_challenge)?;
        let record = store.create_credential(user_id, &verified, credential.transports())?;
        Ok(record)
    }

    /// Verify an assertion for `user_id` and advance the stored counter.
    ///
    /// `allowed` holds the credential IDs offered in `allowCredentials` for
    /// this challenge. The counter update is a compare-and-set against the
    /// value the signature was checked with.
    pub fn complete_authentication<S: AsRef<str>>(
        &self,
        store: &dyn CredentialStore,
        user_id: Uuid,
        credential: &PublicKeyCredential,
        expected_challenge: &str,
        allowed: &[S],
    ) -> Result<CredentialRecord, CeremonyError> {
        let credential_id = ensure_credential_allowed(credential, allowed)?;
        let stored = store
            .find_credential(user_id, &credential_id)
            .ok_or(WebAuthnError::CredentialNotAllowed)?;

        let verified = self.verify_authentication(
            credential,
            expected_challenge,
            &stored.credential_id,
            &stored.public_key_jwk,
            stored.sign_count,
        )?;

        let record =
            store.update_sign_count(&verified.credential_id, stored.sign_count, verified.sign_count)?;
        Ok(record)
    }
}

fn descriptor(record: &CredentialRecord) -> CredentialDescriptor {
    CredentialDescriptor::new(record.credential_id.clone(), record.transports.clone())
}

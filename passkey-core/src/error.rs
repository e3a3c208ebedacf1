use thiserror::Error;

/// Every way a WebAuthn verification call can fail.
///
/// Variants are kinds, not call sites: the route layer maps each one to a
/// user-facing message via [`WebAuthnError::code`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WebAuthnError {
    #[error("Malformed CBOR input: {0}")]
    MalformedInput(String),

    #[error("Unsupported CBOR encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("Authenticator data too short: {0}")]
    TooShort(String),

    #[error("Invalid public key: {0}")]
    InvalidKey(String),

    #[error("Unsupported credential algorithm. Expected ES256")]
    UnsupportedAlgorithm,

    #[error("Invalid credential type")]
    InvalidCredentialType,

    #[error("Invalid credential response: missing {0}")]
    MalformedResponse(&'static str),

    #[error("Invalid clientDataJSON: {0}")]
    InvalidClientData(String),

    #[error("Invalid WebAuthn ceremony type: expected {expected}, got {actual:?}")]
    WrongCeremonyType {
        expected: &'static str,
        actual: Option<String>,
    },

    #[error("Challenge mismatch")]
    ChallengeMismatch,

    #[error("Origin mismatch")]
    OriginMismatch,

    #[error("RP ID hash mismatch")]
    RpIdMismatch,

    #[error("Passkey ceremonies require user presence and verification")]
    UserVerificationRequired,

    #[error("Missing attested credential data")]
    MissingAttestedCredentialData,

    #[error("Missing authenticator data in attestation")]
    MissingAuthData,

    #[error("Invalid attestation object")]
    InvalidAttestationObject,

    #[error("Credential ID mismatch")]
    CredentialIdMismatch,

    #[error("Credential is not allowed for this challenge")]
    CredentialNotAllowed,

    #[error("Invalid passkey signature")]
    InvalidSignature,

    #[error("Credential signature counter did not advance (stored {stored}, reported {reported})")]
    CounterDidNotAdvance { stored: u32, reported: u32 },
}

impl WebAuthnError {
    /// Stable machine-readable identifier for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedInput(_) => "malformed_input",
            Self::UnsupportedEncoding(_) => "unsupported_encoding",
            Self::TooShort(_) => "too_short",
            Self::InvalidKey(_) => "invalid_key",
            Self::UnsupportedAlgorithm => "unsupported_algorithm",
            Self::InvalidCredentialType => "invalid_credential_type",
            Self::MalformedResponse(_) => "malformed_response",
            Self::InvalidClientData(_) => "invalid_client_data",
            Self::WrongCeremonyType { .. } => "wrong_ceremony_type",
            Self::ChallengeMismatch => "challenge_mismatch",
            Self::OriginMismatch => "origin_mismatch",
            Self::RpIdMismatch => "rp_id_mismatch",
            Self::UserVerificationRequired => "user_verification_required",
            Self::MissingAttestedCredentialData => "missing_attested_credential_data",
            Self::MissingAuthData => "missing_auth_data",
            Self::InvalidAttestationObject => "invalid_attestation_object",
            Self::CredentialIdMismatch => "credential_id_mismatch",
            Self::CredentialNotAllowed => "credential_not_allowed",
            Self::InvalidSignature => "invalid_signature",
            Self::CounterDidNotAdvance { .. } => "counter_did_not_advance",
        }
    }
}

pub type Result<T> = std::result::Result<T, WebAuthnError>;

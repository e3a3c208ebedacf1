//! Passkey Core - WebAuthn ceremony verification
//!
//! This crate verifies browser-submitted passkey credentials for a relying
//! party without depending on a WebAuthn library. It contains everything
//! between the JSON a browser posts and the record a caller persists.
//!
//! # Features
//!
//! - Bounds-checked CBOR decoder for attestation objects and COSE keys
//! - Authenticator data parsing (flags, signature counter, attested data)
//! - COSE EC2 to JWK conversion restricted to ES256
//! - ECDSA P-256 signature verification with counter anti-replay
//! - Ceremony options, relying-party configuration and a credential store
//!   interface with an in-memory implementation
//!
//! # Example
//!
//! ```no_run
//! use passkey_core::{verify_authentication, JsonWebKey, PublicKeyCredential};
//!
//! # fn example(json: &str, stored_key: &JsonWebKey) -> anyhow::Result<()> {
//! let credential: PublicKeyCredential = serde_json::from_str(json)?;
//!
//! let verified = verify_authentication(
//!     &credential,
//!     "challenge-issued-for-this-ceremony",
//!     "https://example.com",
//!     "example.com",
//!     "stored-credential-id",
//!     stored_key,
//!     41,
//! )?;
//!
//! // Persist the new counter before treating the user as signed in.
//! assert!(verified.sign_count == 0 || verified.sign_count > 41);
//! # Ok(())
//! # }
//! ```

pub mod authenticator_data;
pub mod base64url;
pub mod cbor;
pub mod ceremony;
pub mod challenge;
pub mod client_data;
pub mod config;
pub mod cose;
pub mod credential;
pub mod error;
pub mod options;
pub mod relying_party;
pub mod store;

// Re-export main types for convenience
pub use authenticator_data::AuthenticatorData;
pub use cbor::{CborMap, DecodedItem, MapKey};
pub use ceremony::{
    verify_authentication, verify_registration, AuthenticationVerificationResult,
    RegistrationVerificationResult,
};
pub use challenge::{ensure_credential_allowed, generate_challenge, normalize_transports};
pub use client_data::CollectedClientData;
pub use config::{ConfigError, RelyingPartyConfig};
pub use cose::JsonWebKey;
pub use credential::{AuthenticatorResponse, PublicKeyCredential};
pub use error::{Result, WebAuthnError};
pub use options::{CreationOptions, CredentialDescriptor, RequestOptions, UserEntity};
pub use relying_party::{CeremonyError, RelyingParty};
pub use store::{
    CredentialRecord, CredentialStore, MemoryCredentialStore, StoreError, UserRecord,
};

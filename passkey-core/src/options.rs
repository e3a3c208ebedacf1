//! Options passed to `navigator.credentials.create()` / `.get()`.
//!
//! Serialized as camelCase JSON matching the WebAuthn IDL dictionaries.

use serde::{Deserialize, Serialize};

use crate::ceremony::PUBLIC_KEY_CREDENTIAL_TYPE;
use crate::cose::COSE_ALG_ES256;

/// Default ceremony timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u32 = 60_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelyingPartyEntity {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEntity {
    /// Base64url user handle.
    pub id: String,
    pub name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialParameter {
    #[serde(rename = "type")]
    pub credential_type: String,
    pub alg: i64,
}

impl CredentialParameter {
    pub fn es256() -> Self {
        Self {
            credential_type: PUBLIC_KEY_CREDENTIAL_TYPE.into(),
            alg: COSE_ALG_ES256,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorSelection {
    pub authenticator_attachment: String,
    pub resident_key: String,
    pub user_verification: String,
}

impl Default for AuthenticatorSelection {
    /// Platform passkeys, discoverable, with user verification.
    fn default() -> Self {
        Self {
            authenticator_attachment: "platform".into(),
            resident_key: "required".into(),
            user_verification: "required".into(),
        }
    }
}

/// Entry of `allowCredentials` / `excludeCredentials`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialDescriptor {
    pub id: String,
    #[serde(rename = "type")]
    pub credential_type: String,
    #[serde(default)]
    pub transports: Vec<String>,
}

impl CredentialDescriptor {
    pub fn new(id: impl Into<String>, transports: Vec<String>) -> Self {
        Self {
            id: id.into(),
            credential_type: PUBLIC_KEY_CREDENTIAL_TYPE.into(),
            transports,
        }
    }
}

/// `PublicKeyCredentialCreationOptions` for registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreationOptions {
    pub challenge: String,
    pub rp: RelyingPartyEntity,
    pub user: UserEntity,
    pub pub_key_cred_params: Vec<CredentialParameter>,
    pub timeout: u32,
    pub attestation: String,
    pub authenticator_selection: AuthenticatorSelection,
    pub exclude_credentials: Vec<CredentialDescriptor>,
}

impl CreationOptions {
    pub fn new(challenge: impl Into<String>, rp: RelyingPartyEntity, user: UserEntity) -> Self {
        Self {
            challenge: challenge.into(),
            rp,
            user,
            pub_key_cred_params: vec![CredentialParameter::es256()],
            timeout: DEFAULT_TIMEOUT_MS,
            attestation: "none".into(),
            authenticator_selection: AuthenticatorSelection::default(),
            exclude_credentials: Vec::new(),
        }
    }

    pub fn with_timeout(mut self, timeout_ms: u32) -> Self {
        self.timeout = timeout_ms;
        self
    }

    pub fn exclude(mut self, credentials: impl IntoIterator<Item = CredentialDescriptor>) -> Self {
        self.exclude_credentials.extend(credentials);
        self
    }
}

/// `PublicKeyCredentialRequestOptions` for authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOptions {
    pub challenge: String,
    pub rp_id: String,
    pub timeout: u32,
    pub user_verification: String,
    pub allow_credentials: Vec<CredentialDescriptor>,
}

impl RequestOptions {
    pub fn new(challenge: impl Into<String>, rp_id: impl Into<String>) -> Self {
        Self {
            challenge: challenge.into(),
            rp_id: rp_id.into(),
            timeout: DEFAULT_TIMEOUT_MS,
            user_verification: "required".into(),
            allow_credentials: Vec::new(),
        }
    }

    pub fn with_timeout(mut self, timeout_ms: u32) -> Self {
        self.timeout = timeout_ms;
        self
    }

    pub fn allow(mut self, credentials: impl IntoIterator<Item = CredentialDescriptor>) -> Self {
        self.allow_credentials.extend(credentials);
        self
    }

    /// IDs a returned assertion may use, for [`ensure_credential_allowed`].
    ///
    /// [`ensure_credential_allowed`]: crate::challenge::ensure_credential_allowed
    pub fn allowed_ids(&self) -> Vec<&str> {
        self.allow_credentials
            .iter()
            .map(|descriptor| descriptor.id.as_str())
            .collect()
    }
}

//! Browser-submitted `PublicKeyCredential` payloads.
//!
//! Binary fields travel as base64url strings. Every field is optional at the
//! serde level so that missing or empty fields are reported by the verifier
//! as [`WebAuthnError::MalformedResponse`](crate::WebAuthnError) rather than
//! as a JSON error.

use serde::{Deserialize, Serialize};

use crate::base64url;

/// Credential returned by `navigator.credentials.create()` or `.get()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyCredential {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub raw_id: Option<String>,
    #[serde(default, rename = "type")]
    pub credential_type: Option<String>,
    #[serde(default)]
    pub response: Option<AuthenticatorResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticator_attachment: Option<String>,
}

/// Attestation (registration) or assertion (authentication) response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorResponse {
    #[serde(default, rename = "clientDataJSON")]
    pub client_data_json: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attestation_object: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticator_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transports: Option<Vec<String>>,
}

impl PublicKeyCredential {
    /// Normalized base64url credential ID taken from `rawId`, or `id` when
    /// `rawId` is absent.
    ///
    /// Returns `None` when neither field carries a decodable value.
    pub fn credential_id(&self) -> Option<String> {
        let raw = [&self.raw_id, &self.id]
            .into_iter()
            .flatten()
            .find(|value| !value.is_empty())?;

        let normalized = base64url::normalize(raw);
        (!normalized.is_empty()).then_some(normalized)
    }

    /// Transports reported by the browser, if any.
    pub fn transports(&self) -> &[String] {
        self.response
            .as_ref()
            .and_then(|response| response.transports.as_deref())
            .unwrap_or_default()
    }
}

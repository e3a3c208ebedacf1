//! Common utility functions shared across CLI commands.

use std::path::Path;

use anyhow::{Context, Result};
use passkey_core::{JsonWebKey, PublicKeyCredential};
use serde_json::Value;
use tracing::debug;

/// Load a credential JSON file.
///
/// Accepts either the bare `PublicKeyCredential` object or a request body
/// wrapping it as `{ "credential": { ... } }`.
pub fn load_credential(path: &Path) -> Result<PublicKeyCredential> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read credential file: {}", path.display()))?;

    parse_credential(&bytes)
        .with_context(|| format!("Failed to parse credential file: {}", path.display()))
}

fn parse_credential(bytes: &[u8]) -> Result<PublicKeyCredential> {
    let mut value: Value = serde_json::from_slice(bytes)?;

    if let Some(inner) = value.get_mut("credential").map(Value::take) {
        debug!("Unwrapped credential from request body");
        value = inner;
    }

    Ok(serde_json::from_value(value)?)
}

/// Load a stored public key in JWK form.
pub fn load_jwk(path: &Path) -> Result<JsonWebKey> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read public key file: {}", path.display()))?;

    serde_json::from_slice(&bytes)
        .with_context(|| format!("Failed to parse public key file: {}", path.display()))
}

/// Render bytes as lowercase hex, or `-` when absent.
pub fn hex_or_dash(bytes: Option<&[u8]>) -> String {
    bytes.map(hex::encode).unwrap_or_else(|| "-".to_string())
}

//! Inspect command implementation.

use anyhow::{Context, Result};
use colored::Colorize;
use passkey_core::authenticator_data::{
    FLAG_ATTESTED_DATA, FLAG_EXTENSION_DATA, FLAG_USER_PRESENT, FLAG_USER_VERIFIED,
};
use passkey_core::{base64url, AuthenticatorData, JsonWebKey};
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::utils::hex_or_dash;

const FLAG_NAMES: [(u8, &str); 4] = [
    (FLAG_USER_PRESENT, "UP"),
    (FLAG_USER_VERIFIED, "UV"),
    (FLAG_ATTESTED_DATA, "AT"),
    (FLAG_EXTENSION_DATA, "ED"),
];

fn flag_names(flags: u8) -> Vec<&'static str> {
    FLAG_NAMES
        .iter()
        .filter(|(bit, _)| flags & bit != 0)
        .map(|(_, name)| *name)
        .collect()
}

/// Execute the inspect command.
pub fn execute(encoded: &str, rp_id: Option<&str>, json: bool) -> Result<()> {
    let bytes = base64url::decode(encoded);
    let parsed = AuthenticatorData::parse(&bytes).context("Failed to parse authenticator data")?;

    let rp_id_matches = rp_id.map(|rp_id| {
        let expected: [u8; 32] = Sha256::digest(rp_id).into();
        expected == parsed.rp_id_hash
    });

    // Key conversion failures are reported, not fatal: inspection is diagnostic.
    let jwk = parsed.cose_public_key.as_deref().map(JsonWebKey::from_cose);

    if json {
        let public_key = match &jwk {
            Some(Ok(jwk)) => serde_json::to_value(jwk)?,
            Some(Err(err)) => json!({ "error": err.code() }),
            None => serde_json::Value::Null,
        };
        let output = json!({
            "rpIdHash": hex::encode(parsed.rp_id_hash),
            "rpIdMatches": rp_id_matches,
            "flags": parsed.flags,
            "flagNames": flag_names(parsed.flags),
            "userPresent": parsed.user_present,
            "userVerified": parsed.user_verified,
            "signCount": parsed.sign_count,
            "aaguid": parsed.aaguid.map(hex::encode),
            "credentialId": parsed.credential_id.as_ref().map(base64url::encode),
            "publicKeyJwk": public_key,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", "Authenticator data".bold());
    println!("   {} {}", "RP ID hash:".dimmed(), hex::encode(parsed.rp_id_hash));
    match rp_id_matches {
        Some(true) => println!("   {} {}", "RP ID:".dimmed(), "matches".green()),
        Some(false) => println!("   {} {}", "RP ID:".dimmed(), "does not match".red()),
        None => {}
    }
    println!(
        "   {} {:#04x} [{}]",
        "Flags:".dimmed(),
        parsed.flags,
        flag_names(parsed.flags).join(" ")
    );
    println!("   {} {}", "Sign count:".dimmed(), parsed.sign_count);

    if parsed.has_attested_credential_data() {
        println!(
            "   {} {}",
            "AAGUID:".dimmed(),
            hex_or_dash(parsed.aaguid.as_ref().map(|aaguid| &aaguid[..]))
        );
        println!(
            "   {} {}",
            "Credential ID:".dimmed(),
            parsed
                .credential_id
                .as_ref()
                .map(base64url::encode)
                .unwrap_or_default()
        );
        match jwk {
            Some(Ok(jwk)) => println!(
                "   {} {} {} x={} y={}",
                "Public key:".dimmed(),
                jwk.crv,
                jwk.alg,
                jwk.x,
                jwk.y
            ),
            Some(Err(err)) => println!("   {} {}", "Public key:".dimmed(), err.to_string().red()),
            None => {}
        }
    }
    Ok(())
}

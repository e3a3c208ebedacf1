//! Verify command implementations.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use passkey_core::{base64url, verify_authentication, verify_registration};
use tracing::info;

use crate::utils::{load_credential, load_jwk};

/// Values the relying party issued for this ceremony.
#[derive(Args)]
pub struct Expected {
    /// Challenge issued for the ceremony (base64url)
    #[arg(long)]
    pub challenge: String,

    /// Expected origin, e.g. https://example.com
    #[arg(long)]
    pub origin: String,

    /// Relying Party ID, e.g. example.com
    #[arg(long)]
    pub rp_id: String,
}

fn print_banner(title: &str) {
    println!();
    println!("{}", "╔════════════════════════════════════════╗".green());
    println!("{}", format!("║{title:^40}║").green().bold());
    println!("{}", "╚════════════════════════════════════════╝".green());
    println!();
}

/// Execute the verify-registration command.
pub fn registration(file: &Path, expected: &Expected, json: bool) -> Result<()> {
    let credential = load_credential(file)?;
    info!(path = %file.display(), "Read registration credential");

    let result = verify_registration(
        &credential,
        &expected.challenge,
        &expected.origin,
        &expected.rp_id,
    )
    .context("Registration verification failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    print_banner("REGISTRATION VERIFIED");
    println!("   {} {}", "Credential ID:".dimmed(), result.credential_id);
    println!(
        "   {} {} {}",
        "Public key:".dimmed(),
        result.public_key_jwk.crv,
        result.public_key_jwk.alg
    );
    println!("   {} {}", "Sign count:".dimmed(), result.sign_count);
    println!(
        "   {} {}",
        "Client data hash:".dimmed(),
        hex::encode(result.client_data_hash)
    );
    println!();
    println!("{}", "Public key JWK:".dimmed());
    println!("{}", serde_json::to_string_pretty(&result.public_key_jwk)?);
    Ok(())
}

/// Execute the verify-authentication command.
pub fn authentication(
    file: &Path,
    expected: &Expected,
    credential_id: &str,
    public_key: &Path,
    sign_count: u32,
    json: bool,
) -> Result<()> {
    let credential = load_credential(file)?;
    let jwk = load_jwk(public_key)?;
    info!(path = %file.display(), "Read authentication credential");

    let result = verify_authentication(
        &credential,
        &expected.challenge,
        &expected.origin,
        &expected.rp_id,
        credential_id,
        &jwk,
        sign_count,
    )
    .context("Authentication verification failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    print_banner("AUTHENTICATION VERIFIED");
    println!("   {} {}", "Credential ID:".dimmed(), result.credential_id);
    println!(
        "   {} {} -> {}",
        "Sign count:".dimmed(),
        sign_count,
        result.sign_count
    );
    if result.sign_count == 0 {
        println!(
            "   {} {}",
            "Note:".dimmed(),
            "authenticator does not implement a signature counter".yellow()
        );
    }
    if let Some(handle) = credential
        .response
        .as_ref()
        .and_then(|response| response.user_handle.as_deref())
    {
        println!(
            "   {} {}",
            "User handle:".dimmed(),
            base64url::normalize(handle)
        );
    }
    Ok(())
}

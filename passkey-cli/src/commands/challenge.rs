//! Challenge command implementation.

use anyhow::{Context, Result};
use passkey_core::challenge::random_base64url;
use tracing::info;

/// Print a fresh random challenge.
pub fn execute(bytes: usize, json: bool) -> Result<()> {
    let challenge =
        random_base64url(bytes).context("Failed to read randomness from the operating system")?;

    info!(bytes, "Generated challenge");

    if json {
        println!("{}", serde_json::json!({ "challenge": challenge }));
    } else {
        println!("{challenge}");
    }
    Ok(())
}

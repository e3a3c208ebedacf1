//! Authenticator data parsing.
//!
//! Layout (WebAuthn §6.1):
//!
//! ```text
//! rpIdHash (32) | flags (1) | signCount (4, BE)
//!   [ aaguid (16) | credIdLen (2, BE) | credId (credIdLen) | COSE key (CBOR) ]
//!   [ extensions (CBOR) ]
//! ```
//!
//! The bracketed attested credential data is present only when the `AT`
//! flag (0x40) is set.

use crate::cbor;
use crate::error::{Result, WebAuthnError};

/// User present.
pub const FLAG_USER_PRESENT: u8 = 0x01;
/// User verified.
pub const FLAG_USER_VERIFIED: u8 = 0x04;
/// Attested credential data included.
pub const FLAG_ATTESTED_DATA: u8 = 0x40;
/// Extension data included.
pub const FLAG_EXTENSION_DATA: u8 = 0x80;

/// Length of the fixed header: RP ID hash, flags and counter.
pub const MIN_AUTH_DATA_LEN: usize = 37;

const RP_ID_HASH_LEN: usize = 32;
const AAGUID_LEN: usize = 16;

/// Parsed authenticator data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatorData {
    /// SHA-256 of the RP ID the authenticator scoped the credential to.
    pub rp_id_hash: [u8; 32],
    /// Raw flags byte.
    pub flags: u8,
    pub user_present: bool,
    pub user_verified: bool,
    /// Signature counter, 0 for authenticators without one.
    pub sign_count: u32,
    /// Authenticator model identifier (attested data only).
    pub aaguid: Option<[u8; 16]>,
    /// Credential ID (attested data only).
    pub credential_id: Option<Vec<u8>>,
    /// Raw CBOR bytes of the COSE public key (attested data only).
    pub cose_public_key: Option<Vec<u8>>,
}

impl AuthenticatorData {
    /// Parse authenticator data bytes.
    ///
    /// Attested credential fields are populated if and only if the `AT`
    /// flag is set; when set, every field must fit inside the buffer.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < MIN_AUTH_DATA_LEN {
            return Err(WebAuthnError::TooShort(format!(
                "{} bytes, need at least {MIN_AUTH_DATA_LEN}",
                bytes.len()
            )));
        }

        let mut rp_id_hash = [0u8; RP_ID_HASH_LEN];
        rp_id_hash.copy_from_slice(&bytes[..RP_ID_HASH_LEN]);
        let flags = bytes[32];
        let sign_count = u32::from_be_bytes([bytes[33], bytes[34], bytes[35], bytes[36]]);

        let mut parsed = Self {
            rp_id_hash,
            flags,
            user_present: flags & FLAG_USER_PRESENT != 0,
            user_verified: flags & FLAG_USER_VERIFIED != 0,
            sign_count,
            aaguid: None,
            credential_id: None,
            cose_public_key: None,
        };

        if flags & FLAG_ATTESTED_DATA == 0 {
            return Ok(parsed);
        }

        let mut offset = MIN_AUTH_DATA_LEN;

        let aaguid = take(bytes, &mut offset, AAGUID_LEN, "AAGUID")?;
        let mut aaguid_bytes = [0u8; AAGUID_LEN];
        aaguid_bytes.copy_from_slice(aaguid);

        let length = take(bytes, &mut offset, 2, "credential ID length")?;
        let credential_id_len = usize::from(u16::from_be_bytes([length[0], length[1]]));
        let credential_id = take(bytes, &mut offset, credential_id_len, "credential ID")?;

        if offset >= bytes.len() {
            return Err(WebAuthnError::TooShort(
                "attested credential data is missing the public key".into(),
            ));
        }
        let (_, key_end) = cbor::decode(bytes, offset)?;

        parsed.aaguid = Some(aaguid_bytes);
        parsed.credential_id = Some(credential_id.to_vec());
        parsed.cose_public_key = Some(bytes[offset..key_end].to_vec());

        Ok(parsed)
    }

    /// Whether both the user-present and user-verified flags are set.
    pub fn is_user_verified(&self) -> bool {
        self.user_present && self.user_verified
    }

    pub fn has_attested_credential_data(&self) -> bool {
        self.flags & FLAG_ATTESTED_DATA != 0
    }

    pub fn has_extension_data(&self) -> bool {
        self.flags & FLAG_EXTENSION_DATA != 0
    }
}

/// Borrow `len` bytes at `offset` and advance it.
fn take<'a>(bytes: &'a [u8], offset: &mut usize, len: usize, what: &str) -> Result<&'a [u8]> {
    let end = offset
        .checked_add(len)
        .filter(|end| *end <= bytes.len())
        .ok_or_else(|| {
            WebAuthnError::TooShort(format!("attested credential data truncated in {what}"))
        })?;
    let slice = &bytes[*offset..end];
    *offset = end;
    Ok(slice)
}

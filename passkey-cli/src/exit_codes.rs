//! Exit codes following sysexits.h conventions.
//!
//! These codes let scripts tell a rejected ceremony apart from a missing
//! input file or a usage mistake.

use passkey_core::{CeremonyError, WebAuthnError};

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// General error (catch-all).
pub const GENERAL_ERROR: i32 = 1;

/// Data format error (verification failed, malformed credential JSON).
/// Maps to EX_DATAERR from sysexits.h.
pub const VERIFICATION_FAILED: i32 = 65;

/// Cannot open input file.
/// Maps to EX_NOINPUT from sysexits.h.
pub const INPUT_ERROR: i32 = 66;

/// Represents an exit code with optional error context.
#[derive(Debug)]
pub struct ExitCode {
    pub code: i32,
    pub message: Option<String>,
}

impl ExitCode {
    pub const fn success() -> Self {
        Self {
            code: SUCCESS,
            message: None,
        }
    }

    /// Classify an error by the first recognizable cause in its chain.
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let code = err
            .chain()
            .find_map(|cause| {
                if cause.is::<WebAuthnError>()
                    || cause.is::<CeremonyError>()
                    || cause.is::<serde_json::Error>()
                {
                    Some(VERIFICATION_FAILED)
                } else if cause.is::<std::io::Error>() {
                    Some(INPUT_ERROR)
                } else {
                    None
                }
            })
            .unwrap_or(GENERAL_ERROR);

        Self {
            code,
            message: Some(format!("{err:#}")),
        }
    }
}

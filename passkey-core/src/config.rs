//! Relying Party configuration

use url::Url;

use crate::options::DEFAULT_TIMEOUT_MS;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid origin URL: {0}")]
    InvalidOrigin(String),

    #[error("Invalid RP ID: {0}")]
    InvalidRpId(String),

    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),
}

/// Relying Party identity and ceremony policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelyingPartyConfig {
    /// Bare hostname the credentials are scoped to.
    pub rp_id: String,
    /// Normalized `scheme://host[:port]` origin, no trailing slash.
    pub origin: String,
    /// Human-readable name shown by the authenticator.
    pub rp_name: String,
    /// Ceremony timeout in milliseconds.
    pub timeout: u32,
}

impl RelyingPartyConfig {
    /// Create a validated configuration.
    ///
    /// # Arguments
    ///
    /// * `rp_id` - Relying Party ID (typically the domain name)
    /// * `origin` - Origin the browser reports in client data
    /// * `rp_name` - Human-readable name for the Relying Party
    pub fn new(rp_id: &str, origin: &str, rp_name: &str) -> Result<Self, ConfigError> {
        let rp_id = rp_id.trim();
        if rp_id.is_empty() || rp_id.contains(['/', ':']) {
            return Err(ConfigError::InvalidRpId(rp_id.to_string()));
        }

        Ok(Self {
            rp_id: rp_id.to_string(),
            origin: normalize_origin(origin)?,
            rp_name: rp_name.to_string(),
            timeout: DEFAULT_TIMEOUT_MS,
        })
    }

    pub fn with_timeout(mut self, timeout_ms: u32) -> Self {
        self.timeout = timeout_ms;
        self
    }

    /// Create configuration from environment variables
    ///
    /// Environment variables:
    /// - `WEBAUTHN_RP_ID` - Relying Party ID (default: "localhost")
    /// - `WEBAUTHN_RP_ORIGIN` - RP origin URL (default: "http://localhost:3000")
    /// - `WEBAUTHN_RP_NAME` - RP display name (default: "Passkey")
    /// - `WEBAUTHN_TIMEOUT_MS` - ceremony timeout (default: 60000)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let rp_id = lookup("WEBAUTHN_RP_ID").unwrap_or_else(|| "localhost".to_string());
        let origin =
            lookup("WEBAUTHN_RP_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());
        let rp_name = lookup("WEBAUTHN_RP_NAME").unwrap_or_else(|| "Passkey".to_string());

        let config = Self::new(&rp_id, &origin, &rp_name)?;

        match lookup("WEBAUTHN_TIMEOUT_MS") {
            Some(raw) => {
                let timeout = raw
                    .trim()
                    .parse::<u32>()
                    .ok()
                    .filter(|ms| *ms > 0)
                    .ok_or(ConfigError::InvalidTimeout(raw))?;
                Ok(config.with_timeout(timeout))
            }
            None => Ok(config),
        }
    }
}

/// Validate an origin and reduce it to `scheme://host[:port]`.
pub fn normalize_origin(origin: &str) -> Result<String, ConfigError> {
    let url = Url::parse(origin.trim()).map_err(|e| ConfigError::InvalidOrigin(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidOrigin(format!(
            "unsupported scheme {}",
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(ConfigError::InvalidOrigin("missing host".into()));
    }
    if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
        return Err(ConfigError::InvalidOrigin(
            "origin must not have a path, query or fragment".into(),
        ));
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(ConfigError::InvalidOrigin("origin must not carry credentials".into()));
    }

    Ok(url.origin().ascii_serialization())
}

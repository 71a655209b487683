//! Engine configuration.
//!
//! The signing secret and TTLs are passed as an explicit configuration
//! object into constructors — never read from ambient global state — so
//! isolated engine instances can run concurrently in tests. A missing or
//! undersized secret is the one fatal startup condition: the service must
//! refuse to start rather than fail lazily per request.

use chrono::Duration;
use thiserror::Error;

/// Minimum signing secret length in bytes (HS256 key material).
pub const MIN_SECRET_BYTES: usize = 32;

const ENV_SECRET: &str = "LEARNGATE_SIGNING_SECRET";
const ENV_ACCESS_TTL_MINUTES: &str = "LEARNGATE_ACCESS_TTL_MINUTES";
const ENV_REFRESH_TTL_DAYS: &str = "LEARNGATE_REFRESH_TTL_DAYS";
const ENV_RESET_TTL_MINUTES: &str = "LEARNGATE_RESET_TTL_MINUTES";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("signing secret must be at least {MIN_SECRET_BYTES} bytes, got {0}")]
    SecretTooShort(usize),

    #[error("missing required configuration: {0}")]
    Missing(&'static str),

    #[error("invalid configuration value for {key}: {message}")]
    Invalid {
        key: &'static str,
        message: String,
    },
}

/// Symmetric signing secret (≥ 32 bytes).
///
/// Debug output is redacted; the raw bytes are only exposed to the token
/// codec.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        let bytes = bytes.into();
        if bytes.len() < MIN_SECRET_BYTES {
            return Err(ConfigError::SecretTooShort(bytes.len()));
        }
        Ok(Self(bytes))
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl core::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SigningSecret(..)")
    }
}

/// Configuration consumed by the token codec and the auth engine.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub secret: SigningSecret,
    /// Access token lifetime (short — minutes).
    pub access_ttl: Duration,
    /// Refresh token lifetime (long — days). Also bounds the session record.
    pub refresh_ttl: Duration,
    /// Password-reset token lifetime.
    pub reset_ttl: Duration,
}

impl AuthConfig {
    pub fn new(secret: SigningSecret) -> Self {
        Self {
            secret,
            access_ttl: Duration::minutes(30),
            refresh_ttl: Duration::days(7),
            reset_ttl: Duration::minutes(60),
        }
    }

    pub fn with_access_ttl(mut self, ttl: Duration) -> Self {
        self.access_ttl = ttl;
        self
    }

    pub fn with_refresh_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_ttl = ttl;
        self
    }

    pub fn with_reset_ttl(mut self, ttl: Duration) -> Self {
        self.reset_ttl = ttl;
        self
    }

    /// Load configuration from the environment.
    ///
    /// The secret is required; TTLs fall back to 30 minutes (access),
    /// 7 days (refresh) and 60 minutes (reset).
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = std::env::var(ENV_SECRET).map_err(|_| ConfigError::Missing(ENV_SECRET))?;
        let secret = SigningSecret::new(secret.into_bytes())?;

        let mut config = Self::new(secret);
        if let Some(minutes) = read_env_i64(ENV_ACCESS_TTL_MINUTES)? {
            config.access_ttl = Duration::minutes(minutes);
        }
        if let Some(days) = read_env_i64(ENV_REFRESH_TTL_DAYS)? {
            config.refresh_ttl = Duration::days(days);
        }
        if let Some(minutes) = read_env_i64(ENV_RESET_TTL_MINUTES)? {
            config.reset_ttl = Duration::minutes(minutes);
        }
        Ok(config)
    }
}

fn read_env_i64(key: &'static str) -> Result<Option<i64>, ConfigError> {
    match std::env::var(key) {
        Err(_) => Ok(None),
        Ok(raw) => {
            let value: i64 = raw.parse().map_err(|_| ConfigError::Invalid {
                key,
                message: format!("expected an integer, got '{raw}'"),
            })?;
            if value <= 0 {
                return Err(ConfigError::Invalid {
                    key,
                    message: "must be positive".to_string(),
                });
            }
            Ok(Some(value))
        }
    }
}

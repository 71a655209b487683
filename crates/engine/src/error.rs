//! Request-boundary error kinds.
//!
//! Every variant is recoverable at the request boundary; the only fatal
//! condition in the system is invalid startup configuration, which is
//! rejected before an engine exists (`learngate_auth::ConfigError`).

use thiserror::Error;

use learngate_auth::{PasswordError, TokenError};
use learngate_sessions::SessionStoreError;

use crate::credential_store::CredentialStoreError;

/// Error kinds exposed to the transport layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Bad password, unknown identifier, inactive or unverified account —
    /// deliberately one indistinguishable kind, so callers cannot
    /// enumerate accounts.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The token failed to parse or its signature failed to verify.
    #[error("malformed token")]
    TokenMalformed,

    /// The token's own expiry has passed.
    #[error("token expired")]
    TokenExpired,

    /// Revoked, rotated-away, or unknown session.
    #[error("session invalid")]
    SessionInvalid,

    /// Valid session, insufficient permission.
    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),

    /// Lost a concurrent refresh race; the session has been revoked.
    #[error("concurrent refresh conflict")]
    Conflict,

    /// A storage collaborator failed.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AuthError::TokenExpired,
            // Signature and type failures reveal nothing beyond "bad token".
            TokenError::Malformed
            | TokenError::SignatureInvalid
            | TokenError::UnexpectedType { .. } => AuthError::TokenMalformed,
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        // Hashing failures are backend trouble, never a credential verdict.
        AuthError::Unavailable(err.to_string())
    }
}

impl From<CredentialStoreError> for AuthError {
    fn from(err: CredentialStoreError) -> Self {
        AuthError::Unavailable(err.to_string())
    }
}

impl From<SessionStoreError> for AuthError {
    fn from(err: SessionStoreError) -> Self {
        match err {
            SessionStoreError::Backend(msg) => AuthError::Unavailable(msg),
            SessionStoreError::NotFound | SessionStoreError::AlreadyRevoked => {
                AuthError::SessionInvalid
            }
            SessionStoreError::Conflict => AuthError::Conflict,
        }
    }
}

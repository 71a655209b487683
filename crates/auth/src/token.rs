//! Signed-token codec (HS256).
//!
//! Issuance and decoding are pure functions of (claims, secret, clock):
//! the codec never consults the session registry — revocation is layered
//! on top by the engine. Library-side `exp` validation is disabled and
//! expiry is checked against the caller-supplied `now` instead, so tests
//! drive expiry through the injected clock.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use thiserror::Error;

use learngate_core::{Jti, OrganizationId, UserId};

use crate::claims::{Claims, TokenType};
use crate::config::AuthConfig;
use crate::roles::Role;

/// Token decode failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Not a parseable token, or required claims are missing.
    #[error("malformed token")]
    Malformed,

    /// Signature does not verify against the configured secret.
    #[error("invalid token signature")]
    SignatureInvalid,

    /// `exp` is at or before the supplied `now`.
    #[error("token expired")]
    Expired,

    /// The `type` claim does not match what the caller expected.
    #[error("unexpected token type: expected {expected}, got {actual}")]
    UnexpectedType {
        expected: TokenType,
        actual: TokenType,
    },
}

/// Encodes and decodes signed, expiring claim sets.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl core::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("TokenCodec(HS256)")
    }
}

impl TokenCodec {
    /// Build a codec from the signing secret. The algorithm is fixed at
    /// process start (HS256) and never negotiated per token.
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.secret.as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the injected clock, not the wall clock.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issue a signed token for `user`, valid for `ttl` from `now`.
    ///
    /// Every call generates a fresh random jti; the returned jti is what the
    /// session registry records.
    pub fn issue(
        &self,
        user: UserId,
        role: Role,
        org: Option<OrganizationId>,
        token_type: TokenType,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<(String, Jti), TokenError> {
        let jti = Jti::random();
        let claims = Claims {
            sub: user,
            role,
            org,
            jti,
            token_type,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|_| TokenError::Malformed)?;
        Ok((token, jti))
    }

    /// Verify signature, token type and expiry, returning the claims.
    pub fn decode(
        &self,
        token: &str,
        expected: TokenType,
        now: DateTime<Utc>,
    ) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
                _ => TokenError::Malformed,
            }
        })?;
        let claims = data.claims;

        if claims.token_type != expected {
            return Err(TokenError::UnexpectedType {
                expected,
                actual: claims.token_type,
            });
        }

        if claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

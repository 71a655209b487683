//! Token claims model (transport-agnostic).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use learngate_core::{Jti, OrganizationId, UserId};

use crate::roles::Role;

/// Discriminates the three token kinds the codec issues.
///
/// The codec refuses to decode a token whose `type` claim does not match
/// what the caller expects, so a long-lived refresh token can never stand
/// in for an access token (and vice versa).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
    PasswordReset,
}

impl core::fmt::Display for TokenType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TokenType::Access => f.write_str("access"),
            TokenType::Refresh => f.write_str("refresh"),
            TokenType::PasswordReset => f.write_str("password_reset"),
        }
    }
}

/// Claims carried by every issued token.
///
/// The client holds the encoded token; the server persists only the `jti`
/// (on the session record) as its revocation handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject — the authenticated user.
    pub sub: UserId,

    /// Role granted at issuance. Baked in: later role edits never apply
    /// retroactively to this token.
    pub role: Role,

    /// Organization context (absent for system administrators).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<OrganizationId>,

    /// Unique token identifier (revocation handle).
    pub jti: Jti,

    /// Token kind.
    #[serde(rename = "type")]
    pub token_type: TokenType,

    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,

    /// Expires-at, seconds since the Unix epoch.
    pub exp: i64,
}

impl Claims {
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Claims {
        Claims {
            sub: UserId::new(),
            role: Role::Teacher,
            org: Some(OrganizationId::new()),
            jti: Jti::random(),
            token_type: TokenType::Access,
            iat: 1_700_000_000,
            exp: 1_700_001_800,
        }
    }

    #[test]
    fn claims_serde_round_trip() {
        let claims = sample();
        let json = serde_json::to_string(&claims).unwrap();
        let back: Claims = serde_json::from_str(&json).unwrap();
        assert_eq!(claims, back);
    }

    #[test]
    fn token_type_serializes_as_type_claim() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["type"], "access");
        assert!(json.get("token_type").is_none());
    }

    #[test]
    fn org_is_omitted_when_absent() {
        let mut claims = sample();
        claims.org = None;
        let json = serde_json::to_value(claims).unwrap();
        assert!(json.get("org").is_none());
    }

    #[test]
    fn timestamps_convert_back_to_datetimes() {
        let claims = sample();
        let issued = claims.issued_at().unwrap();
        let expires = claims.expires_at().unwrap();
        assert!(expires > issued);
    }
}

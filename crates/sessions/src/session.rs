//! Session record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use learngate_core::{Jti, SessionId, UserId};

/// Server-side record pairing a user with the currently valid
/// access/refresh jti pair.
///
/// # Invariants
/// - At most one active (non-revoked, non-expired) session exists per
///   (user, refresh jti) pair; a user may hold many concurrent sessions
///   (multi-device), each with an independent jti pair.
/// - Rotation is in-place: the record keeps its id and both jtis are
///   swapped atomically, so a stolen pre-rotation refresh token dies the
///   instant rotation lands.
/// - `spent_refresh_jtis` remembers every rotated-away refresh jti for the
///   record's lifetime; presenting any of them again is the token-theft
///   signal that triggers revocation, no matter how many rotations ago it
///   was spent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    pub access_jti: Jti,
    pub refresh_jti: Jti,
    /// Refresh jtis replaced by past rotations, oldest first.
    pub spent_refresh_jtis: Vec<Jti>,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Active means usable: not revoked and not expired.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && !self.is_expired(now)
    }

    /// Whether `jti` is one of the record's *current* token identifiers.
    pub fn holds_jti(&self, jti: &Jti) -> bool {
        self.access_jti == *jti || self.refresh_jti == *jti
    }

    /// Whether `jti` was rotated away at some point in this session's life.
    pub fn is_spent_refresh(&self, jti: &Jti) -> bool {
        self.spent_refresh_jtis.contains(jti)
    }
}

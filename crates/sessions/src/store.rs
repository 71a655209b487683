//! Session registry contract.

use chrono::{DateTime, Utc};
use thiserror::Error;

use learngate_core::{Jti, SessionId, UserId};

use crate::session::Session;

/// Session registry failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionStoreError {
    /// No session with the given id.
    #[error("session not found")]
    NotFound,

    /// The session was already revoked.
    #[error("session already revoked")]
    AlreadyRevoked,

    /// The presented refresh jti no longer matches the stored one — a
    /// concurrent rotation won the race.
    #[error("refresh jti conflict: session was rotated concurrently")]
    Conflict,

    /// Backend failure (lock poisoning, connection loss, ...).
    #[error("session store unavailable: {0}")]
    Backend(String),
}

/// Authoritative record of issued token pairs per user.
///
/// Calls are synchronous and fallible; retries, if any, belong to the
/// storage implementation, not the callers. Implementations must make
/// [`rotate`](SessionStore::rotate) an atomic check-and-update per session
/// so that two concurrent rotations with the same presented jti produce
/// exactly one success. `create` and `revoke` need no cross-session
/// coordination.
pub trait SessionStore: Send + Sync {
    /// Record a freshly issued token pair. Safe under concurrent creation
    /// for the same user (multi-device login).
    fn create(
        &self,
        user_id: UserId,
        access_jti: Jti,
        refresh_jti: Jti,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Session, SessionStoreError>;

    /// Find the session whose *current* refresh jti is `jti`.
    fn find_by_refresh_jti(&self, jti: &Jti) -> Result<Option<Session>, SessionStoreError>;

    /// Find the session for which `jti` is a *rotated-away* refresh jti,
    /// from any past rotation generation.
    ///
    /// A hit here means someone is replaying a refresh token that was
    /// already spent — the caller should treat it as theft and revoke.
    fn find_by_stale_refresh_jti(&self, jti: &Jti) -> Result<Option<Session>, SessionStoreError>;

    /// Find the session whose current access jti is `jti`.
    fn find_by_access_jti(&self, jti: &Jti) -> Result<Option<Session>, SessionStoreError>;

    /// Atomically replace both jtis on the record, keyed on the presented
    /// refresh jti matching the stored one.
    ///
    /// Errors: [`NotFound`](SessionStoreError::NotFound) for an unknown id,
    /// [`AlreadyRevoked`](SessionStoreError::AlreadyRevoked) for a revoked
    /// session, [`Conflict`](SessionStoreError::Conflict) when the presented
    /// jti lost a rotation race.
    fn rotate(
        &self,
        session_id: SessionId,
        presented_refresh_jti: Jti,
        new_access_jti: Jti,
        new_refresh_jti: Jti,
        new_expires_at: DateTime<Utc>,
    ) -> Result<Session, SessionStoreError>;

    /// Set the revoked flag. Idempotent; revoking an unknown or already
    /// revoked session is not an error.
    fn revoke(&self, session_id: SessionId) -> Result<(), SessionStoreError>;

    /// Revoke every session of a user (password change forces re-login
    /// everywhere). Returns how many sessions were newly revoked.
    fn revoke_all_for_user(&self, user_id: UserId) -> Result<usize, SessionStoreError>;

    /// Whether a non-revoked, non-expired session currently holds `jti` as
    /// its access or refresh identifier.
    fn is_active(&self, jti: &Jti, now: DateTime<Utc>) -> Result<bool, SessionStoreError>;
}

//! In-memory session registry.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use learngate_core::{Jti, SessionId, UserId};

use crate::session::Session;
use crate::store::{SessionStore, SessionStoreError};

#[derive(Debug, Default)]
struct Inner {
    sessions: HashMap<SessionId, Session>,
    /// Current access/refresh jtis plus rotated-away refresh jtis, all
    /// pointing at the owning session.
    by_jti: HashMap<Jti, SessionId>,
}

/// In-memory [`SessionStore`].
///
/// Suitable for tests and single-process deployments. Expired sessions are
/// filtered at read time and never eagerly deleted; physical cleanup is an
/// external sweep's job. All mutation happens under one write lock, which
/// is what makes `rotate` an atomic compare-and-swap.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    inner: RwLock<Inner>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Inner>, SessionStoreError> {
        self.inner
            .read()
            .map_err(|_| SessionStoreError::Backend("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Inner>, SessionStoreError> {
        self.inner
            .write()
            .map_err(|_| SessionStoreError::Backend("lock poisoned".to_string()))
    }
}

impl SessionStore for InMemorySessionStore {
    fn create(
        &self,
        user_id: UserId,
        access_jti: Jti,
        refresh_jti: Jti,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Session, SessionStoreError> {
        let session = Session {
            id: SessionId::new(),
            user_id,
            access_jti,
            refresh_jti,
            spent_refresh_jtis: Vec::new(),
            expires_at,
            revoked: false,
            created_at: now,
        };

        let mut inner = self.write()?;
        inner.by_jti.insert(access_jti, session.id);
        inner.by_jti.insert(refresh_jti, session.id);
        inner.sessions.insert(session.id, session.clone());

        debug!(session_id = %session.id, user_id = %user_id, "session created");
        Ok(session)
    }

    fn find_by_refresh_jti(&self, jti: &Jti) -> Result<Option<Session>, SessionStoreError> {
        let inner = self.read()?;
        Ok(inner
            .by_jti
            .get(jti)
            .and_then(|id| inner.sessions.get(id))
            .filter(|s| s.refresh_jti == *jti)
            .cloned())
    }

    fn find_by_stale_refresh_jti(&self, jti: &Jti) -> Result<Option<Session>, SessionStoreError> {
        let inner = self.read()?;
        Ok(inner
            .by_jti
            .get(jti)
            .and_then(|id| inner.sessions.get(id))
            .filter(|s| s.is_spent_refresh(jti))
            .cloned())
    }

    fn find_by_access_jti(&self, jti: &Jti) -> Result<Option<Session>, SessionStoreError> {
        let inner = self.read()?;
        Ok(inner
            .by_jti
            .get(jti)
            .and_then(|id| inner.sessions.get(id))
            .filter(|s| s.access_jti == *jti)
            .cloned())
    }

    fn rotate(
        &self,
        session_id: SessionId,
        presented_refresh_jti: Jti,
        new_access_jti: Jti,
        new_refresh_jti: Jti,
        new_expires_at: DateTime<Utc>,
    ) -> Result<Session, SessionStoreError> {
        let mut inner = self.write()?;

        let session = inner
            .sessions
            .get(&session_id)
            .ok_or(SessionStoreError::NotFound)?;

        if session.revoked {
            return Err(SessionStoreError::AlreadyRevoked);
        }

        // Compare-and-swap on the stored refresh jti: under this write lock
        // at most one of two concurrent rotations can see a match.
        if session.refresh_jti != presented_refresh_jti {
            warn!(
                session_id = %session_id,
                presented = %presented_refresh_jti,
                "rotation conflict: presented refresh jti is not current"
            );
            return Err(SessionStoreError::Conflict);
        }

        let old_access = session.access_jti;
        let old_refresh = session.refresh_jti;

        let session = inner
            .sessions
            .get_mut(&session_id)
            .ok_or(SessionStoreError::NotFound)?;
        session.access_jti = new_access_jti;
        session.refresh_jti = new_refresh_jti;
        session.spent_refresh_jtis.push(old_refresh);
        session.expires_at = new_expires_at;
        let rotated = session.clone();

        // Old access jti is dead immediately; every spent refresh jti stays
        // indexed so its reuse can be detected and punished.
        inner.by_jti.remove(&old_access);
        inner.by_jti.insert(new_access_jti, session_id);
        inner.by_jti.insert(new_refresh_jti, session_id);

        debug!(session_id = %session_id, "session rotated");
        Ok(rotated)
    }

    fn revoke(&self, session_id: SessionId) -> Result<(), SessionStoreError> {
        let mut inner = self.write()?;
        if let Some(session) = inner.sessions.get_mut(&session_id) {
            if !session.revoked {
                session.revoked = true;
                debug!(session_id = %session_id, "session revoked");
            }
        }
        Ok(())
    }

    fn revoke_all_for_user(&self, user_id: UserId) -> Result<usize, SessionStoreError> {
        let mut inner = self.write()?;
        let mut revoked = 0;
        for session in inner.sessions.values_mut() {
            if session.user_id == user_id && !session.revoked {
                session.revoked = true;
                revoked += 1;
            }
        }
        if revoked > 0 {
            debug!(user_id = %user_id, count = revoked, "revoked all sessions for user");
        }
        Ok(revoked)
    }

    fn is_active(&self, jti: &Jti, now: DateTime<Utc>) -> Result<bool, SessionStoreError> {
        let inner = self.read()?;
        Ok(inner
            .by_jti
            .get(jti)
            .and_then(|id| inner.sessions.get(id))
            .is_some_and(|s| s.holds_jti(jti) && s.is_active(now)))
    }
}

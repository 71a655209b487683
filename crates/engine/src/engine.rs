//! Auth engine — login, refresh, authorize, logout, password flows.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use learngate_auth::{
    AuthConfig, Claims, PasswordVerifier, Permission, TokenCodec, TokenType, rbac,
};
use learngate_core::{Clock, SessionId, UserId};
use learngate_sessions::{SessionStore, SessionStoreError};

use crate::credential_store::{CredentialStore, UserRecord};
use crate::error::AuthError;

/// Access + refresh token pair returned on login and refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Result of a successful authorization check.
///
/// Carries the decoded claims so callers thread identity explicitly
/// instead of resolving a "current user" from ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGrant {
    pub claims: Claims,
    pub session_id: SessionId,
}

/// Orchestrates credential verification, token issuance, the session
/// registry and RBAC resolution.
///
/// One instance per process is typical, but nothing here is global:
/// configuration and collaborators are injected, so isolated instances
/// can run side by side (tests rely on this).
pub struct AuthEngine {
    credentials: Arc<dyn CredentialStore>,
    sessions: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    codec: TokenCodec,
    passwords: PasswordVerifier,
    config: AuthConfig,
}

impl AuthEngine {
    pub fn new(
        config: AuthConfig,
        credentials: Arc<dyn CredentialStore>,
        sessions: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let codec = TokenCodec::new(&config);
        Self {
            credentials,
            sessions,
            clock,
            codec,
            passwords: PasswordVerifier::new(),
            config,
        }
    }

    /// Replace the password verifier (tests use low-cost parameters).
    pub fn with_password_verifier(mut self, passwords: PasswordVerifier) -> Self {
        self.passwords = passwords;
        self
    }

    /// Verify credentials and open a new session.
    ///
    /// Unknown identifier, wrong password, inactive and unverified accounts
    /// all fail with the same [`AuthError::InvalidCredentials`]; a lookup
    /// miss still burns a dummy hash verification so the miss is not
    /// observable through timing either.
    pub fn login(&self, identifier: &str, password: &str) -> Result<TokenPair, AuthError> {
        let Some(user) = self.credentials.find_by_identifier(identifier)? else {
            self.passwords.verify_dummy(password);
            debug!("login rejected");
            return Err(AuthError::InvalidCredentials);
        };

        let password_ok = self.passwords.verify(password, &user.password_hash);
        if !password_ok || !user.can_login() {
            debug!(user_id = %user.id, "login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let now = self.clock.now();
        let (access_token, access_jti) = self.codec.issue(
            user.id,
            user.role,
            user.organization_id,
            TokenType::Access,
            now,
            self.config.access_ttl,
        )?;
        let (refresh_token, refresh_jti) = self.codec.issue(
            user.id,
            user.role,
            user.organization_id,
            TokenType::Refresh,
            now,
            self.config.refresh_ttl,
        )?;

        let session = self.sessions.create(
            user.id,
            access_jti,
            refresh_jti,
            now + self.config.refresh_ttl,
            now,
        )?;

        info!(user_id = %user.id, session_id = %session.id, "login succeeded");
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Exchange a refresh token for a new pair, rotating the session
    /// record in place.
    ///
    /// Presenting a rotated-away refresh token is treated as a theft
    /// signal: the session is revoked outright, not merely rejected. The
    /// loser of a concurrent refresh race gets [`AuthError::Conflict`] and
    /// the same revocation.
    pub fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let now = self.clock.now();
        let claims = self.codec.decode(refresh_token, TokenType::Refresh, now)?;

        let Some(session) = self.sessions.find_by_refresh_jti(&claims.jti)? else {
            if let Some(stale) = self.sessions.find_by_stale_refresh_jti(&claims.jti)? {
                warn!(
                    session_id = %stale.id,
                    user_id = %stale.user_id,
                    "rotated-away refresh token replayed; revoking session"
                );
                self.sessions.revoke(stale.id)?;
            }
            return Err(AuthError::SessionInvalid);
        };

        if !session.is_active(now) {
            return Err(AuthError::SessionInvalid);
        }

        // Re-check the account: a user deactivated since login must not be
        // able to mint fresh tokens. Role changes take effect here too —
        // the new pair is issued from the current record, never from the
        // old claims.
        let user = self
            .credentials
            .find_by_id(claims.sub)?
            .filter(UserRecord::can_login)
            .ok_or(AuthError::SessionInvalid)?;

        let (access_token, access_jti) = self.codec.issue(
            user.id,
            user.role,
            user.organization_id,
            TokenType::Access,
            now,
            self.config.access_ttl,
        )?;
        let (refresh_token, refresh_jti) = self.codec.issue(
            user.id,
            user.role,
            user.organization_id,
            TokenType::Refresh,
            now,
            self.config.refresh_ttl,
        )?;

        match self.sessions.rotate(
            session.id,
            claims.jti,
            access_jti,
            refresh_jti,
            now + self.config.refresh_ttl,
        ) {
            Ok(rotated) => {
                debug!(session_id = %rotated.id, "refresh rotated session");
                Ok(TokenPair {
                    access_token,
                    refresh_token,
                })
            }
            Err(SessionStoreError::Conflict) => {
                warn!(
                    session_id = %session.id,
                    user_id = %session.user_id,
                    "concurrent refresh detected; revoking session"
                );
                self.sessions.revoke(session.id)?;
                Err(AuthError::Conflict)
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Validate an access token and check the required permission.
    pub fn authorize_request(
        &self,
        access_token: &str,
        required: &Permission,
    ) -> Result<AccessGrant, AuthError> {
        let now = self.clock.now();
        let claims = self.codec.decode(access_token, TokenType::Access, now)?;

        let session = self
            .sessions
            .find_by_access_jti(&claims.jti)?
            .filter(|s| s.is_active(now))
            .ok_or(AuthError::SessionInvalid)?;

        if !rbac::authorize(claims.role, required) {
            debug!(
                user_id = %claims.sub,
                role = %claims.role,
                permission = %required,
                "authorization denied"
            );
            return Err(AuthError::Forbidden(required.to_string()));
        }

        Ok(AccessGrant {
            claims,
            session_id: session.id,
        })
    }

    /// Revoke the session behind an access token. Idempotent: a second
    /// logout (or logout of an already-revoked session) succeeds quietly.
    pub fn logout(&self, access_token: &str) -> Result<(), AuthError> {
        let now = self.clock.now();
        let claims = self.codec.decode(access_token, TokenType::Access, now)?;

        if let Some(session) = self.sessions.find_by_access_jti(&claims.jti)? {
            self.sessions.revoke(session.id)?;
            info!(session_id = %session.id, user_id = %claims.sub, "logout");
        }
        Ok(())
    }

    /// Revoke a session by id (for callers that already hold one).
    pub fn logout_session(&self, session_id: SessionId) -> Result<(), AuthError> {
        self.sessions.revoke(session_id)?;
        Ok(())
    }

    /// Change a password and force re-login everywhere.
    pub fn change_password(
        &self,
        user_id: UserId,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let user = self
            .credentials
            .find_by_id(user_id)?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.passwords.verify(current_password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        let new_hash = self.passwords.hash(new_password)?;
        self.credentials.update_password_hash(user_id, new_hash)?;
        let revoked = self.sessions.revoke_all_for_user(user_id)?;
        info!(user_id = %user_id, revoked, "password changed; sessions revoked");
        Ok(())
    }

    /// Issue a password-reset token for an account in good standing.
    ///
    /// Returns `None` for unknown, inactive or unverified identifiers so
    /// the caller has nothing to leak. Delivery (email) is out of scope.
    pub fn request_password_reset(&self, identifier: &str) -> Result<Option<String>, AuthError> {
        let Some(user) = self.credentials.find_by_identifier(identifier)? else {
            return Ok(None);
        };
        if !user.can_login() {
            return Ok(None);
        }

        let now = self.clock.now();
        // TODO: record reset jtis in the session registry so a reset token
        // becomes single-use instead of valid until expiry.
        let (token, _jti) = self.codec.issue(
            user.id,
            user.role,
            user.organization_id,
            TokenType::PasswordReset,
            now,
            self.config.reset_ttl,
        )?;
        info!(user_id = %user.id, "password reset token issued");
        Ok(Some(token))
    }

    /// Redeem a reset token: set the new password and revoke every session.
    pub fn reset_password(&self, reset_token: &str, new_password: &str) -> Result<(), AuthError> {
        let now = self.clock.now();
        let claims = self
            .codec
            .decode(reset_token, TokenType::PasswordReset, now)?;

        let user = self
            .credentials
            .find_by_id(claims.sub)?
            .filter(UserRecord::can_login)
            .ok_or(AuthError::InvalidCredentials)?;

        let new_hash = self.passwords.hash(new_password)?;
        self.credentials.update_password_hash(user.id, new_hash)?;
        let revoked = self.sessions.revoke_all_for_user(user.id)?;
        info!(user_id = %user.id, revoked, "password reset; sessions revoked");
        Ok(())
    }
}

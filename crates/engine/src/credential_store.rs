//! Credential store collaborator.
//!
//! User records are owned externally; the engine only reads the fields it
//! needs to resolve identity and permissions, plus one write: the password
//! hash on password change/reset.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use learngate_auth::Role;
use learngate_core::{OrganizationId, UserId};

/// Credential store failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialStoreError {
    #[error("user not found")]
    NotFound,

    #[error("credential store unavailable: {0}")]
    Backend(String),
}

/// The slice of a user record the engine reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    /// Exactly one role per user.
    pub role: Role,
    /// Absent for system administrators, who are not bound to one school.
    pub organization_id: Option<OrganizationId>,
    pub is_active: bool,
    pub is_verified: bool,
}

impl UserRecord {
    /// Whether this account may authenticate at all.
    pub fn can_login(&self) -> bool {
        self.is_active && self.is_verified
    }
}

/// Read (and hash-update) access to externally-owned user records.
pub trait CredentialStore: Send + Sync {
    /// Look up a user by email **or** username.
    fn find_by_identifier(&self, identifier: &str)
    -> Result<Option<UserRecord>, CredentialStoreError>;

    /// Look up a user by id (refresh re-checks the account state).
    fn find_by_id(&self, user_id: UserId) -> Result<Option<UserRecord>, CredentialStoreError>;

    /// Replace the stored password hash.
    fn update_password_hash(
        &self,
        user_id: UserId,
        new_hash: String,
    ) -> Result<(), CredentialStoreError>;
}

/// In-memory [`CredentialStore`] for tests and single-process deployments.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    users: RwLock<HashMap<UserId, UserRecord>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: UserRecord) {
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        users.insert(record.id, record);
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<UserRecord>, CredentialStoreError> {
        let users = self
            .users
            .read()
            .map_err(|_| CredentialStoreError::Backend("lock poisoned".to_string()))?;
        Ok(users
            .values()
            .find(|u| u.email == identifier || u.username == identifier)
            .cloned())
    }

    fn find_by_id(&self, user_id: UserId) -> Result<Option<UserRecord>, CredentialStoreError> {
        let users = self
            .users
            .read()
            .map_err(|_| CredentialStoreError::Backend("lock poisoned".to_string()))?;
        Ok(users.get(&user_id).cloned())
    }

    fn update_password_hash(
        &self,
        user_id: UserId,
        new_hash: String,
    ) -> Result<(), CredentialStoreError> {
        let mut users = self
            .users
            .write()
            .map_err(|_| CredentialStoreError::Backend("lock poisoned".to_string()))?;
        let record = users
            .get_mut(&user_id)
            .ok_or(CredentialStoreError::NotFound)?;
        record.password_hash = new_hash;
        Ok(())
    }
}

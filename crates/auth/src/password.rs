//! Password hashing and verification (Argon2id).
//!
//! Verification failure is a boolean, not an error path: a mismatch and a
//! malformed stored hash both come back as `false`. The engine presents
//! that `false` and "user not found" identically to the client; to keep
//! the two timing-indistinguishable as well, [`PasswordVerifier::verify_dummy`]
//! burns the same hashing work when no user record exists.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString},
};
use thiserror::Error;

/// Default Argon2id memory cost in KiB (19 MiB).
pub const DEFAULT_MEMORY_KIB: u32 = 19_456;
/// Default Argon2id iteration count.
pub const DEFAULT_ITERATIONS: u32 = 3;
/// Default Argon2id parallelism.
pub const DEFAULT_PARALLELISM: u32 = 1;

/// A valid Argon2id hash (parameters matching the defaults above) used when
/// no user record exists, so lookup misses cost the same as a real
/// verification.
const DUMMY_PASSWORD_HASH: &str = "$argon2id$v=19$m=19456,t=3,p=1$c29tZXNhbHR2YWx1ZWhlcmU$RLOlG+bqaPmZpqqtqkk0lJ95GXDyOQD3kPKcInYvQIk";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("invalid hashing parameters: {0}")]
    InvalidParams(String),

    #[error("hashing failed: {0}")]
    HashingFailed(String),
}

/// Argon2id password hasher/verifier with configurable cost.
#[derive(Debug, Clone)]
pub struct PasswordVerifier {
    argon2: Argon2<'static>,
}

impl PasswordVerifier {
    /// Verifier with the default cost parameters.
    pub fn new() -> Self {
        // The default params are always valid; the fallback never runs.
        Self::with_params(DEFAULT_MEMORY_KIB, DEFAULT_ITERATIONS, DEFAULT_PARALLELISM)
            .unwrap_or_else(|_| Self {
                argon2: Argon2::default(),
            })
    }

    /// Verifier with explicit cost parameters.
    pub fn with_params(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, PasswordError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a plaintext password with a fresh random salt.
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
        let hash = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Verify a plaintext password against a stored hash.
    ///
    /// Returns `false` for a mismatch *and* for a malformed stored hash —
    /// the caller never learns which.
    pub fn verify(&self, plaintext: &str, stored_hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored_hash) else {
            return false;
        };
        self.argon2
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }

    /// Burn the same verification work as [`verify`](Self::verify) without a
    /// real hash. Called when the identifier matched no user, so response
    /// timing cannot be used to enumerate accounts.
    pub fn verify_dummy(&self, plaintext: &str) {
        let _ = self.verify(plaintext, DUMMY_PASSWORD_HASH);
    }
}

impl Default for PasswordVerifier {
    fn default() -> Self {
        Self::new()
    }
}

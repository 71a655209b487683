//! `learngate-auth` — pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: password
//! hashing, the signed-token codec, the fixed role hierarchy and the RBAC
//! resolver are all deterministic functions of their inputs (plus an
//! injected clock for expiry). Session state lives in `learngate-sessions`;
//! orchestration lives in `learngate-engine`.

pub mod claims;
pub mod config;
pub mod password;
pub mod permissions;
pub mod rbac;
pub mod roles;
pub mod token;

pub use claims::{Claims, TokenType};
pub use config::{AuthConfig, ConfigError, SigningSecret};
pub use password::{PasswordError, PasswordVerifier};
pub use permissions::Permission;
pub use rbac::{authorize, permissions_for};
pub use roles::Role;
pub use token::{TokenCodec, TokenError};

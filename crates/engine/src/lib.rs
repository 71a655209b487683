//! `learngate-engine` — authentication & session-lifecycle orchestration.
//!
//! The engine wires the pure auth boundary (`learngate-auth`) to the
//! session registry (`learngate-sessions`) and the external credential
//! store. It owns the login / refresh / authorize / logout /
//! password-change flows and the request-boundary error kinds; no HTTP
//! concept leaks into its contracts.

pub mod credential_store;
pub mod engine;
pub mod error;

pub use credential_store::{
    CredentialStore, CredentialStoreError, InMemoryCredentialStore, UserRecord,
};
pub use engine::{AccessGrant, AuthEngine, TokenPair};
pub use error::AuthError;

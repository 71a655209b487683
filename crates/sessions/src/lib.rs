//! `learngate-sessions` — authoritative registry of issued token pairs.
//!
//! The session registry is the source of truth for revocation: a token is
//! only as good as the session record holding its jti. This crate owns the
//! session model, the [`SessionStore`] contract and the in-memory
//! implementation used by tests and single-process deployments.

pub mod in_memory;
pub mod session;
pub mod store;

pub use in_memory::InMemorySessionStore;
pub use session::Session;
pub use store::{SessionStore, SessionStoreError};

//! `learngate-core` — foundation primitives shared across the auth stack.
//!
//! This crate contains **pure domain** building blocks (no I/O, no crypto):
//! strongly-typed identifiers, the domain error model, and the injected
//! clock used to make expiry deterministic in tests.

pub mod clock;
pub mod error;
pub mod id;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{DomainError, DomainResult};
pub use id::{Jti, OrganizationId, SessionId, UserId};

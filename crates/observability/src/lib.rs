//! `learngate-observability` — process-wide tracing setup.
//!
//! The auth crates emit structured events through `tracing` and never
//! install a subscriber themselves; the embedding process calls [`init`]
//! once at startup. Security-relevant events (logins, revocations, replay
//! detections) carry user and session ids as fields, so downstream log
//! pipelines can index them without parsing message text.

use tracing_subscriber::EnvFilter;

/// Filter env var, e.g. `LEARNGATE_LOG=learngate_engine=debug,info`.
/// Falls back to `RUST_LOG`, then to `info`.
const ENV_FILTER: &str = "LEARNGATE_LOG";

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(ENV_FILTER)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the JSON subscriber for production processes.
///
/// Safe to call multiple times; only the first call installs anything.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_current_span(false)
        .try_init();
}

/// Human-readable variant for local development and test debugging.
///
/// Same idempotence as [`init`]; whichever runs first wins.
pub fn init_pretty() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .pretty()
        .try_init();
}

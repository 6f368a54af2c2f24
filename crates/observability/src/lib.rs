//! Process-wide tracing/logging setup.

pub mod tracing;

pub use self::tracing::{LogFormat, ObservabilityConfig};

/// Initialize tracing from the environment (`RUST_LOG`, `LEASEBOOK_LOG_FORMAT`).
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    self::tracing::init(&ObservabilityConfig::from_env());
}

//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::config::LOG_ENV;

/// Filter used when neither the caller nor the environment sets one.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Install a global `tracing` subscriber.
///
/// `filter` takes precedence over `PHARMACY_LOG`. Returns `false` if a
/// subscriber was already installed (by an earlier call or by the host).
pub fn init_tracing(filter: Option<&str>) -> bool {
    let filter = filter
        .map(EnvFilter::new)
        .or_else(|| EnvFilter::try_from_env(LOG_ENV).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

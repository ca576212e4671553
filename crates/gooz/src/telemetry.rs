//! Logging setup for binaries built on the client.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Installs a `tracing` fmt subscriber filtered by `RUST_LOG`.
///
/// Falls back to [`DEFAULT_FILTER`]. Calling it again after a subscriber
/// is installed does nothing.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

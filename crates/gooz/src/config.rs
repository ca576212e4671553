//! Client configuration.

use std::time::Duration;

use gooz_reconnect::ReconnectConfig;
use gooz_state::ErrorPolicy;

/// Default game server endpoint.
pub const DEFAULT_URL: &str = "ws://localhost:8080";

/// Default time allowed for a graceful close before the connection task
/// is aborted.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// Settings for a [`GoozClient`](crate::GoozClient).
///
/// `Default` gives a client for a local server that retries every
/// 3 seconds forever and only logs server errors.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket endpoint of the game server.
    pub url: String,
    /// Delay schedule for reconnect attempts.
    pub reconnect: ReconnectConfig,
    /// Whether server `ERROR` messages reach the state.
    pub error_policy: ErrorPolicy,
    /// Bound on the graceful close in `disconnect`. A zero timeout aborts
    /// the connection task without waiting.
    pub shutdown_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            reconnect: ReconnectConfig::default(),
            error_policy: ErrorPolicy::default(),
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}

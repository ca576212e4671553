//! Reconnect delay schedule for the Gooz client.
//!
//! After an unexpected close (or a failed dial) the connection supervisor
//! asks the schedule how long to wait before the next attempt. Two shapes
//! are supported:
//!
//! - [`ReconnectPolicy::Fixed`]: the same delay every time. The default is
//!   3 seconds with no attempt limit, so a client keeps trying forever.
//! - [`ReconnectPolicy::Backoff`]: the delay grows by `multiplier` per
//!   attempt up to `max_delay`.
//!
//! Either shape can add random jitter and cap the number of attempts.
//!
//! # Integration
//!
//! The schedule sits inside the supervisor loop:
//!
//! ```ignore
//! loop {
//!     match connector.connect().await {
//!         Ok(conn) => { schedule.reset(); run(conn).await; }
//!         Err(e) => warn!(error = %e, "dial failed"),
//!     }
//!     if schedule.wait_for_retry().await.is_none() {
//!         break; // attempts exhausted
//!     }
//! }
//! ```

use std::time::Duration;

use rand::Rng;
use tokio::time;
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// How the delay between attempts evolves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReconnectPolicy {
    /// Wait `delay` before every attempt.
    Fixed { delay: Duration },
    /// Start at `initial` and multiply by `multiplier` after each attempt,
    /// never exceeding `max_delay`.
    Backoff {
        initial: Duration,
        max_delay: Duration,
        multiplier: f64,
    },
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::Fixed {
            delay: ReconnectConfig::DEFAULT_DELAY,
        }
    }
}

/// Full configuration for the reconnect schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectConfig {
    /// Delay shape.
    pub policy: ReconnectPolicy,
    /// Give up after this many consecutive failed attempts. `None` retries
    /// forever.
    pub max_attempts: Option<u32>,
    /// Upper bound of the random extra delay (0..=jitter) added to each
    /// wait, so many clients dropped at once do not redial in lockstep.
    pub jitter: Duration,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            policy: ReconnectPolicy::default(),
            max_attempts: None,
            jitter: Duration::ZERO,
        }
    }
}

impl ReconnectConfig {
    /// Delay of the default fixed policy.
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(3);

    /// Shortest delay the schedule will ever wait.
    pub const MIN_DELAY: Duration = Duration::from_millis(10);

    /// Longest delay the schedule will ever wait, before jitter.
    pub const MAX_DELAY: Duration = Duration::from_secs(60 * 60);

    /// A fixed delay with no attempt limit.
    pub fn fixed(delay: Duration) -> Self {
        Self {
            policy: ReconnectPolicy::Fixed { delay },
            ..Default::default()
        }
    }

    /// Doubling backoff from `initial` up to `max_delay`, no attempt limit.
    pub fn backoff(initial: Duration, max_delay: Duration) -> Self {
        Self {
            policy: ReconnectPolicy::Backoff {
                initial,
                max_delay,
                multiplier: 2.0,
            },
            ..Default::default()
        }
    }

    /// Sets the attempt limit.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Sets the jitter bound.
    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Clamp and fix any out-of-range values so the config is safe to use.
    ///
    /// Called automatically by [`ReconnectSchedule::new`]. Rules:
    /// - Delays below [`Self::MIN_DELAY`] are raised to it.
    /// - Delays above [`Self::MAX_DELAY`] are lowered to it.
    /// - `max_delay` is raised to at least `initial`.
    /// - A `multiplier` below 1.0 (or not finite) becomes 1.0.
    /// - `jitter` is capped to the base delay.
    pub fn validated(mut self) -> Self {
        let base = match &mut self.policy {
            ReconnectPolicy::Fixed { delay } => {
                if *delay < Self::MIN_DELAY {
                    warn!(delay_ms = delay.as_millis() as u64, "reconnect delay too short, clamping");
                    *delay = Self::MIN_DELAY;
                }
                if *delay > Self::MAX_DELAY {
                    warn!(delay_ms = delay.as_millis() as u64, "reconnect delay too long, clamping");
                    *delay = Self::MAX_DELAY;
                }
                *delay
            }
            ReconnectPolicy::Backoff {
                initial,
                max_delay,
                multiplier,
            } => {
                if *initial < Self::MIN_DELAY {
                    warn!(initial_ms = initial.as_millis() as u64, "initial backoff too short, clamping");
                    *initial = Self::MIN_DELAY;
                }
                if *initial > Self::MAX_DELAY {
                    *initial = Self::MAX_DELAY;
                }
                if *max_delay > Self::MAX_DELAY {
                    warn!(max_delay_ms = max_delay.as_millis() as u64, "backoff ceiling too long, clamping");
                    *max_delay = Self::MAX_DELAY;
                }
                if *max_delay < *initial {
                    *max_delay = *initial;
                }
                if !multiplier.is_finite() || *multiplier < 1.0 {
                    warn!(multiplier = *multiplier, "backoff multiplier below 1.0, using 1.0");
                    *multiplier = 1.0;
                }
                *initial
            }
        };
        if self.jitter > base {
            self.jitter = base;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Retry info (returned to caller each attempt)
// ---------------------------------------------------------------------------

/// Information about a completed wait, returned by
/// [`ReconnectSchedule::wait_for_retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryInfo {
    /// Attempt number since the last reset (starts at 1).
    pub attempt: u32,
    /// How long the schedule waited, jitter included.
    pub delay: Duration,
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

/// Produces the delay before each reconnect attempt.
///
/// One schedule per connection supervisor. Call [`reset`](Self::reset)
/// once a connection opens so the next outage starts from the beginning.
#[derive(Debug, Clone)]
pub struct ReconnectSchedule {
    config: ReconnectConfig,
    attempt: u32,
}

impl ReconnectSchedule {
    /// Create a schedule from config. The config is validated first.
    pub fn new(config: ReconnectConfig) -> Self {
        let config = config.validated();
        debug!(policy = ?config.policy, max_attempts = ?config.max_attempts, "reconnect schedule created");
        Self { config, attempt: 0 }
    }

    /// Advances to the next attempt and returns how long to wait for it.
    ///
    /// Returns `None` once `max_attempts` attempts have been handed out;
    /// the counter does not advance past that point.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self
            .config
            .max_attempts
            .is_some_and(|max| self.attempt >= max)
        {
            return None;
        }
        self.attempt = self.attempt.saturating_add(1);
        Some(self.base_delay(self.attempt).saturating_add(self.jitter()))
    }

    /// Sleeps until the next attempt is due.
    ///
    /// Returns `None` immediately, without sleeping, when attempts are
    /// exhausted.
    pub async fn wait_for_retry(&mut self) -> Option<RetryInfo> {
        let Some(delay) = self.next_delay() else {
            warn!(attempts = self.attempt, "reconnect attempts exhausted");
            return None;
        };
        debug!(attempt = self.attempt, delay_ms = delay.as_millis() as u64, "waiting to reconnect");
        time::sleep(delay).await;
        Some(RetryInfo {
            attempt: self.attempt,
            delay,
        })
    }

    /// Start over from the first attempt.
    pub fn reset(&mut self) {
        if self.attempt > 0 {
            debug!(after_attempts = self.attempt, "reconnect schedule reset");
        }
        self.attempt = 0;
    }

    /// Attempts handed out since the last reset.
    pub fn attempts(&self) -> u32 {
        self.attempt
    }

    /// The validated configuration in use.
    pub fn config(&self) -> &ReconnectConfig {
        &self.config
    }

    fn base_delay(&self, attempt: u32) -> Duration {
        match self.config.policy {
            ReconnectPolicy::Fixed { delay } => delay,
            ReconnectPolicy::Backoff {
                initial,
                max_delay,
                multiplier,
            } => {
                let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
                // powi may overflow to infinity; min() brings it back in range.
                let secs = (initial.as_secs_f64() * multiplier.powi(exponent))
                    .min(max_delay.as_secs_f64());
                Duration::from_secs_f64(secs)
            }
        }
    }

    fn jitter(&self) -> Duration {
        let bound = self.config.jitter.as_millis() as u64;
        if bound == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..=bound))
    }
}

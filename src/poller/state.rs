//! Poller state types: display state, retry bookkeeping, and backoff
//!
//! These types form the state machine behind every live widget. The poller
//! driver in the parent module owns the transitions; the UI renders from the
//! published `PollerStatus`.

use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::cache::Ttl;

/// Normalized fetch failure surfaced to the UI
///
/// Every remote client maps its own error type into one of these variants at
/// the poller boundary. The message is what the user sees, so each variant
/// carries human-readable text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Transport-level failure: connection refused, DNS, timeout
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// A 2xx response whose payload signalled failure or was malformed
    #[error("unexpected response: {0}")]
    Protocol(String),

    /// A required credential or setting is missing
    #[error("{0}")]
    Config(String),
}

impl FetchError {
    /// Builds a `FetchError` from a reqwest error, classifying transport
    /// failures as `Network` and status failures as `Http`.
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            FetchError::Http {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
            }
        } else if err.is_timeout() {
            FetchError::Network("request timed out".to_string())
        } else if err.is_decode() {
            FetchError::Protocol(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

/// What a widget should render right now
///
/// Exactly one variant is active per widget at any time. A failed refresh
/// never downgrades `Ready` back to `Loading`; the poller only moves to
/// `Error` once its retries are exhausted.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayState<T> {
    /// First fetch (or a retry of it) still in progress
    Loading,
    /// Retries exhausted; message is the normalized failure text
    Error(String),
    /// Data available
    Ready {
        data: T,
        fetched_at: DateTime<Utc>,
    },
}

impl<T> DisplayState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, DisplayState::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, DisplayState::Ready { .. })
    }

    /// Returns the payload when in `Ready`
    pub fn data(&self) -> Option<&T> {
        match self {
            DisplayState::Ready { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Returns the error message when in `Error`
    pub fn error(&self) -> Option<&str> {
        match self {
            DisplayState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Lifecycle phase of a poller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerPhase {
    /// Between interval ticks (or suspended after exhausted retries)
    Idle,
    /// A fetch is in flight
    Polling,
    /// Waiting out a backoff delay before the next attempt
    Retrying,
    /// `stop()` was called; no further transitions will occur
    Stopped,
}

/// Linear backoff: failure `n` waits `base * n`
///
/// With the default 3 s base this produces the 3 s, 6 s, 9 s sequence before
/// the poller gives up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
}

impl Backoff {
    pub fn linear(base: Duration) -> Self {
        Self { base }
    }

    /// Delay before the retry that follows failure number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base.saturating_mul(attempt)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(3),
        }
    }
}

/// Configuration for a poller instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    /// How long a fetched value stays fresh in the cache
    pub ttl: Ttl,
    /// Time between recurring fetches; must be non-zero
    pub interval: Duration,
    /// Maximum number of automatic retries per cycle
    pub retry_cap: u32,
    /// Delay schedule between retries
    pub backoff: Backoff,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            ttl: Ttl::Duration(Duration::from_secs(5)),
            interval: Duration::from_secs(10),
            retry_cap: 3,
            backoff: Backoff::default(),
        }
    }
}

/// Outcome of recording a failure against the retry budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Try again after the given delay
    RetryAfter(Duration),
    /// Budget spent; stop automatic retries
    Exhausted,
}

/// Per-widget retry bookkeeping
///
/// `attempts` counts consecutive failures since the last success (or manual
/// reset). It never resets on cache hits; only a successful fetch or a manual
/// retry clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryState {
    /// Consecutive failures since the last success
    pub attempts: u32,
    /// Message of the most recent failure, if any
    pub last_error: Option<String>,
}

impl RetryState {
    /// Records a failure and decides whether another automatic retry runs.
    ///
    /// Failure `n` (1-based) is granted a retry while `n <= retry_cap`, with
    /// a delay of `backoff.delay_for(n)`; the failure after that exhausts the
    /// budget.
    pub fn record_failure(&mut self, error: &FetchError, config: &PollerConfig) -> RetryDecision {
        self.attempts = self.attempts.saturating_add(1);
        self.last_error = Some(error.to_string());

        if self.attempts <= config.retry_cap {
            RetryDecision::RetryAfter(config.backoff.delay_for(self.attempts))
        } else {
            RetryDecision::Exhausted
        }
    }

    /// Clears the counter and last error after a successful fetch or a
    /// manual retry.
    pub fn reset(&mut self) {
        self.attempts = 0;
        self.last_error = None;
    }

    /// True once the automatic retry budget has been spent
    pub fn is_exhausted(&self, config: &PollerConfig) -> bool {
        self.attempts > config.retry_cap
    }
}

/// Everything the UI needs to render one live widget
#[derive(Debug, Clone, PartialEq)]
pub struct PollerStatus<T> {
    pub display: DisplayState<T>,
    pub phase: PollerPhase,
    pub retry: RetryState,
}

impl<T> PollerStatus<T> {
    pub fn initial() -> Self {
        Self {
            display: DisplayState::Loading,
            phase: PollerPhase::Idle,
            retry: RetryState::default(),
        }
    }
}

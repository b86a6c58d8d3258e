//! Retry policy for judgment calls.
//!
//! The loop is an explicit state machine: `transition` is pure and
//! `backoff_delay` only depends on the policy, the failure class and the
//! attempt number, so both are testable without a network.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// How a failed attempt is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// HTTP 429.
    RateLimited,
    /// HTTP 5xx.
    Server,
    /// Attempt exceeded the request timeout.
    Timeout,
    /// Connection-level failure before a status was received.
    Transport,
    /// Other 4xx; never retried.
    Client,
    /// Response envelope not parseable; never retried.
    Malformed,
}

impl FailureClass {
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            200..=299 => None,
            429 => Some(Self::RateLimited),
            500..=599 => Some(Self::Server),
            _ => Some(Self::Client),
        }
    }

    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::Server | Self::Timeout | Self::Transport
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay for 429/5xx; doubles per attempt.
    #[serde(default = "default_rate_limit_base_ms")]
    pub rate_limit_base_ms: u64,

    #[serde(default = "default_rate_limit_cap_ms")]
    pub rate_limit_cap_ms: u64,

    /// Base delay for timeouts and transport failures; doubles per attempt.
    #[serde(default = "default_transient_base_ms")]
    pub transient_base_ms: u64,

    #[serde(default = "default_transient_cap_ms")]
    pub transient_cap_ms: u64,

    /// Apply ±10% jitter to the delay actually slept.
    #[serde(default = "default_jitter")]
    pub jitter: bool,
}

fn default_max_retries() -> u32 {
    3
}

fn default_rate_limit_base_ms() -> u64 {
    15_000
}

fn default_rate_limit_cap_ms() -> u64 {
    120_000
}

fn default_transient_base_ms() -> u64 {
    2_000
}

fn default_transient_cap_ms() -> u64 {
    30_000
}

fn default_jitter() -> bool {
    true
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            rate_limit_base_ms: default_rate_limit_base_ms(),
            rate_limit_cap_ms: default_rate_limit_cap_ms(),
            transient_base_ms: default_transient_base_ms(),
            transient_cap_ms: default_transient_cap_ms(),
            jitter: default_jitter(),
        }
    }
}

impl RetryPolicy {
    /// Millisecond-scale delays without jitter, for tests.
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            rate_limit_base_ms: 1,
            rate_limit_cap_ms: 4,
            transient_base_ms: 1,
            transient_cap_ms: 4,
            jitter: false,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay actually slept for a computed backoff.
    pub fn jittered<R: Rng + ?Sized>(&self, delay: Duration, rng: &mut R) -> Duration {
        if !self.jitter {
            return delay;
        }
        let factor: f64 = rng.gen_range(0.9_f64..=1.1_f64);
        let ms = (delay.as_millis() as f64 * factor).round() as u64;
        Duration::from_millis(ms)
    }
}

/// Backoff after failed attempt number `attempt` (1-based).
///
/// `base * 2^(attempt - 1)`, capped. Non-retryable classes get zero.
pub fn backoff_delay(policy: &RetryPolicy, class: FailureClass, attempt: u32) -> Duration {
    let (base, cap) = match class {
        FailureClass::RateLimited | FailureClass::Server => {
            (policy.rate_limit_base_ms, policy.rate_limit_cap_ms)
        }
        FailureClass::Timeout | FailureClass::Transport => {
            (policy.transient_base_ms, policy.transient_cap_ms)
        }
        FailureClass::Client | FailureClass::Malformed => return Duration::ZERO,
    };
    let exp = attempt.saturating_sub(1).min(32);
    let factor = 1u64 << exp;
    Duration::from_millis(base.saturating_mul(factor).min(cap))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    Idle,
    Attempting { attempt: u32 },
    Backoff { attempt: u32, delay: Duration },
    Success { attempts: u32 },
    Exhausted { attempts: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryEvent {
    Start,
    Succeeded,
    Failed(FailureClass),
    BackoffElapsed,
}

impl RetryState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success { .. } | Self::Exhausted { .. })
    }
}

/// Pure state transition. Events that do not apply to a state leave it unchanged.
pub fn transition(state: RetryState, event: RetryEvent, policy: &RetryPolicy) -> RetryState {
    match (state, event) {
        (RetryState::Idle, RetryEvent::Start) => RetryState::Attempting { attempt: 1 },
        (RetryState::Attempting { attempt }, RetryEvent::Succeeded) => {
            RetryState::Success { attempts: attempt }
        }
        (RetryState::Attempting { attempt }, RetryEvent::Failed(class)) => {
            if class.is_retryable() && attempt < policy.max_attempts() {
                RetryState::Backoff {
                    attempt,
                    delay: backoff_delay(policy, class, attempt),
                }
            } else {
                RetryState::Exhausted { attempts: attempt }
            }
        }
        (RetryState::Backoff { attempt, .. }, RetryEvent::BackoffElapsed) => {
            RetryState::Attempting {
                attempt: attempt + 1,
            }
        }
        (state, _) => state,
    }
}

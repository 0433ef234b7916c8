//! Bounded retry with exponential backoff

use std::time::Duration;

/// How many times to retry and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Wait before the first retry
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Wait after the failed 0-based `attempt`: `base_delay * 2^attempt`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Upper bound on attempts for one execution
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Initial state of an execution
    pub fn start(&self) -> RetryState {
        RetryState::Attempting { attempt: 0 }
    }
}

/// Progress of one execution through its attempts
///
/// `Attempting -> Waiting -> Attempting -> ... -> Succeeded | Exhausted`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// Attempt number `attempt` (0-based) is in progress
    Attempting { attempt: u32 },
    /// Attempt `attempt` failed; sleeping `delay` before the next one
    Waiting { attempt: u32, delay: Duration },
    /// An attempt produced a payload
    Succeeded { attempts: u32 },
    /// Every allowed attempt failed
    Exhausted { attempts: u32 },
}

impl RetryState {
    /// The current attempt succeeded
    pub fn on_success(self) -> Self {
        match self {
            RetryState::Attempting { attempt } => RetryState::Succeeded {
                attempts: attempt + 1,
            },
            other => other,
        }
    }

    /// The current attempt failed
    pub fn on_failure(self, policy: &RetryPolicy) -> Self {
        match self {
            RetryState::Attempting { attempt } if attempt < policy.max_retries => {
                RetryState::Waiting {
                    attempt,
                    delay: policy.delay_for(attempt),
                }
            }
            RetryState::Attempting { attempt } => RetryState::Exhausted {
                attempts: attempt + 1,
            },
            other => other,
        }
    }

    /// The backoff sleep finished
    pub fn on_wake(self) -> Self {
        match self {
            RetryState::Waiting { attempt, .. } => RetryState::Attempting {
                attempt: attempt + 1,
            },
            other => other,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RetryState::Succeeded { .. } | RetryState::Exhausted { .. }
        )
    }
}

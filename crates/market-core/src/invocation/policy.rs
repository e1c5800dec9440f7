use std::time::Duration;

use crate::config::{DEFAULT_POLL_INTERVAL_SECS, DEFAULT_POLL_MAX_ATTEMPTS};

/// How a pending operation is polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Wait before every status fetch.
    pub interval: Duration,
    /// `None` polls until the operation reports `done`.
    pub max_attempts: Option<u32>,
}

impl PollPolicy {
    pub fn bounded(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: Some(max_attempts),
        }
    }

    pub fn unbounded(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
        }
    }

    /// Whether status fetch number `attempt` (1-based) may run.
    pub fn allows(&self, attempt: u32) -> bool {
        self.max_attempts.is_none_or(|max| attempt <= max)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::bounded(
            Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            DEFAULT_POLL_MAX_ATTEMPTS,
        )
    }
}

//! Delays between reconnect attempts.

use std::time::Duration;

use crate::config::BackoffConfig;

/// A source of reconnect delays.
pub trait RetryBackoff: Send {
    /// The delay before the next attempt. Each call advances the sequence.
    fn next_delay(&mut self) -> Duration;

    /// Start again from the initial delay.
    fn reset(&mut self);
}

/// Doubles the delay on every attempt, up to a ceiling.
///
/// With an initial delay of 50ms and a ceiling of 200ms the sequence is
/// 50, 100, 200, 200, ... until [reset](RetryBackoff::reset).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExponentialBackoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl ExponentialBackoff {
    /// `initial` is raised to at least 1ms and `max` to at least `initial`.
    pub fn new(initial: Duration, max: Duration) -> Self {
        let initial = initial.max(Duration::from_millis(1));
        let max = max.max(initial);
        Self {
            initial,
            max,
            current: initial,
        }
    }
}

impl From<BackoffConfig> for ExponentialBackoff {
    fn from(config: BackoffConfig) -> Self {
        Self::new(config.initial, config.max)
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        BackoffConfig::default().into()
    }
}

impl RetryBackoff for ExponentialBackoff {
    fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.saturating_mul(2).min(self.max);
        delay
    }

    fn reset(&mut self) {
        self.current = self.initial;
    }
}

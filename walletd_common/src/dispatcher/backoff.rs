use std::time::Duration;

use crate::config::ConfigError;

pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1);

/// Delay applied after a failed attempt.
///
/// Starts at `base`, doubles after every failure and goes back to `base`
/// on success. Growth is unbounded unless a maximum is set, in which case
/// the delay is clamped to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
    max: Option<Duration>,
    current: Duration,
}

impl Backoff {
    pub fn new(base: Duration, max: Option<Duration>) -> Result<Self, ConfigError> {
        if base.is_zero() {
            return Err(ConfigError::ZeroBaseDelay)
        }

        if let Some(max) = max {
            if max < base {
                return Err(ConfigError::MaxDelayBelowBase(max, base))
            }
        }

        Ok(Self {
            base,
            max,
            current: base,
        })
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    pub fn max(&self) -> Option<Duration> {
        self.max
    }

    pub fn current(&self) -> Duration {
        self.current
    }

    // Double the delay, saturating at the largest Duration when no max is set
    pub fn grow(&mut self) {
        let next = self.current.saturating_mul(2);
        self.current = match self.max {
            Some(max) => next.min(max),
            None => next,
        };
    }

    pub fn reset(&mut self) {
        self.current = self.base;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE_DELAY,
            max: None,
            current: DEFAULT_BASE_DELAY,
        }
    }
}

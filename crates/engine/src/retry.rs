use std::time::Duration;

/// Delay schedule between fetch attempts of one symbol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    Fixed {
        delay: Duration,
    },
    /// `base * factor^retry`, capped at `max`, optionally with ±50% jitter.
    Exponential {
        base: Duration,
        factor: f64,
        max: Duration,
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_millis(200),
            factor: 2.0,
            max: Duration::from_secs(3),
            jitter: true,
        }
    }
}

impl Backoff {
    /// Delay before retry number `retry` (0-based).
    pub fn delay(self, retry: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => {
                let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
                let millis = (base.as_secs_f64() * factor.powi(exponent) * 1_000.0)
                    .min(max.as_secs_f64() * 1_000.0)
                    .max(0.0) as u64;
                if !jitter || millis == 0 {
                    return Duration::from_millis(millis);
                }
                let spread = millis / 2;
                let offset = fastrand::u64(0..=spread * 2);
                Duration::from_millis(millis - spread + offset)
            }
        }
    }
}

/// How often a failed fetch is re-attempted and how long to wait in between.
///
/// Only retryable errors (transient network, parse) consume retries. A job
/// makes at most `max_retries + 1` provider calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryConfig {
    pub enabled: bool,
    pub max_retries: u32,
    pub backoff: Backoff,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::exponential(3)
    }
}

impl RetryConfig {
    pub fn exponential(max_retries: u32) -> Self {
        Self {
            enabled: true,
            max_retries,
            backoff: Backoff::default(),
        }
    }

    pub fn fixed(delay: Duration, max_retries: u32) -> Self {
        Self {
            enabled: true,
            max_retries,
            backoff: Backoff::Fixed { delay },
        }
    }

    pub fn no_retry() -> Self {
        Self {
            enabled: false,
            max_retries: 0,
            backoff: Backoff::Fixed {
                delay: Duration::ZERO,
            },
        }
    }

    /// Whether a job that already used `retries_used` retries may try again.
    pub fn allows(&self, retries_used: u32) -> bool {
        self.enabled && retries_used < self.max_retries
    }

    pub fn delay_for(&self, retry: u32) -> Duration {
        self.backoff.delay(retry)
    }
}

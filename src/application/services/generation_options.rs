//! Retry and timeout settings for automatic key generation.

use std::time::Duration;
use thiserror::Error;

/// Default number of retries after a key conflict.
pub const DEFAULT_RETRY_COUNT: u32 = 3;

/// Default cumulative deadline for one generation call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Largest accepted deadline.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Rejected [`GenerationOptions`] values.
#[derive(Debug, Error, PartialEq)]
pub enum OptionsError {
    #[error("timeout must be greater than zero")]
    ZeroTimeout,
    #[error("timeout seconds must be a positive finite number, got {0}")]
    InvalidTimeoutSeconds(f64),
    #[error("timeout must be at most {max:?}, got {got:?}")]
    TimeoutTooLarge { max: Duration, got: Duration },
}

/// Settings read by [`super::GenerationService`].
///
/// Built once at startup and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    retry_count: u32,
    timeout: Duration,
}

impl GenerationOptions {
    /// Creates options, rejecting a zero timeout or one above [`MAX_TIMEOUT`].
    pub fn new(retry_count: u32, timeout: Duration) -> Result<Self, OptionsError> {
        if timeout.is_zero() {
            return Err(OptionsError::ZeroTimeout);
        }
        if timeout > MAX_TIMEOUT {
            return Err(OptionsError::TimeoutTooLarge {
                max: MAX_TIMEOUT,
                got: timeout,
            });
        }

        Ok(Self {
            retry_count,
            timeout,
        })
    }

    /// Creates options from a timeout expressed in (possibly fractional) seconds.
    pub fn from_secs_f64(retry_count: u32, timeout_seconds: f64) -> Result<Self, OptionsError> {
        let timeout = Duration::try_from_secs_f64(timeout_seconds)
            .map_err(|_| OptionsError::InvalidTimeoutSeconds(timeout_seconds))?;

        Self::new(retry_count, timeout)
    }

    /// Retries allowed after the first attempt conflicts.
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Deadline for the whole attempt sequence, not per attempt.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            retry_count: DEFAULT_RETRY_COUNT,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

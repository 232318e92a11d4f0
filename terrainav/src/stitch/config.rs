//! Stitcher configuration.

use std::time::Duration;

/// Attempts per tile before it is given up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Fixed delay between attempts of the same tile.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Tile fetches allowed in flight at once.
pub const DEFAULT_MAX_CONCURRENT: usize = 16;

/// Upper bound for a single fetch attempt.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Retry and concurrency policy for a [`TileStitcher`](super::TileStitcher).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StitchConfig {
    max_attempts: u32,
    retry_delay: Duration,
    max_concurrent: usize,
    request_timeout: Duration,
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl StitchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of attempts per tile (at least 1).
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Sets the worker pool size (at least 1).
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

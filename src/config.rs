//! Acquisition timing and batching configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// Public routing instances allow roughly 1 req/s. Three requests per batch with
// a 3s gap keeps the sustained rate at or below that, retries included.
pub const DEFAULT_BATCH_SIZE: usize = 3;
pub const DEFAULT_MAX_RATE_LIMIT_RETRIES: u32 = 3;
pub const DEFAULT_RATE_LIMIT_DELAY_MS: u64 = 1500;
pub const DEFAULT_SERIAL_RETRY_DELAY_MS: u64 = 2000;
pub const DEFAULT_INTER_BATCH_DELAY_MS: u64 = 3000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Configuration for a segment acquisition run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionConfig {
    /// Requests dispatched concurrently per batch.
    /// Default: 3
    pub batch_size: usize,

    /// In-place retries after a rate-limit reply, per fetch.
    /// Default: 3 (so at most 4 requests for one fetch)
    pub max_rate_limit_retries: u32,

    /// Wait before retrying a rate-limited request.
    /// Default: 1.5s
    pub rate_limit_delay: Duration,

    /// Wait before each serial retry of a failed batch item.
    /// Default: 2s
    pub serial_retry_delay: Duration,

    /// Wait between consecutive batches.
    /// Default: 3s
    pub inter_batch_delay: Duration,

    /// Upper bound on a single routing request; elapsed requests count as failures.
    /// Default: 10s
    pub request_timeout: Duration,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_rate_limit_retries: DEFAULT_MAX_RATE_LIMIT_RETRIES,
            rate_limit_delay: Duration::from_millis(DEFAULT_RATE_LIMIT_DELAY_MS),
            serial_retry_delay: Duration::from_millis(DEFAULT_SERIAL_RETRY_DELAY_MS),
            inter_batch_delay: Duration::from_millis(DEFAULT_INTER_BATCH_DELAY_MS),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }
}

impl AcquisitionConfig {
    /// Number of batches needed for `total` requests.
    pub fn batch_count(&self, total: usize) -> usize {
        total.div_ceil(self.effective_batch_size())
    }

    /// Batch size clamped to at least one request.
    pub(crate) fn effective_batch_size(&self) -> usize {
        self.batch_size.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AcquisitionConfig::default();
        assert_eq!(config.batch_size, 3);
        assert_eq!(config.max_rate_limit_retries, 3);
        assert_eq!(config.rate_limit_delay, Duration::from_millis(1500));
        assert_eq!(config.serial_retry_delay, Duration::from_secs(2));
        assert_eq!(config.inter_batch_delay, Duration::from_secs(3));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_batch_count() {
        let config = AcquisitionConfig::default();
        assert_eq!(config.batch_count(0), 0);
        assert_eq!(config.batch_count(3), 1);
        assert_eq!(config.batch_count(7), 3);

        let zero = AcquisitionConfig { batch_size: 0, ..Default::default() };
        assert_eq!(zero.batch_count(2), 2);
    }
}

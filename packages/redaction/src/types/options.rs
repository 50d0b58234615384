//! Per-service tuning options.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ConfigError;

/// Tuning knobs for a redaction service.
///
/// Options are validated once at service construction; a service never has
/// to re-check them per call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedactionOptions {
    /// Consult registered cloud providers in addition to local patterns
    pub use_cloud_detection: bool,
    /// Provider names to consult; empty means every registered provider
    pub providers: Vec<String>,
    /// Texts at or below this many bytes are scanned inline on the calling
    /// task; larger texts are split across the chunk worker pool
    pub size_threshold: usize,
    /// Fixed number of chunk-scanning worker threads
    pub worker_count: usize,
    /// Cap on in-flight provider requests, shared across a whole batch
    pub provider_concurrency_limit: usize,
    /// Deadline for a call's whole cloud-detection phase, queueing for a
    /// concurrency permit included
    pub timeout: Duration,
}

impl Default for RedactionOptions {
    fn default() -> Self {
        Self {
            use_cloud_detection: false,
            providers: Vec::new(),
            size_threshold: 5_000,
            worker_count: 4,
            provider_concurrency_limit: 4,
            timeout: Duration::from_secs(10),
        }
    }
}

impl RedactionOptions {
    pub fn with_cloud_detection(mut self, enabled: bool) -> Self {
        self.use_cloud_detection = enabled;
        self
    }

    /// Restricts cloud detection to the named providers.
    pub fn with_providers(mut self, providers: Vec<String>) -> Self {
        self.providers = providers;
        self
    }

    pub fn with_size_threshold(mut self, bytes: usize) -> Self {
        self.size_threshold = bytes;
        self
    }

    pub fn with_worker_count(mut self, workers: usize) -> Self {
        self.worker_count = workers;
        self
    }

    pub fn with_provider_concurrency_limit(mut self, limit: usize) -> Self {
        self.provider_concurrency_limit = limit;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Rejects values a service could not run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size_threshold == 0 {
            return Err(ConfigError::InvalidThreshold {
                value: self.size_threshold,
            });
        }
        if self.worker_count == 0 {
            return Err(ConfigError::InvalidWorkerCount {
                value: self.worker_count,
            });
        }
        if self.provider_concurrency_limit == 0 {
            return Err(ConfigError::InvalidConcurrencyLimit {
                value: self.provider_concurrency_limit,
            });
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(())
    }
}

//! Bounded waits on metadata store calls.

use std::future::Future;
use std::time::Duration;

use stash_core::config::StoreConfig;
use stash_core::error::AppError;
use stash_core::result::AppResult;

/// Upper bound on a single metadata store round-trip.
///
/// A call that does not finish in time fails with `Transient`; every store
/// mutation is idempotent at the record level, so the caller may retry.
#[derive(Debug, Clone, Copy)]
pub struct StoreDeadline {
    timeout: Duration,
}

impl StoreDeadline {
    /// Create a deadline of `timeout` per call.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Build from the `[store]` config section.
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.operation_timeout())
    }

    /// The configured bound.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Await `call`, failing with `Transient` if it overruns.
    pub async fn run<T, F>(&self, call: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(AppError::transient(format!(
                "Metadata store call timed out after {} ms",
                self.timeout.as_millis()
            ))),
        }
    }
}

impl Default for StoreDeadline {
    fn default() -> Self {
        Self::from_config(&StoreConfig::default())
    }
}

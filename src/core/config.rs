//! Ledger engine configuration

use std::time::Duration;

/// Store access configuration for the concurrent engine
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Longest wait for any single lock before the operation fails with
    /// `StorageUnavailable`
    pub lock_timeout: Duration,

    /// How many times an operation retries after losing a race to create
    /// the same account
    pub create_retries: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(5),
            create_retries: 3,
        }
    }
}

impl LedgerConfig {
    /// Create a config with a custom lock timeout
    ///
    /// A zero timeout would fail every contended operation, so it falls back
    /// to the default with a warning.
    pub fn with_lock_timeout(lock_timeout: Duration) -> Self {
        let default = Self::default();

        let lock_timeout = if lock_timeout.is_zero() {
            tracing::warn!(
                default_ms = default.lock_timeout.as_millis() as u64,
                "Invalid lock timeout (0ms), using default"
            );
            default.lock_timeout
        } else {
            lock_timeout
        };

        Self {
            lock_timeout,
            ..default
        }
    }
}

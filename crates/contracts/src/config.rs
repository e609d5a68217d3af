//! SenderConfig - Config Loader output, Dispatcher input

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default depth of the producer queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Sender configuration
///
/// Immutable for the lifetime of one client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderConfig {
    /// Collection endpoint, `host:port`
    pub endpoint: String,

    /// Records per batch (0 = size trigger disabled)
    #[serde(default)]
    pub batch_size: usize,

    /// Batch deadline in milliseconds (0 = timer trigger disabled)
    #[serde(default)]
    pub batch_timeout_ms: u64,

    /// Bounded producer queue depth
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

impl SenderConfig {
    /// Config that flushes every record immediately
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            batch_size: 0,
            batch_timeout_ms: 0,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_batch_timeout(mut self, timeout: Duration) -> Self {
        self.batch_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    /// Batch deadline as a Duration (zero = disabled)
    pub fn batch_timeout(&self) -> Duration {
        Duration::from_millis(self.batch_timeout_ms)
    }
}

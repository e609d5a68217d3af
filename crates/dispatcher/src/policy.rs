//! Flush policy - pure batching decisions

use std::time::Duration;

use contracts::SenderConfig;

/// Why a flush is being evaluated or performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushTrigger {
    /// A record arrived and the batch reached its size threshold
    Size,
    /// Explicit `flush()` request
    Explicit,
    /// Batch deadline elapsed
    Deadline,
    /// Producer side closed; remaining records are flushed once
    Close,
}

impl FlushTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Size => "size",
            Self::Explicit => "explicit",
            Self::Deadline => "deadline",
            Self::Close => "close",
        }
    }
}

/// Flush now after a record arrival?
///
/// - no size and no timeout: every record is flushed on its own
/// - size set: flush once the batch holds at least `batch_size` records
/// - otherwise wait for the timer or an explicit flush
pub fn should_flush_now(batch_size: usize, batch_timeout: Duration, current_len: usize) -> bool {
    if batch_size == 0 && batch_timeout.is_zero() {
        return true;
    }
    batch_size > 0 && current_len >= batch_size
}

/// Arm the batch deadline now?
pub fn should_arm_timer(batch_timeout: Duration, timer_armed: bool) -> bool {
    !timer_armed && !batch_timeout.is_zero()
}

/// Batching thresholds of one client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushPolicy {
    batch_size: usize,
    batch_timeout: Duration,
}

impl FlushPolicy {
    pub fn new(batch_size: usize, batch_timeout: Duration) -> Self {
        Self {
            batch_size,
            batch_timeout,
        }
    }

    pub fn from_config(config: &SenderConfig) -> Self {
        Self::new(config.batch_size, config.batch_timeout())
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn batch_timeout(&self) -> Duration {
        self.batch_timeout
    }

    pub fn should_flush_now(&self, current_len: usize) -> bool {
        should_flush_now(self.batch_size, self.batch_timeout, current_len)
    }

    pub fn should_arm_timer(&self, timer_armed: bool) -> bool {
        should_arm_timer(self.batch_timeout, timer_armed)
    }
}

//! Per-client dispatch statistics

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free counters shared between the client and its worker
#[derive(Debug, Default)]
pub struct DispatchStats {
    /// Records accepted into the queue
    records_enqueued: AtomicU64,
    /// Records rejected by `try_send` (queue full or closed)
    records_rejected: AtomicU64,
    /// Records written to the transport
    records_sent: AtomicU64,
    /// Records dropped by cancellation or a failed flush
    records_discarded: AtomicU64,
    /// Connections attempted by flushes
    flush_count: AtomicU64,
    /// Flushes aborted by connect or write failures
    flush_failures: AtomicU64,
    /// Records skipped by the encoder
    encode_failures: AtomicU64,
    /// Payload bytes written
    bytes_written: AtomicU64,
}

impl DispatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records_enqueued(&self) -> u64 {
        self.records_enqueued.load(Ordering::Relaxed)
    }

    pub fn inc_records_enqueued(&self) {
        self.records_enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn records_rejected(&self) -> u64 {
        self.records_rejected.load(Ordering::Relaxed)
    }

    pub fn inc_records_rejected(&self) {
        self.records_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn records_sent(&self) -> u64 {
        self.records_sent.load(Ordering::Relaxed)
    }

    pub fn add_records_sent(&self, count: u64) {
        self.records_sent.fetch_add(count, Ordering::Relaxed);
    }

    pub fn records_discarded(&self) -> u64 {
        self.records_discarded.load(Ordering::Relaxed)
    }

    pub fn add_records_discarded(&self, count: u64) {
        self.records_discarded.fetch_add(count, Ordering::Relaxed);
    }

    pub fn flush_count(&self) -> u64 {
        self.flush_count.load(Ordering::Relaxed)
    }

    pub fn inc_flush_count(&self) {
        self.flush_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn flush_failures(&self) -> u64 {
        self.flush_failures.load(Ordering::Relaxed)
    }

    pub fn inc_flush_failures(&self) {
        self.flush_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn encode_failures(&self) -> u64 {
        self.encode_failures.load(Ordering::Relaxed)
    }

    pub fn inc_encode_failures(&self) {
        self.encode_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    pub fn add_bytes_written(&self, bytes: u64) {
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            records_enqueued: self.records_enqueued(),
            records_rejected: self.records_rejected(),
            records_sent: self.records_sent(),
            records_discarded: self.records_discarded(),
            flush_count: self.flush_count(),
            flush_failures: self.flush_failures(),
            encode_failures: self.encode_failures(),
            bytes_written: self.bytes_written(),
        }
    }
}

/// Snapshot of dispatch statistics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub records_enqueued: u64,
    pub records_rejected: u64,
    pub records_sent: u64,
    pub records_discarded: u64,
    pub flush_count: u64,
    pub flush_failures: u64,
    pub encode_failures: u64,
    pub bytes_written: u64,
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Dispatch Summary ===")?;
        writeln!(f, "Records enqueued: {}", self.records_enqueued)?;
        writeln!(f, "Records sent: {}", self.records_sent)?;
        writeln!(f, "Records rejected: {}", self.records_rejected)?;
        writeln!(f, "Records discarded: {}", self.records_discarded)?;
        writeln!(
            f,
            "Flushes: {} ({} failed)",
            self.flush_count, self.flush_failures
        )?;
        writeln!(f, "Encode failures: {}", self.encode_failures)?;
        write!(f, "Bytes written: {}", self.bytes_written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_and_snapshot() {
        let stats = DispatchStats::new();
        stats.inc_records_enqueued();
        stats.inc_records_enqueued();
        stats.add_records_sent(2);
        stats.inc_flush_count();
        stats.add_bytes_written(64);

        let snap = stats.snapshot();
        assert_eq!(snap.records_enqueued, 2);
        assert_eq!(snap.records_sent, 2);
        assert_eq!(snap.flush_count, 1);
        assert_eq!(snap.bytes_written, 64);
        assert_eq!(snap.flush_failures, 0);
    }

    #[test]
    fn test_summary_display() {
        let snap = StatsSnapshot {
            records_enqueued: 10,
            records_sent: 9,
            flush_count: 3,
            flush_failures: 1,
            ..Default::default()
        };
        let output = snap.to_string();
        assert!(output.contains("Records sent: 9"));
        assert!(output.contains("Flushes: 3 (1 failed)"));
    }
}

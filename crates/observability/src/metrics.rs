//! Dispatcher metric recorders
//!
//! Thin wrappers over the `metrics` facade. Without an installed recorder
//! every call is a no-op.

use metrics::{counter, histogram};

/// Record a completed flush attempt
///
/// `trigger` is the reason the flush ran (size / deadline / explicit / close).
pub fn record_flush(trigger: &'static str, records: usize, bytes: usize) {
    counter!("line_sender_flushes_total", "trigger" => trigger).increment(1);
    counter!("line_sender_records_sent_total").increment(records as u64);
    counter!("line_sender_bytes_sent_total").increment(bytes as u64);
    histogram!("line_sender_batch_records").record(records as f64);
}

/// Record a failure reported to the error listener
pub fn record_dispatch_error(kind: &'static str) {
    counter!("line_sender_errors_total", "kind" => kind).increment(1);
}

/// Record records accepted into the producer queue
pub fn record_records_enqueued(count: u64) {
    counter!("line_sender_records_enqueued_total").increment(count);
}

/// Record records dropped unsent (cancellation, failed connect or write)
pub fn record_records_discarded(count: usize) {
    if count > 0 {
        counter!("line_sender_records_discarded_total").increment(count as u64);
    }
}

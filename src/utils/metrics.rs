//! Observability and Metrics
//!
//! Counters for codec activity: messages and bytes through each direction,
//! decode failures by family, and values clamped on encode.
//!
//! Uses atomic counters for thread-safe metrics collection.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info};

/// Global metrics collector for codec operations
#[derive(Debug)]
pub struct Metrics {
    /// Messages encoded
    pub messages_encoded: AtomicU64,
    /// Messages decoded successfully
    pub messages_decoded: AtomicU64,
    /// Total bytes produced by encode
    pub bytes_encoded: AtomicU64,
    /// Total bytes consumed by successful decodes
    pub bytes_decoded: AtomicU64,
    /// Decodes that ran out of input
    pub decode_truncated: AtomicU64,
    /// Decodes rejected for invalid content
    pub decode_malformed: AtomicU64,
    /// Lists truncated or bit fields masked on encode
    pub fields_clamped: AtomicU64,
    /// Start time for uptime calculation
    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            messages_encoded: AtomicU64::new(0),
            messages_decoded: AtomicU64::new(0),
            bytes_encoded: AtomicU64::new(0),
            bytes_decoded: AtomicU64::new(0),
            decode_truncated: AtomicU64::new(0),
            decode_malformed: AtomicU64::new(0),
            fields_clamped: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record an encoded message
    pub fn message_encoded(&self, byte_count: u64) {
        self.messages_encoded.fetch_add(1, Ordering::Relaxed);
        self.bytes_encoded.fetch_add(byte_count, Ordering::Relaxed);
    }

    /// Record a decoded message
    pub fn message_decoded(&self, byte_count: u64) {
        self.messages_decoded.fetch_add(1, Ordering::Relaxed);
        self.bytes_decoded.fetch_add(byte_count, Ordering::Relaxed);
    }

    pub fn decode_truncated(&self) {
        self.decode_truncated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn decode_malformed(&self) {
        self.decode_malformed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a value cut down to fit its wire field
    pub fn field_clamped(&self) {
        self.fields_clamped.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            messages_encoded: self.messages_encoded.load(Ordering::Relaxed),
            messages_decoded: self.messages_decoded.load(Ordering::Relaxed),
            bytes_encoded: self.bytes_encoded.load(Ordering::Relaxed),
            bytes_decoded: self.bytes_decoded.load(Ordering::Relaxed),
            decode_truncated: self.decode_truncated.load(Ordering::Relaxed),
            decode_malformed: self.decode_malformed.load(Ordering::Relaxed),
            fields_clamped: self.fields_clamped.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// Log current metrics
    pub fn log_metrics(&self) {
        let snapshot = self.snapshot();
        info!(
            messages_encoded = snapshot.messages_encoded,
            messages_decoded = snapshot.messages_decoded,
            bytes_encoded = snapshot.bytes_encoded,
            bytes_decoded = snapshot.bytes_decoded,
            decode_truncated = snapshot.decode_truncated,
            decode_malformed = snapshot.decode_malformed,
            fields_clamped = snapshot.fields_clamped,
            uptime_seconds = snapshot.uptime_seconds,
            "Codec metrics snapshot"
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub messages_encoded: u64,
    pub messages_decoded: u64,
    pub bytes_encoded: u64,
    pub bytes_decoded: u64,
    pub decode_truncated: u64,
    pub decode_malformed: u64,
    pub fields_clamped: u64,
    pub uptime_seconds: u64,
}

/// Global metrics instance (lazy static for simplicity)
static METRICS: once_cell::sync::Lazy<Metrics> = once_cell::sync::Lazy::new(Metrics::new);

/// Get the global metrics instance
pub fn global_metrics() -> &'static Metrics {
    &METRICS
}

/// Logs how long an operation took when dropped.
pub struct Timer {
    start: Instant,
    operation: &'static str,
}

impl Timer {
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        debug!(
            operation = self.operation,
            duration_us = duration.as_micros() as u64,
            "Operation completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_counters() {
        let metrics = Metrics::new();
        metrics.message_encoded(10);
        metrics.message_encoded(5);
        metrics.message_decoded(7);
        metrics.decode_truncated();
        metrics.field_clamped();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.messages_encoded, 2);
        assert_eq!(snapshot.bytes_encoded, 15);
        assert_eq!(snapshot.messages_decoded, 1);
        assert_eq!(snapshot.bytes_decoded, 7);
        assert_eq!(snapshot.decode_truncated, 1);
        assert_eq!(snapshot.decode_malformed, 0);
        assert_eq!(snapshot.fields_clamped, 1);
        metrics.log_metrics();
    }

    #[test]
    fn test_global_instance_is_shared() {
        let before = global_metrics().snapshot().fields_clamped;
        global_metrics().field_clamped();
        assert!(global_metrics().snapshot().fields_clamped > before);
    }
}

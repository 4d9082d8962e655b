//! Logger metrics for observability
//!
//! Counters describing what the pipeline did with each call: filtered,
//! buffered, written, degraded to the fallback line, or lost.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// # Example
///
/// ```
/// use budget_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_emitted();
/// metrics.record_dropped();
///
/// assert_eq!(metrics.emitted_count(), 1);
/// assert_eq!(metrics.dropped_count(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Entries written in their full rendering
    emitted: AtomicU64,

    /// Entries appended to the buffer
    buffered: AtomicU64,

    /// Calls rejected by the level policy
    filtered: AtomicU64,

    /// Entries written only as the minimal fallback line
    fallback: AtomicU64,

    /// Entries lost because even the fallback line failed
    dropped: AtomicU64,

    /// Flush invocations, including ones that found an empty buffer
    flush_attempts: AtomicU64,

    /// Flushes that wrote at least one entry
    flushes: AtomicU64,
}

impl LoggerMetrics {
    pub const fn new() -> Self {
        Self {
            emitted: AtomicU64::new(0),
            buffered: AtomicU64::new(0),
            filtered: AtomicU64::new(0),
            fallback: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            flush_attempts: AtomicU64::new(0),
            flushes: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn emitted_count(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn buffered_count(&self) -> u64 {
        self.buffered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn filtered_count(&self) -> u64 {
        self.filtered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn fallback_count(&self) -> u64 {
        self.fallback.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn flush_attempts(&self) -> u64 {
        self.flush_attempts.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn flush_count(&self) -> u64 {
        self.flushes.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_emitted(&self) -> u64 {
        self.emitted.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_buffered(&self) -> u64 {
        self.buffered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_filtered(&self) -> u64 {
        self.filtered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_fallback(&self) -> u64 {
        self.fallback.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.dropped.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_flush_attempt(&self) -> u64 {
        self.flush_attempts.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_flush(&self) -> u64 {
        self.flushes.fetch_add(1, Ordering::Relaxed)
    }

    /// Entries that reached an output in any form
    pub fn delivered_count(&self) -> u64 {
        self.emitted_count() + self.fallback_count()
    }

    /// Share of entries that needed the fallback line or were lost
    /// (0.0 - 100.0). Returns 0.0 if nothing has been written yet.
    pub fn degraded_rate(&self) -> f64 {
        let degraded = (self.fallback_count() + self.dropped_count()) as f64;
        let total = self.emitted_count() as f64 + degraded;
        if total == 0.0 {
            0.0
        } else {
            (degraded / total) * 100.0
        }
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            emitted: AtomicU64::new(self.emitted_count()),
            buffered: AtomicU64::new(self.buffered_count()),
            filtered: AtomicU64::new(self.filtered_count()),
            fallback: AtomicU64::new(self.fallback_count()),
            dropped: AtomicU64::new(self.dropped_count()),
            flush_attempts: AtomicU64::new(self.flush_attempts()),
            flushes: AtomicU64::new(self.flush_count()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.emitted_count(), 0);
        assert_eq!(metrics.buffered_count(), 0);
        assert_eq!(metrics.dropped_count(), 0);
        assert_eq!(metrics.flush_attempts(), 0);
    }

    #[test]
    fn test_record_returns_previous_value() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.record_dropped(), 0);
        assert_eq!(metrics.dropped_count(), 1);
    }

    #[test]
    fn test_degraded_rate() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.degraded_rate(), 0.0);

        for _ in 0..90 {
            metrics.record_emitted();
        }
        for _ in 0..5 {
            metrics.record_fallback();
        }
        for _ in 0..5 {
            metrics.record_dropped();
        }

        let rate = metrics.degraded_rate();
        assert!((9.9..=10.1).contains(&rate), "Degraded rate was {}", rate);
        assert_eq!(metrics.delivered_count(), 95);
    }

    #[test]
    fn test_metrics_clone() {
        let metrics = LoggerMetrics::new();
        metrics.record_flush_attempt();

        let snapshot = metrics.clone();
        metrics.record_flush_attempt();

        assert_eq!(snapshot.flush_attempts(), 1);
        assert_eq!(metrics.flush_attempts(), 2);
    }
}

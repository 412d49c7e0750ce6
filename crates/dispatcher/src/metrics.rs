//! Dispatch metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

use contracts::DispatchResult;

/// In-process counters for one Dispatcher
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Total dispatch calls that returned a result
    dispatch_count: AtomicU64,
    /// Dispatches cut short by the deadline
    timed_out_count: AtomicU64,
    /// Dispatches with fewer results than categories
    partial_count: AtomicU64,
    /// Category results delivered to callers
    result_count: AtomicU64,
    /// Categories absent from a dispatch result
    missing_count: AtomicU64,
}

impl DispatchMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one finished dispatch
    pub fn record(&self, result: &DispatchResult) {
        self.dispatch_count.fetch_add(1, Ordering::Relaxed);
        if result.timed_out {
            self.timed_out_count.fetch_add(1, Ordering::Relaxed);
        }
        if result.is_partial() {
            self.partial_count.fetch_add(1, Ordering::Relaxed);
        }
        self.result_count
            .fetch_add(result.len() as u64, Ordering::Relaxed);
        self.missing_count
            .fetch_add(result.missing.len() as u64, Ordering::Relaxed);
    }

    pub fn dispatch_count(&self) -> u64 {
        self.dispatch_count.load(Ordering::Relaxed)
    }

    pub fn timed_out_count(&self) -> u64 {
        self.timed_out_count.load(Ordering::Relaxed)
    }

    pub fn partial_count(&self) -> u64 {
        self.partial_count.load(Ordering::Relaxed)
    }

    pub fn result_count(&self) -> u64 {
        self.result_count.load(Ordering::Relaxed)
    }

    pub fn missing_count(&self) -> u64 {
        self.missing_count.load(Ordering::Relaxed)
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            dispatch_count: self.dispatch_count(),
            timed_out_count: self.timed_out_count(),
            partial_count: self.partial_count(),
            result_count: self.result_count(),
            missing_count: self.missing_count(),
        }
    }
}

/// Snapshot of dispatch metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub dispatch_count: u64,
    pub timed_out_count: u64,
    pub partial_count: u64,
    pub result_count: u64,
    pub missing_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{CategoryResult, SearchResult};
    use std::time::Duration;

    #[test]
    fn test_record_partial_dispatch() {
        let metrics = DispatchMetrics::new();
        let result = DispatchResult {
            query: "q".into(),
            results: vec![CategoryResult {
                category: "web".into(),
                backend: "web1".into(),
                result: SearchResult::new("w"),
                arrived_after: Duration::from_millis(12),
            }],
            missing: vec!["image".into(), "video".into()],
            expected: 3,
            elapsed: Duration::from_millis(60),
            timed_out: true,
        };

        metrics.record(&result);
        metrics.record(&DispatchResult::empty("q".into()));

        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                dispatch_count: 2,
                timed_out_count: 1,
                partial_count: 1,
                result_count: 1,
                missing_count: 2,
            }
        );
    }
}

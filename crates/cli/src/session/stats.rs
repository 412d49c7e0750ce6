//! Session statistics.

use std::time::Duration;

use contracts::DispatchResult;
use dispatcher::MetricsSnapshot;
use observability::DispatchStatsAggregator;

/// Statistics from a search session
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    /// Categories per dispatch
    pub categories: usize,

    /// Wall-clock duration of the whole session
    pub duration: Duration,

    /// Dispatcher counters at the end of the session
    pub dispatcher: MetricsSnapshot,

    /// Per-dispatch aggregate
    pub aggregator: DispatchStatsAggregator,
}

impl SessionStats {
    pub fn new(categories: usize) -> Self {
        Self {
            categories,
            ..Self::default()
        }
    }

    pub fn record(&mut self, result: &DispatchResult) {
        self.aggregator.update(result);
    }

    /// Share of categories that answered in time, as a percentage
    pub fn completeness(&self) -> f64 {
        let expected = self.dispatcher.dispatch_count * self.categories as u64;
        if expected > 0 {
            self.dispatcher.result_count as f64 / expected as f64 * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Session Statistics ===\n");
        println!("Duration: {:.3}s", self.duration.as_secs_f64());
        println!("Dispatches: {}", self.dispatcher.dispatch_count);
        println!(
            "Results delivered: {} ({:.2}% of categories)",
            self.dispatcher.result_count,
            self.completeness()
        );
        println!();
        print!("{}", self.aggregator.summary());
    }
}

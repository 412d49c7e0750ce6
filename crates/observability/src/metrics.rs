//! Dispatch metrics collection
//!
//! Exports per-dispatch counters through the `metrics` facade and aggregates
//! repeated runs in memory for a printed summary.

use std::collections::BTreeMap;

use contracts::DispatchResult;
use metrics::{counter, histogram};

/// Record metrics for one finished dispatch
///
/// Call once per `DispatchResult`.
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_dispatch_metrics;
///
/// let result = dispatcher.search("golang").await?;
/// record_dispatch_metrics(&result);
/// ```
pub fn record_dispatch_metrics(result: &DispatchResult) {
    counter!("hedge_search_dispatch_total").increment(1);
    if result.is_partial() {
        counter!("hedge_search_dispatch_partial_total").increment(1);
    }

    histogram!("hedge_search_dispatch_results").record(result.len() as f64);
    histogram!("hedge_search_dispatch_elapsed_ms").record(result.elapsed.as_secs_f64() * 1000.0);

    for hit in &result.results {
        counter!(
            "hedge_search_category_wins_total",
            "category" => hit.category.clone(),
            "backend" => hit.backend.clone()
        )
        .increment(1);
    }

    for category in &result.missing {
        counter!(
            "hedge_search_category_missing_total",
            "category" => category.clone()
        )
        .increment(1);
    }
}

/// Dispatch statistics aggregator
///
/// Aggregates repeated dispatches in memory for a summary report.
#[derive(Debug, Clone, Default)]
pub struct DispatchStatsAggregator {
    /// Total dispatches
    pub total_dispatches: u64,

    /// Dispatches with at least one missing category
    pub partial_dispatches: u64,

    /// Dispatches cut short by the deadline
    pub timed_out_dispatches: u64,

    /// Elapsed time statistics (ms)
    pub elapsed_stats: RunningStats,

    /// Result count statistics
    pub result_stats: RunningStats,

    /// Wins per category, per backend
    pub wins: BTreeMap<String, BTreeMap<String, u64>>,

    /// Misses per category
    pub missing_counts: BTreeMap<String, u64>,
}

impl DispatchStatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one dispatch result into the aggregate
    pub fn update(&mut self, result: &DispatchResult) {
        self.total_dispatches += 1;
        if result.is_partial() {
            self.partial_dispatches += 1;
        }
        if result.timed_out {
            self.timed_out_dispatches += 1;
        }

        self.elapsed_stats
            .push(result.elapsed.as_secs_f64() * 1000.0);
        self.result_stats.push(result.len() as f64);

        for hit in &result.results {
            *self
                .wins
                .entry(hit.category.clone())
                .or_default()
                .entry(hit.backend.clone())
                .or_insert(0) += 1;
        }
        for category in &result.missing {
            *self.missing_counts.entry(category.clone()).or_insert(0) += 1;
        }
    }

    /// Generate summary report
    pub fn summary(&self) -> DispatchSummary {
        DispatchSummary {
            total_dispatches: self.total_dispatches,
            partial_dispatches: self.partial_dispatches,
            timed_out_dispatches: self.timed_out_dispatches,
            partial_rate: if self.total_dispatches > 0 {
                self.partial_dispatches as f64 / self.total_dispatches as f64 * 100.0
            } else {
                0.0
            },
            elapsed_ms: StatsSummary::from(&self.elapsed_stats),
            results: StatsSummary::from(&self.result_stats),
            wins: self.wins.clone(),
            missing_counts: self.missing_counts.clone(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Aggregated dispatch summary
#[derive(Debug, Clone, Default)]
pub struct DispatchSummary {
    pub total_dispatches: u64,
    pub partial_dispatches: u64,
    pub timed_out_dispatches: u64,
    pub partial_rate: f64,
    pub elapsed_ms: StatsSummary,
    pub results: StatsSummary,
    pub wins: BTreeMap<String, BTreeMap<String, u64>>,
    pub missing_counts: BTreeMap<String, u64>,
}

impl std::fmt::Display for DispatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Dispatch Summary ===")?;
        writeln!(f, "Total dispatches: {}", self.total_dispatches)?;
        writeln!(
            f,
            "Partial dispatches: {} ({:.2}%)",
            self.partial_dispatches, self.partial_rate
        )?;
        writeln!(f, "Timed out: {}", self.timed_out_dispatches)?;
        writeln!(f, "Elapsed (ms): {}", self.elapsed_ms)?;
        writeln!(f, "Results per dispatch: {}", self.results)?;

        if !self.wins.is_empty() {
            writeln!(f, "Wins:")?;
            for (category, backends) in &self.wins {
                let detail: Vec<String> = backends
                    .iter()
                    .map(|(backend, count)| format!("{backend}={count}"))
                    .collect();
                writeln!(f, "  {}: {}", category, detail.join(", "))?;
            }
        }

        if !self.missing_counts.is_empty() {
            writeln!(f, "Missing categories:")?;
            for (category, count) in &self.missing_counts {
                writeln!(f, "  {}: {}", category, count)?;
            }
        }

        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

//! Dispatcher - fan-out across categories, deadline-bounded fan-in

use std::time::Duration;

use contracts::{
    Backend, CategoryConfig, CategoryResult, DispatchResult, Query, SearchBlueprint,
};
use tokio::sync::mpsc;
use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::backends::SimulatedBackend;
use crate::category::{Category, CategoryHit};
use crate::error::DispatcherError;
use crate::metrics::{DispatchMetrics, MetricsSnapshot};

/// Race every category on `query` and collect winners until all categories
/// have reported or `deadline` elapses, whichever comes first.
///
/// The deadline is measured from entry into this call. Results are returned in
/// arrival order, at most one per category. Hitting the deadline is not an
/// error: the partial set is returned with `timed_out` set. When the call
/// returns (or its future is dropped) every race still in flight is cancelled.
///
/// # Errors
/// - [`DispatcherError::InvalidArgument`] if `deadline` is zero or a category
///   has no backends
#[instrument(
    name = "dispatch",
    skip_all,
    fields(
        query = %query,
        categories = categories.len(),
        deadline_ms = deadline.as_millis() as u64
    )
)]
pub async fn dispatch<B>(
    query: &Query,
    categories: &[Category<B>],
    deadline: Duration,
) -> Result<DispatchResult, DispatcherError>
where
    B: Backend + Send + Sync + 'static,
{
    let started = Instant::now();

    if deadline.is_zero() {
        return Err(DispatcherError::invalid_argument("deadline must be > 0"));
    }
    if let Some(empty) = categories.iter().find(|c| c.is_empty()) {
        return Err(DispatcherError::invalid_argument(format!(
            "category '{}' has no backends",
            empty.name()
        )));
    }
    if categories.is_empty() {
        return Ok(DispatchResult::empty(query.clone()));
    }

    let cancel = CancellationToken::new();
    let _abandon_guard = cancel.clone().drop_guard();

    let expected = categories.len();
    let (tx, mut rx) = mpsc::channel(expected);
    for (index, category) in categories.iter().enumerate() {
        category.spawn_race(index, query.clone(), cancel.clone(), tx.clone());
    }
    drop(tx);

    // A deadline past the clock's range never fires.
    let timer = match started.checked_add(deadline) {
        Some(at) => sleep_until(at),
        None => sleep(deadline),
    };
    tokio::pin!(timer);

    let mut results: Vec<CategoryResult> = Vec::with_capacity(expected);
    let mut reported = vec![false; expected];
    let mut open = true;
    let mut timed_out = false;

    while results.len() < expected {
        tokio::select! {
            biased;
            () = &mut timer => {
                timed_out = true;
                break;
            }
            hit = rx.recv(), if open => match hit {
                Some(CategoryHit { index, category, hit }) => {
                    if std::mem::replace(&mut reported[index], true) {
                        continue;
                    }
                    results.push(CategoryResult {
                        category,
                        backend: hit.backend,
                        result: hit.result,
                        arrived_after: started.elapsed(),
                    });
                }
                // Every worker is gone; nothing else can arrive before the deadline.
                None => open = false,
            },
        }
    }

    let missing: Vec<String> = categories
        .iter()
        .zip(&reported)
        .filter(|(_, reported)| !**reported)
        .map(|(category, _)| category.name().to_string())
        .collect();
    let elapsed = started.elapsed();

    if timed_out {
        warn!(
            collected = results.len(),
            expected,
            missing = ?missing,
            elapsed_ms = elapsed.as_millis() as u64,
            "Deadline elapsed, returning partial results"
        );
    } else {
        info!(
            collected = results.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "All categories reported"
        );
    }

    Ok(DispatchResult {
        query: query.clone(),
        results,
        missing,
        expected,
        elapsed,
        timed_out,
    })
}

/// Dispatcher configuration
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Category configurations
    pub categories: Vec<CategoryConfig>,
    /// Collection deadline
    pub deadline: Duration,
}

impl DispatcherConfig {
    pub fn from_blueprint(blueprint: &SearchBlueprint) -> Self {
        Self {
            categories: blueprint.categories.clone(),
            deadline: blueprint.dispatch.deadline(),
        }
    }
}

/// Builder for creating a Dispatcher of simulated backends
pub struct DispatcherBuilder {
    config: DispatcherConfig,
}

impl DispatcherBuilder {
    /// Create a new DispatcherBuilder
    pub fn new(config: DispatcherConfig) -> Self {
        Self { config }
    }

    /// Override the collection deadline
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.config.deadline = deadline;
        self
    }

    /// Build the dispatcher
    #[instrument(
        name = "dispatcher_builder_build",
        skip(self),
        fields(category_count = self.config.categories.len())
    )]
    pub fn build(self) -> Result<Dispatcher<SimulatedBackend>, DispatcherError> {
        let categories = self
            .config
            .categories
            .iter()
            .map(create_category)
            .collect();

        Dispatcher::with_categories(categories, self.config.deadline)
    }
}

/// Create a Category from configuration
fn create_category(config: &CategoryConfig) -> Category<SimulatedBackend> {
    Category::new(
        &config.name,
        config.backends.iter().map(SimulatedBackend::from_config),
    )
}

/// Holds the category set and deadline for repeated searches
pub struct Dispatcher<B> {
    categories: Vec<Category<B>>,
    deadline: Duration,
    metrics: DispatchMetrics,
}

impl<B> Dispatcher<B>
where
    B: Backend + Send + Sync + 'static,
{
    /// Create a dispatcher from explicit categories
    ///
    /// # Errors
    /// [`DispatcherError::InvalidArgument`] for a zero deadline or an empty category
    pub fn with_categories(
        categories: Vec<Category<B>>,
        deadline: Duration,
    ) -> Result<Self, DispatcherError> {
        if deadline.is_zero() {
            return Err(DispatcherError::invalid_argument("deadline must be > 0"));
        }
        if let Some(empty) = categories.iter().find(|c| c.is_empty()) {
            return Err(DispatcherError::invalid_argument(format!(
                "category '{}' has no backends",
                empty.name()
            )));
        }

        info!(
            categories = categories.len(),
            deadline_ms = deadline.as_millis() as u64,
            "Dispatcher ready"
        );

        Ok(Self {
            categories,
            deadline,
            metrics: DispatchMetrics::new(),
        })
    }

    pub fn categories(&self) -> &[Category<B>] {
        &self.categories
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Get current metrics
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Dispatch one query across every category
    pub async fn search(&self, query: impl Into<Query>) -> Result<DispatchResult, DispatcherError> {
        let query = query.into();
        let result = dispatch(&query, &self.categories, self.deadline).await?;
        self.metrics.record(&result);
        Ok(result)
    }
}

/// Convenience function to create a dispatcher from a blueprint
#[instrument(name = "dispatcher_create", skip(blueprint))]
pub fn create_dispatcher(
    blueprint: &SearchBlueprint,
) -> Result<Dispatcher<SimulatedBackend>, DispatcherError> {
    DispatcherBuilder::new(DispatcherConfig::from_blueprint(blueprint)).build()
}

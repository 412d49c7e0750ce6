//! Search session - runs the dispatcher one or more times for a query.

use std::time::Instant;

use anyhow::{Context, Result};
use contracts::{DispatchResult, Query, SearchBlueprint};
use dispatcher::{create_dispatcher, Backend, Dispatcher};
use observability::record_dispatch_metrics;
use tracing::{debug, info};

use super::SessionStats;

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub blueprint: SearchBlueprint,

    /// Query sent to every category
    pub query: Query,

    /// Number of dispatches, at least 1
    pub repeat: u32,
}

/// Runs repeated dispatches and aggregates their outcome
pub struct SearchSession<B> {
    dispatcher: Dispatcher<B>,
    query: Query,
    repeat: u32,
}

impl SearchSession<dispatcher::SimulatedBackend> {
    /// Build a session over simulated backends described by the blueprint
    pub fn new(config: SessionConfig) -> Result<Self> {
        let dispatcher =
            create_dispatcher(&config.blueprint).context("Failed to build dispatcher")?;
        Ok(Self::with_dispatcher(dispatcher, config.query, config.repeat))
    }
}

impl<B> SearchSession<B>
where
    B: Backend + Send + Sync + 'static,
{
    pub fn with_dispatcher(dispatcher: Dispatcher<B>, query: Query, repeat: u32) -> Self {
        Self {
            dispatcher,
            query,
            repeat: repeat.max(1),
        }
    }

    /// Run every dispatch, handing each result to `on_result` as it completes
    pub async fn run<F>(&self, mut on_result: F) -> Result<SessionStats>
    where
        F: FnMut(u32, &DispatchResult) -> Result<()>,
    {
        let start_time = Instant::now();
        let mut stats = SessionStats::new(self.dispatcher.categories().len());

        info!(
            query = %self.query,
            categories = self.dispatcher.categories().len(),
            deadline_ms = self.dispatcher.deadline().as_millis() as u64,
            repeat = self.repeat,
            "Starting search session"
        );

        for run in 1..=self.repeat {
            let result = self
                .dispatcher
                .search(self.query.clone())
                .await
                .context("Dispatch failed")?;

            record_dispatch_metrics(&result);
            stats.record(&result);
            debug!(run, results = result.len(), "Dispatch finished");

            on_result(run, &result)?;
        }

        stats.duration = start_time.elapsed();
        stats.dispatcher = self.dispatcher.metrics();
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{BackendConfig, CategoryConfig, LatencyRange};

    fn blueprint() -> SearchBlueprint {
        let mut blueprint = SearchBlueprint::default();
        blueprint.dispatch.deadline_ms = 50;
        blueprint.categories = vec![
            CategoryConfig {
                name: "web".into(),
                backends: vec![BackendConfig {
                    name: "web1".into(),
                    failure_rate: 0.0,
                    latency_ms: LatencyRange::fixed(10),
                }],
            },
            CategoryConfig {
                name: "image".into(),
                backends: vec![BackendConfig {
                    name: "image1".into(),
                    failure_rate: 0.0,
                    latency_ms: LatencyRange::fixed(200),
                }],
            },
        ];
        blueprint
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_runs_repeat_times() {
        let session = SearchSession::new(SessionConfig {
            blueprint: blueprint(),
            query: Query::from("golang"),
            repeat: 3,
        })
        .unwrap();

        let mut seen = Vec::new();
        let stats = session
            .run(|run, result| {
                seen.push((run, result.len()));
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(seen, vec![(1, 1), (2, 1), (3, 1)]);
        assert_eq!(stats.dispatcher.dispatch_count, 3);
        assert_eq!(stats.dispatcher.partial_count, 3);

        let summary = stats.aggregator.summary();
        assert_eq!(summary.wins["web"]["web1"], 3);
        assert_eq!(summary.missing_counts["image"], 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_callback_error_stops_session() {
        let session = SearchSession::new(SessionConfig {
            blueprint: blueprint(),
            query: Query::from("q"),
            repeat: 5,
        })
        .unwrap();

        let mut calls = 0;
        let result = session
            .run(|_, _| {
                calls += 1;
                anyhow::bail!("stdout closed")
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}

//! Replicator - races one category's backends and keeps the first success

use std::sync::Arc;

use contracts::{Backend, Query, SearchHit};
use metrics::{counter, histogram};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::error::DispatcherError;

/// Race `backends` on `query` and return the first successful answer.
///
/// Every backend runs in its own task. Successes are handed off with
/// `try_send` on a channel sized to the number of backends, so a producer
/// never blocks even after the race is decided. The losers are cancelled as
/// soon as the winner is read, or when this future is dropped.
///
/// Backend failures are absorbed. If every backend fails the call does not
/// return a result: it waits for `cancel` and then returns
/// [`DispatcherError::Cancelled`]. With a token that is never cancelled it
/// waits forever, so callers that need a bound must cancel the token.
///
/// # Errors
/// - [`DispatcherError::InvalidArgument`] if `backends` is empty
/// - [`DispatcherError::Cancelled`] if `cancel` fires before any success
#[instrument(
    name = "replicate",
    skip_all,
    fields(query = %query, backends = backends.len())
)]
pub async fn replicate<B>(
    query: &Query,
    backends: &[Arc<B>],
    cancel: &CancellationToken,
) -> Result<SearchHit, DispatcherError>
where
    B: Backend + Send + Sync + 'static,
{
    if backends.is_empty() {
        return Err(DispatcherError::invalid_argument(
            "replicate requires at least one backend",
        ));
    }

    let race = cancel.child_token();
    let _race_guard = race.clone().drop_guard();

    let (tx, mut rx) = mpsc::channel(backends.len());
    let started = Instant::now();

    for backend in backends {
        tokio::spawn(invoke(
            Arc::clone(backend),
            query.clone(),
            race.clone(),
            tx.clone(),
            started,
        ));
    }
    drop(tx);

    let winner = tokio::select! {
        biased;
        _ = race.cancelled() => None,
        hit = rx.recv() => hit,
    };

    match winner {
        Some(hit) => {
            histogram!(
                "hedge_search_race_latency_ms",
                "backend" => hit.backend.clone()
            )
            .record(hit.latency.as_secs_f64() * 1000.0);
            debug!(
                backend = %hit.backend,
                latency_ms = hit.latency.as_millis() as u64,
                "race won"
            );
            Ok(hit)
        }
        None => {
            if !race.is_cancelled() {
                warn!("all backends failed, waiting for cancellation");
                race.cancelled().await;
            }
            Err(DispatcherError::Cancelled)
        }
    }
}

/// One backend invocation inside a race
async fn invoke<B>(
    backend: Arc<B>,
    query: Query,
    race: CancellationToken,
    tx: mpsc::Sender<SearchHit>,
    started: Instant,
) where
    B: Backend + Send + Sync,
{
    let outcome = tokio::select! {
        biased;
        _ = race.cancelled() => {
            debug!(backend = backend.name(), "race decided, invocation cancelled");
            return;
        }
        outcome = backend.search(&query) => outcome,
    };

    match outcome {
        Ok(result) => {
            let latency = started.elapsed();
            // Every success, winners and discarded losers alike.
            histogram!(
                "hedge_search_backend_latency_ms",
                "backend" => backend.name().to_string()
            )
            .record(latency.as_secs_f64() * 1000.0);

            let hit = SearchHit {
                backend: backend.name().to_string(),
                result,
                latency,
            };
            // Single-winner race: only the first send is ever read.
            if tx.try_send(hit).is_err() {
                debug!(backend = backend.name(), "race already decided, result discarded");
            }
        }
        Err(failure) => {
            counter!(
                "hedge_search_backend_failures_total",
                "backend" => backend.name().to_string()
            )
            .increment(1);
            debug!(error = %failure, "backend failed, dropped from race");
        }
    }
}

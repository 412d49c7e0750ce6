//! Category - a named set of interchangeable backends and its race worker

use std::fmt;
use std::sync::Arc;

use contracts::{Backend, Query, SearchHit};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::error::DispatcherError;
use crate::replicator::replicate;

/// A named set of backends considered interchangeable
///
/// Only the fastest success of a category counts toward a dispatch.
pub struct Category<B> {
    name: String,
    backends: Vec<Arc<B>>,
}

impl<B> Category<B> {
    /// Create a category that owns its backends
    pub fn new(name: impl Into<String>, backends: impl IntoIterator<Item = B>) -> Self {
        Self {
            name: name.into(),
            backends: backends.into_iter().map(Arc::new).collect(),
        }
    }

    /// Create a category from backends that are shared elsewhere
    pub fn from_shared(name: impl Into<String>, backends: Vec<Arc<B>>) -> Self {
        Self {
            name: name.into(),
            backends,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn backends(&self) -> &[Arc<B>] {
        &self.backends
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

impl<B> Clone for Category<B> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            backends: self.backends.clone(),
        }
    }
}

impl<B> fmt::Debug for Category<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Category")
            .field("name", &self.name)
            .field("backends", &self.backends.len())
            .finish()
    }
}

/// Race winner tagged with its category, as delivered to the collector
#[derive(Debug)]
pub(crate) struct CategoryHit {
    /// Position of the category in the dispatched slice; names need not be unique
    pub index: usize,
    pub category: String,
    pub hit: SearchHit,
}

impl<B> Category<B>
where
    B: Backend + Send + Sync + 'static,
{
    /// Spawn this category's race as a background task
    ///
    /// The winner is delivered with `try_send`; the collector sizes `tx` to the
    /// number of categories, so the worker exits cleanly even when nobody is
    /// listening any more.
    pub(crate) fn spawn_race(
        &self,
        index: usize,
        query: Query,
        cancel: CancellationToken,
        tx: mpsc::Sender<CategoryHit>,
    ) -> JoinHandle<()> {
        let category = self.clone();
        tokio::spawn(async move {
            category_worker(index, category, query, cancel, tx).await;
        })
    }
}

#[instrument(
    name = "category_worker",
    skip(category, query, cancel, tx),
    fields(category = %category.name)
)]
async fn category_worker<B>(
    index: usize,
    category: Category<B>,
    query: Query,
    cancel: CancellationToken,
    tx: mpsc::Sender<CategoryHit>,
) where
    B: Backend + Send + Sync + 'static,
{
    match replicate(&query, &category.backends, &cancel).await {
        Ok(hit) => {
            let delivered = tx.try_send(CategoryHit {
                index,
                category: category.name.clone(),
                hit,
            });
            if delivered.is_err() {
                debug!(category = %category.name, "collector gone, category result dropped");
            }
        }
        Err(DispatcherError::Cancelled) => {
            debug!(category = %category.name, "category abandoned");
        }
        Err(e) => {
            warn!(category = %category.name, error = %e, "category race failed");
        }
    }
}

//! DispatchResult - Dispatcher output
//!
//! Race winners and the ordered, possibly partial, per-category result list.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::Query;

/// Opaque value produced by a backend; immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchResult(String);

impl SearchResult {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Winner of a single replicated race
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Name of the backend that answered first
    pub backend: String,

    /// The backend's output, verbatim
    pub result: SearchResult,

    /// Time from race start to the winning completion
    pub latency: Duration,
}

/// One category's contribution to a dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryResult {
    /// Category name
    pub category: String,

    /// Winning backend within the category
    pub backend: String,

    /// The winning result
    pub result: SearchResult,

    /// Offset from dispatch entry to arrival at the collector
    pub arrived_after: Duration,
}

/// Dispatcher output
///
/// `results` is ordered by arrival, never by category order. Categories that
/// lost the race against the deadline and categories whose backends all failed
/// both end up in `missing`; the two cases are not distinguished.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchResult {
    /// Query that was dispatched
    pub query: Query,

    /// Per-category winners in completion order (at most one per category)
    pub results: Vec<CategoryResult>,

    /// Categories that did not report before the collection loop stopped
    pub missing: Vec<String>,

    /// Number of categories that were dispatched
    pub expected: usize,

    /// Wall-clock time spent inside the dispatch call
    pub elapsed: Duration,

    /// Whether the deadline ended collection
    pub timed_out: bool,
}

impl DispatchResult {
    /// Result for a dispatch over zero categories
    pub fn empty(query: Query) -> Self {
        Self {
            query,
            results: Vec::new(),
            missing: Vec::new(),
            expected: 0,
            elapsed: Duration::ZERO,
            timed_out: false,
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Fewer results than categories (degraded success, not an error)
    pub fn is_partial(&self) -> bool {
        self.results.len() < self.expected
    }

    /// Result values in arrival order
    pub fn values(&self) -> impl Iterator<Item = &SearchResult> {
        self.results.iter().map(|r| &r.result)
    }

    /// Winner for a category, if it reported in time
    pub fn get(&self, category: &str) -> Option<&CategoryResult> {
        self.results.iter().find(|r| r.category == category)
    }
}

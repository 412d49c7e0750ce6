//! Backend trait - one logical lookup raced by the replicator
//!
//! Defines the abstract interface for search backends.

use crate::{BackendFailure, Query, SearchResult};

/// Search backend trait
///
/// All backend implementations must implement this trait. Implementations are
/// invoked concurrently from many tasks and must not share mutable state
/// between invocations.
#[trait_variant::make(Backend: Send)]
pub trait LocalBackend {
    /// Backend name (used for logging/metrics and to attribute a winning result)
    fn name(&self) -> &str;

    /// Run one lookup
    ///
    /// Produces exactly one result or one failure. The future may be dropped
    /// at any await point when the race it belongs to is over.
    ///
    /// # Errors
    /// Returns a terminal [`BackendFailure`]; the caller never retries.
    async fn search(&self, query: &Query) -> Result<SearchResult, BackendFailure>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl Backend for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        async fn search(&self, query: &Query) -> Result<SearchResult, BackendFailure> {
            Ok(SearchResult::new(format!("echo: {query}")))
        }
    }

    fn assert_send<T: Send>(_: &T) {}

    #[tokio::test]
    async fn test_backend_future_is_send() {
        let backend = Echo;
        let query = Query::from("ping");
        let fut = Backend::search(&backend, &query);
        assert_send(&fut);
        assert_eq!(fut.await.unwrap().as_str(), "echo: ping");
    }
}

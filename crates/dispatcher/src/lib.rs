//! # Dispatcher
//!
//! Hedged search core.
//!
//! Responsibilities:
//! - Race the interchangeable backends of a category, keep the first success
//! - Fan a query out to every category and fan results back in
//! - Bound collection by a deadline, return partial results on timeout
//! - Cancel every in-flight call once its answer is no longer wanted

pub mod backends;
pub mod category;
pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod replicator;

pub use backends::SimulatedBackend;
pub use category::Category;
pub use contracts::{Backend, DispatchResult, Query};
pub use dispatcher::{Dispatcher, DispatcherBuilder, DispatcherConfig, create_dispatcher, dispatch};
pub use error::DispatcherError;
pub use metrics::{DispatchMetrics, MetricsSnapshot};
pub use replicator::replicate;

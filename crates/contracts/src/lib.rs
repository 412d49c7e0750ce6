//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Latencies are wall-clock `Duration`s measured on the tokio clock
//! - Arrival offsets are measured from entry into a dispatch call

mod backend;
mod blueprint;
mod dispatch;
mod error;
mod query;

pub use backend::*;
pub use blueprint::*;
pub use dispatch::*;
pub use error::*;
pub use query::Query;

//! Search session module.

mod runner;
mod stats;

pub use runner::{SearchSession, SessionConfig};
pub use stats::SessionStats;

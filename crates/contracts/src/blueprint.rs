//! SearchBlueprint - Config Loader output
//!
//! Describes the full search topology: dispatch deadline, categories, and the
//! interchangeable backends inside each category.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete search blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchBlueprint {
    /// Config version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Dispatcher settings
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Categories raced in parallel for every query
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
}

impl SearchBlueprint {
    /// Total number of backends across all categories
    pub fn backend_count(&self) -> usize {
        self.categories.iter().map(|c| c.backends.len()).sum()
    }
}

impl Default for SearchBlueprint {
    /// Web, image and video categories with two simulated backends each,
    /// answering within 0-100ms, collected under a 60ms deadline.
    fn default() -> Self {
        let categories = ["web", "image", "video"]
            .into_iter()
            .map(|kind| CategoryConfig {
                name: kind.to_string(),
                backends: (1..=2)
                    .map(|i| BackendConfig {
                        name: format!("{kind}{i}"),
                        failure_rate: 0.0,
                        latency_ms: LatencyRange::default(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            version: ConfigVersion::V1,
            dispatch: DispatchConfig::default(),
            categories,
        }
    }
}

/// Dispatcher settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Collection deadline in milliseconds, must be > 0
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,
}

impl DispatchConfig {
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            deadline_ms: default_deadline_ms(),
        }
    }
}

fn default_deadline_ms() -> u64 {
    60
}

/// A named set of interchangeable backends
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// Unique category name
    pub name: String,

    /// Backends raced against each other, at least one
    #[serde(default)]
    pub backends: Vec<BackendConfig>,
}

/// Simulated backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Globally unique backend name
    pub name: String,

    /// Probability in [0, 1] that a call fails instead of answering
    #[serde(default)]
    pub failure_rate: f64,

    /// Latency window the backend samples from on every call
    #[serde(default)]
    pub latency_ms: LatencyRange,
}

/// Inclusive latency window in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyRange {
    pub min: u64,
    pub max: u64,
}

impl LatencyRange {
    /// Window with min == max
    pub fn fixed(ms: u64) -> Self {
        Self { min: ms, max: ms }
    }
}

impl Default for LatencyRange {
    fn default() -> Self {
        Self { min: 0, max: 100 }
    }
}

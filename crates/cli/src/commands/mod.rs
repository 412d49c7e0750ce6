//! Command implementations.

mod info;
mod search;
mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use contracts::SearchBlueprint;
use tracing::info;

pub use info::run_info;
pub use search::run_search;
pub use validate::run_validate;

/// Load a blueprint from `path`, or fall back to the built-in demo topology
fn load_blueprint(path: Option<&Path>) -> Result<SearchBlueprint> {
    let Some(path) = path else {
        info!("No configuration file given, using built-in web/image/video topology");
        return Ok(SearchBlueprint::default());
    };

    if !path.exists() {
        anyhow::bail!("Configuration file not found: {}", path.display());
    }

    config_loader::ConfigLoader::load_from_path(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &SearchBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.categories.is_empty() {
        warnings.push("No categories configured - every search returns no results".to_string());
    }

    for category in &blueprint.categories {
        if category.backends.len() == 1 {
            warnings.push(format!(
                "Category '{}' has a single backend - nothing to hedge against",
                category.name
            ));
        }

        let deadline = blueprint.dispatch.deadline_ms;
        if category
            .backends
            .iter()
            .all(|b| b.latency_ms.min >= deadline)
        {
            warnings.push(format!(
                "Category '{}' cannot answer within the {}ms deadline",
                category.name, deadline
            ));
        }

        for backend in &category.backends {
            if backend.failure_rate >= 1.0 {
                warnings.push(format!("Backend '{}' always fails", backend.name));
            }
        }
    }

    warnings
}

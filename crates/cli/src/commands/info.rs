//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::SearchBlueprint;
use serde::Serialize;
use tracing::info;

use super::load_blueprint;
use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    deadline_ms: u64,
    categories: Vec<CategoryInfo>,
}

#[derive(Serialize)]
struct CategoryInfo {
    name: String,
    backend_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    backends: Vec<BackendInfo>,
}

#[derive(Serialize)]
struct BackendInfo {
    name: String,
    latency_min_ms: u64,
    latency_max_ms: u64,
    failure_rate: f64,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = ?args.config, "Loading configuration info");

    let blueprint = load_blueprint(args.config.as_deref())?;

    if args.json {
        let info = build_config_info(&blueprint, args.backends);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args.backends);
    }

    Ok(())
}

fn build_config_info(blueprint: &SearchBlueprint, with_backends: bool) -> ConfigInfo {
    let categories = blueprint
        .categories
        .iter()
        .map(|c| CategoryInfo {
            name: c.name.clone(),
            backend_count: c.backends.len(),
            backends: if with_backends {
                c.backends
                    .iter()
                    .map(|b| BackendInfo {
                        name: b.name.clone(),
                        latency_min_ms: b.latency_ms.min,
                        latency_max_ms: b.latency_ms.max,
                        failure_rate: b.failure_rate,
                    })
                    .collect()
            } else {
                Vec::new()
            },
        })
        .collect();

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        deadline_ms: blueprint.dispatch.deadline_ms,
        categories,
    }
}

fn print_config_info(blueprint: &SearchBlueprint, with_backends: bool) {
    println!("=== Hedge Search Configuration ===\n");
    println!("Version: {:?}", blueprint.version);
    println!("Deadline: {}ms", blueprint.dispatch.deadline_ms);

    println!("\nCategories ({})", blueprint.categories.len());
    for (i, category) in blueprint.categories.iter().enumerate() {
        let is_last = i == blueprint.categories.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child_prefix = if is_last { "   " } else { "│  " };

        println!("   {} {}", prefix, category.name);

        if with_backends {
            for (j, backend) in category.backends.iter().enumerate() {
                let backend_prefix = if j == category.backends.len() - 1 {
                    "└─"
                } else {
                    "├─"
                };
                println!(
                    "   {}  {} {} ({}-{}ms, failure rate {:.2})",
                    child_prefix,
                    backend_prefix,
                    backend.name,
                    backend.latency_ms.min,
                    backend.latency_ms.max,
                    backend.failure_rate
                );
            }
        } else {
            println!("   {}  └─ {} backends", child_prefix, category.backends.len());
        }
    }

    println!();
}

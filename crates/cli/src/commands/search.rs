//! `search` command implementation.

use anyhow::{Context, Result};
use contracts::{DispatchResult, Query};
use serde::Serialize;
use tracing::{info, warn};

use super::load_blueprint;
use crate::cli::SearchArgs;
use crate::session::{SearchSession, SessionConfig};

/// One dispatch, as printed with `--json`
#[derive(Serialize)]
struct SearchOutput<'a> {
    run: u32,
    query: &'a str,
    results: Vec<HitOutput<'a>>,
    missing: &'a [String],
    timed_out: bool,
    elapsed_ms: f64,
}

#[derive(Serialize)]
struct HitOutput<'a> {
    category: &'a str,
    backend: &'a str,
    result: &'a str,
    arrived_after_ms: f64,
}

/// Execute the `search` command
pub async fn run_search(args: &SearchArgs) -> Result<()> {
    let mut blueprint = load_blueprint(args.config.as_deref())?;

    if let Some(deadline_ms) = args.deadline_ms {
        info!(deadline_ms, "Overriding deadline from CLI");
        blueprint.dispatch.deadline_ms = deadline_ms;
        config_loader::ConfigLoader::validate(&blueprint)
            .context("Invalid --deadline-ms override")?;
    }

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
        info!("Metrics endpoint available on port {}", args.metrics_port);
    }

    info!(
        categories = blueprint.categories.len(),
        backends = blueprint.backend_count(),
        deadline_ms = blueprint.dispatch.deadline_ms,
        "Configuration loaded"
    );

    let session = SearchSession::new(SessionConfig {
        blueprint,
        query: Query::new(args.query.as_str()),
        repeat: args.repeat,
    })?;

    let json = args.json;
    let shutdown_signal = setup_shutdown_signal();

    tokio::select! {
        result = session.run(|run, result| print_result(run, result, json)) => {
            let stats = result.context("Search failed")?;
            info!(
                dispatches = stats.dispatcher.dispatch_count,
                partial = stats.dispatcher.partial_count,
                duration_secs = stats.duration.as_secs_f64(),
                "Search session completed"
            );

            if args.repeat > 1 && !json {
                stats.print_summary();
            }
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, abandoning in-flight searches...");
        }
    }

    Ok(())
}

fn print_result(run: u32, result: &DispatchResult, json: bool) -> Result<()> {
    if json {
        let output = SearchOutput {
            run,
            query: result.query.as_str(),
            results: result
                .results
                .iter()
                .map(|r| HitOutput {
                    category: &r.category,
                    backend: &r.backend,
                    result: r.result.as_str(),
                    arrived_after_ms: r.arrived_after.as_secs_f64() * 1000.0,
                })
                .collect(),
            missing: &result.missing,
            timed_out: result.timed_out,
            elapsed_ms: result.elapsed.as_secs_f64() * 1000.0,
        };
        let line = serde_json::to_string(&output).context("Failed to serialize search result")?;
        println!("{}", line);
        return Ok(());
    }

    println!("{}", format_result(result));
    Ok(())
}

/// Render results in arrival order, followed by the elapsed time
fn format_result(result: &DispatchResult) -> String {
    let mut lines: Vec<String> = result.values().map(|r| r.to_string()).collect();
    if result.timed_out {
        lines.push(format!("timed out, missing: {}", result.missing.join(", ")));
    }
    lines.push(format!("{:?}", result.elapsed));
    lines.join("\n")
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

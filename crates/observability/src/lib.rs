//! # Observability
//!
//! Tracing and Prometheus metrics for hedged search.
//!
//! ## Features
//!
//! - Tracing initialization (JSON/Pretty/Compact)
//! - Prometheus metrics export
//! - Dispatch metrics recording and aggregate statistics
//!
//! ## Example
//!
//! ```ignore
//! use observability::{init_with_config, metrics, LogFormat, ObservabilityConfig};
//!
//! init_with_config(ObservabilityConfig::from_verbosity(1, false, LogFormat::Json))?;
//!
//! let result = dispatcher.search("golang").await?;
//! metrics::record_dispatch_metrics(&result);
//! ```

pub mod metrics;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub use crate::metrics::{
    record_dispatch_metrics, DispatchStatsAggregator, DispatchSummary, RunningStats, StatsSummary,
};

/// Observability configuration
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub log_format: LogFormat,
    /// Prometheus port (None = disabled)
    pub metrics_port: Option<u16>,
    /// Log level when RUST_LOG is unset
    pub default_log_level: String,
    /// Log level that wins over RUST_LOG
    pub forced_log_level: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            metrics_port: None,
            default_log_level: "info".to_string(),
            forced_log_level: None,
        }
    }
}

impl ObservabilityConfig {
    /// Map `-v` counts and `-q` onto log levels
    ///
    /// Quiet pins the level to `warn`; otherwise 0/1/2+ map to
    /// info/debug/trace unless RUST_LOG says otherwise.
    pub fn from_verbosity(verbose: u8, quiet: bool, log_format: LogFormat) -> Self {
        let default_log_level = match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };

        Self {
            log_format,
            default_log_level: default_log_level.to_string(),
            forced_log_level: quiet.then(|| "warn".to_string()),
            ..Self::default()
        }
    }

    fn env_filter(&self) -> EnvFilter {
        match &self.forced_log_level {
            Some(level) => EnvFilter::new(level),
            None => EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&self.default_log_level)),
        }
    }
}

/// Log format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON structured logs
    Json,
    /// Human readable, multi-line
    #[default]
    Pretty,
    /// Single line
    Compact,
}

/// Initialize tracing, and Prometheus when a port is configured
///
/// Logs go to stderr so stdout stays free for command output.
pub fn init_with_config(config: ObservabilityConfig) -> Result<()> {
    let fmt_layer = match config.log_format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer().pretty().with_writer(std::io::stderr).boxed(),
        LogFormat::Compact => fmt::layer().compact().with_writer(std::io::stderr).boxed(),
    };

    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    if let Some(port) = config.metrics_port {
        init_metrics_only(port)?;
    }

    tracing::debug!(
        log_format = ?config.log_format,
        metrics_port = ?config.metrics_port,
        "Observability initialized"
    );

    Ok(())
}

/// Initialize only the Prometheus exporter
///
/// For when tracing is already set up elsewhere.
pub fn init_metrics_only(port: u16) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .context("Failed to install Prometheus recorder")?;

    tracing::info!(port = port, "Prometheus metrics endpoint initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ObservabilityConfig::default();
        assert_eq!(config.metrics_port, None);
        assert_eq!(config.default_log_level, "info");
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_verbosity_levels() {
        let levels: Vec<_> = (0..=3)
            .map(|v| ObservabilityConfig::from_verbosity(v, false, LogFormat::Json))
            .map(|c| c.default_log_level)
            .collect();
        assert_eq!(levels, vec!["info", "debug", "trace", "trace"]);
    }

    #[test]
    fn test_quiet_overrides_env() {
        let config = ObservabilityConfig::from_verbosity(0, true, LogFormat::Compact);
        assert_eq!(config.forced_log_level.as_deref(), Some("warn"));
        assert_eq!(config.env_filter().to_string(), "warn");
        assert_eq!(config.log_format, LogFormat::Compact);
    }
}

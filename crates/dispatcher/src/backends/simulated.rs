//! SimulatedBackend - sleeps a random latency, then answers or fails

use std::time::Duration;

use contracts::{Backend, BackendConfig, BackendFailure, LatencyRange, Query, SearchResult};
use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, instrument};

/// Backend that simulates a remote lookup
///
/// Each call samples a latency from an inclusive millisecond window, sleeps
/// for it, then either fails (with probability `failure_rate`) or answers
/// `<name> result for "<query>"`. Stateless across calls.
#[derive(Debug, Clone)]
pub struct SimulatedBackend {
    name: String,
    latency: LatencyRange,
    failure_rate: f64,
}

impl SimulatedBackend {
    /// Create a backend; an inverted window is swapped and the failure rate
    /// is clamped to [0, 1].
    pub fn new(name: impl Into<String>, latency: LatencyRange, failure_rate: f64) -> Self {
        let latency = LatencyRange {
            min: latency.min.min(latency.max),
            max: latency.min.max(latency.max),
        };
        let failure_rate = if failure_rate.is_nan() {
            0.0
        } else {
            failure_rate.clamp(0.0, 1.0)
        };

        Self {
            name: name.into(),
            latency,
            failure_rate,
        }
    }

    /// Create from a config entry
    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(&config.name, config.latency_ms, config.failure_rate)
    }

    /// Always answers after exactly `latency`
    pub fn fixed(name: impl Into<String>, latency: Duration) -> Self {
        Self::new(name, LatencyRange::fixed(latency.as_millis() as u64), 0.0)
    }

    /// Always fails after exactly `latency`
    pub fn failing(name: impl Into<String>, latency: Duration) -> Self {
        Self::new(name, LatencyRange::fixed(latency.as_millis() as u64), 1.0)
    }

    pub fn latency(&self) -> LatencyRange {
        self.latency
    }

    pub fn failure_rate(&self) -> f64 {
        self.failure_rate
    }

    /// Draw the latency and failure outcome for one call
    fn sample(&self) -> (Duration, bool) {
        let mut rng = rand::rng();
        let delay_ms = rng.random_range(self.latency.min..=self.latency.max);
        let fail = self.failure_rate > 0.0 && rng.random_bool(self.failure_rate);
        (Duration::from_millis(delay_ms), fail)
    }
}

impl Backend for SimulatedBackend {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "simulated_backend_search",
        skip(self, query),
        fields(backend = %self.name)
    )]
    async fn search(&self, query: &Query) -> Result<SearchResult, BackendFailure> {
        let (delay, fail) = self.sample();
        sleep(delay).await;

        if fail {
            debug!(delay_ms = delay.as_millis() as u64, "simulated failure");
            return Err(BackendFailure::new(&self.name, "simulated failure"));
        }

        Ok(SearchResult::new(format!(
            "{} result for {:?}",
            self.name,
            query.as_str()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_fixed_backend_answers_after_latency() {
        let backend = SimulatedBackend::fixed("web1", Duration::from_millis(25));
        let start = Instant::now();

        let result = backend.search(&Query::from("golang")).await.unwrap();

        assert_eq!(result.as_str(), "web1 result for \"golang\"");
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(25), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(30), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_backend() {
        let backend = SimulatedBackend::failing("web2", Duration::from_millis(5));
        let err = backend.search(&Query::from("golang")).await.unwrap_err();
        assert_eq!(err.backend, "web2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_stays_within_window() {
        let backend = SimulatedBackend::new("video1", LatencyRange { min: 10, max: 30 }, 0.0);
        for _ in 0..20 {
            let start = Instant::now();
            backend.search(&Query::from("q")).await.unwrap();
            let elapsed = start.elapsed();
            assert!(elapsed >= Duration::from_millis(10), "{elapsed:?}");
            assert!(elapsed <= Duration::from_millis(31), "{elapsed:?}");
        }
    }

    #[test]
    fn test_new_normalizes_inputs() {
        let backend = SimulatedBackend::new("x", LatencyRange { min: 50, max: 5 }, 3.0);
        assert_eq!(backend.latency(), LatencyRange { min: 5, max: 50 });
        assert_eq!(backend.failure_rate(), 1.0);

        let backend = SimulatedBackend::new("y", LatencyRange::fixed(1), f64::NAN);
        assert_eq!(backend.failure_rate(), 0.0);
    }

    #[test]
    fn test_from_config() {
        let config = BackendConfig {
            name: "image1".into(),
            failure_rate: 0.1,
            latency_ms: LatencyRange { min: 0, max: 100 },
        };
        let backend = SimulatedBackend::from_config(&config);
        assert_eq!(backend.name(), "image1");
        assert_eq!(backend.failure_rate(), 0.1);
    }
}

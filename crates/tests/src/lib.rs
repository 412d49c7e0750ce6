//! # Integration Tests
//!
//! Cross-crate and end-to-end tests.
//!
//! Covers:
//! - Contract smoke tests
//! - Config text -> loader -> dispatcher -> dispatch
//! - The deadline and hedging scenarios on a paused clock

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
    }

    #[test]
    fn test_default_blueprint_passes_validation() {
        let blueprint = contracts::SearchBlueprint::default();
        config_loader::ConfigLoader::validate(&blueprint).unwrap();
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use config_loader::ConfigLoader;
    use contracts::{BackendFailure, SearchResult};
    use dispatcher::{
        create_dispatcher, dispatch, replicate, Backend, Category, DispatcherError, Query,
        SimulatedBackend,
    };
    use observability::DispatchStatsAggregator;
    use tokio::time::{sleep, Instant};
    use tokio_util::sync::CancellationToken;

    const CONFIG: &str = r#"
[dispatch]
deadline_ms = 60

[[categories]]
name = "web"
[[categories.backends]]
name = "web1"
latency_ms = { min = 10, max = 10 }
[[categories.backends]]
name = "web2"
latency_ms = { min = 200, max = 200 }

[[categories]]
name = "image"
[[categories.backends]]
name = "image1"
latency_ms = { min = 90, max = 90 }
[[categories.backends]]
name = "image2"
latency_ms = { min = 20, max = 20 }

[[categories]]
name = "video"
[[categories.backends]]
name = "video1"
latency_ms = { min = 100, max = 150 }
[[categories.backends]]
name = "video2"
latency_ms = { min = 5, max = 5 }
failure_rate = 1.0
"#;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    /// Backend that records how many invocations ran to completion
    struct TrackedBackend {
        name: String,
        delay: Duration,
        completed: Arc<AtomicU64>,
    }

    impl Backend for TrackedBackend {
        fn name(&self) -> &str {
            &self.name
        }

        async fn search(&self, query: &Query) -> Result<SearchResult, BackendFailure> {
            sleep(self.delay).await;
            self.completed.fetch_add(1, Ordering::SeqCst);
            Ok(SearchResult::new(format!("{} result for {:?}", self.name, query.as_str())))
        }
    }

    /// End-to-end: TOML -> ConfigLoader -> create_dispatcher -> search
    #[tokio::test(start_paused = true)]
    async fn test_e2e_config_to_dispatch() {
        let blueprint = ConfigLoader::load_from_str(CONFIG, config_loader::ConfigFormat::Toml)
            .expect("config should load");
        let dispatcher = create_dispatcher(&blueprint).unwrap();

        let result = dispatcher.search("golang").await.unwrap();

        // web answers at 10ms, image at 20ms; video's only success takes >= 100ms
        let order: Vec<_> = result.results.iter().map(|r| r.backend.as_str()).collect();
        assert_eq!(order, vec!["web1", "image2"]);
        assert_eq!(result.missing, vec!["video".to_string()]);
        assert!(result.timed_out);
        assert!(result.elapsed >= ms(60));
        assert_eq!(
            result.get("web").unwrap().result.as_str(),
            "web1 result for \"golang\""
        );

        let snapshot = dispatcher.metrics();
        assert_eq!(snapshot.dispatch_count, 1);
        assert_eq!(snapshot.missing_count, 1);
    }

    /// Scenario A: the fast replica's answer arrives after roughly its latency
    #[tokio::test(start_paused = true)]
    async fn test_scenario_fast_replica_wins() {
        let categories = vec![Category::new(
            "web",
            [
                SimulatedBackend::fixed("fast", ms(10)),
                SimulatedBackend::fixed("slow", ms(200)),
            ],
        )];

        let result = dispatch(&Query::from("golang"), &categories, ms(60))
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result.results[0].backend, "fast");
        assert!(result.elapsed >= ms(10) && result.elapsed < ms(20));
    }

    /// Scenario B: a category slower than the deadline is absent
    #[tokio::test(start_paused = true)]
    async fn test_scenario_slow_category_absent() {
        let categories = vec![
            Category::new("web", [SimulatedBackend::fixed("web1", ms(15))]),
            Category::new(
                "image",
                [
                    SimulatedBackend::fixed("image1", ms(70)),
                    SimulatedBackend::fixed("image2", ms(80)),
                ],
            ),
        ];

        let result = dispatch(&Query::from("q"), &categories, ms(60))
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert!(result.get("image").is_none());
        assert!(result.len() <= categories.len());
    }

    /// Scenario C: zero deadline is rejected
    #[tokio::test]
    async fn test_scenario_zero_deadline_rejected() {
        let categories = vec![Category::new("web", [SimulatedBackend::fixed("web1", ms(1))])];
        let err = dispatch(&Query::from("q"), &categories, Duration::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, DispatcherError::InvalidArgument { .. }));
    }

    /// Scenario D: every backend fails, the empty result comes only at the deadline
    #[tokio::test(start_paused = true)]
    async fn test_scenario_all_backends_fail() {
        let categories = vec![
            Category::new(
                "web",
                [
                    SimulatedBackend::failing("web1", ms(1)),
                    SimulatedBackend::failing("web2", ms(2)),
                ],
            ),
            Category::new("image", [SimulatedBackend::failing("image1", ms(3))]),
        ];
        let start = Instant::now();

        let result = dispatch(&Query::from("q"), &categories, ms(60))
            .await
            .unwrap();

        assert!(result.is_empty());
        assert!(start.elapsed() >= ms(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shape_is_stable_across_runs() {
        let blueprint = ConfigLoader::load_from_str(CONFIG, config_loader::ConfigFormat::Toml)
            .unwrap();
        let dispatcher = create_dispatcher(&blueprint).unwrap();
        let mut aggregator = DispatchStatsAggregator::new();

        for _ in 0..5 {
            let result = dispatcher.search("golang").await.unwrap();
            assert_eq!(result.len(), 2);
            aggregator.update(&result);
        }

        let summary = aggregator.summary();
        assert_eq!(summary.total_dispatches, 5);
        assert_eq!(summary.wins["web"]["web1"], 5);
        assert_eq!(summary.missing_counts["video"], 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_work_survives_the_dispatch() {
        let completed = Arc::new(AtomicU64::new(0));
        let tracked = |name: &str, delay: u64| TrackedBackend {
            name: name.to_string(),
            delay: ms(delay),
            completed: Arc::clone(&completed),
        };
        let categories = vec![
            Category::new("web", [tracked("web1", 10), tracked("web2", 300)]),
            Category::new("image", [tracked("image1", 400), tracked("image2", 500)]),
        ];

        let result = dispatch(&Query::from("q"), &categories, ms(60))
            .await
            .unwrap();
        assert_eq!(result.len(), 1);

        sleep(ms(2000)).await;
        assert_eq!(completed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_dispatch_cancels_backends() {
        let completed = Arc::new(AtomicU64::new(0));
        let categories = vec![Category::new(
            "web",
            [TrackedBackend {
                name: "web1".into(),
                delay: ms(100),
                completed: Arc::clone(&completed),
            }],
        )];

        let query = Query::from("q");
        let outcome = tokio::time::timeout(ms(20), dispatch(&query, &categories, ms(500))).await;
        assert!(outcome.is_err());

        sleep(ms(1000)).await;
        assert_eq!(completed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replicate_directly_with_shared_backends() {
        let backends = vec![
            Arc::new(SimulatedBackend::fixed("a", ms(40))),
            Arc::new(SimulatedBackend::fixed("b", ms(25))),
        ];
        let cancel = CancellationToken::new();

        let hit = replicate(&Query::from("cats"), &backends, &cancel)
            .await
            .unwrap();
        assert_eq!(hit.backend, "b");
        assert_eq!(hit.result.as_str(), "b result for \"cats\"");

        // The same backends can be reused by a category
        let category = Category::from_shared("pets", backends);
        assert_eq!(category.len(), 2);
    }
}

//! Rate-limit gauge collection

use dockerhub_client::{LimitSource, RateLimitSample};
use metrics::{describe_gauge, gauge, with_local_recorder};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::CoreError;

pub const REMAINING_REQUESTS_METRIC: &str = "dockerhub_limit_remaining_requests_total";
pub const MAX_REQUESTS_METRIC: &str = "dockerhub_limit_max_requests_total";

/// Collects rate-limit samples and records them as gauges
///
/// The recorder is owned by the collector rather than installed as the
/// process-wide recorder, so several exporters can coexist in one process.
pub struct LimitCollector {
    source: Arc<dyn LimitSource>,
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
}

impl LimitCollector {
    /// Create a collector with its own Prometheus recorder
    pub fn new(source: Arc<dyn LimitSource>) -> Self {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        with_local_recorder(&recorder, || {
            describe_gauge!(
                REMAINING_REQUESTS_METRIC,
                "Docker Hub Rate Limit Remaining Requests"
            );
            describe_gauge!(MAX_REQUESTS_METRIC, "Docker Hub Rate Limit Maximum Requests");
        });

        Self {
            source,
            recorder,
            handle,
        }
    }

    /// Fetch a fresh sample and update the gauges
    pub async fn collect(&self) -> Result<RateLimitSample, CoreError> {
        let sample = self.source.collect().await?;

        debug!(
            "Rate limit sample: limit={} remaining={} reset={}",
            sample.limit, sample.remaining, sample.reset
        );

        self.record(&sample);
        Ok(sample)
    }

    fn record(&self, sample: &RateLimitSample) {
        with_local_recorder(&self.recorder, || {
            gauge!(REMAINING_REQUESTS_METRIC, "limit" => "remaining_requests_total")
                .set(sample.remaining as f64);
            gauge!(MAX_REQUESTS_METRIC, "limit" => "max_requests_total")
                .set(sample.limit as f64);
        });
    }

    /// Collect and render the exposition text
    ///
    /// Nothing is rendered when the collection fails.
    pub async fn scrape(&self) -> Result<String, CoreError> {
        self.collect().await?;
        Ok(self.handle.render())
    }
}

/// Spawn a background task that collects on a fixed interval
///
/// Failures are logged and the task keeps running.
pub fn spawn_poll_task(
    collector: Arc<LimitCollector>,
    period: Duration,
) -> tokio::task::JoinHandle<()> {
    use tokio::time::interval;

    info!("Starting background rate-limit poll (interval: {:?})", period);

    tokio::spawn(async move {
        let mut ticker = interval(period);

        // Skip the first tick (which fires immediately)
        ticker.tick().await;

        loop {
            ticker.tick().await;

            if let Err(e) = collector.collect().await {
                warn!("Background rate-limit collection failed: {}", e);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dockerhub_client::ClientError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticSource {
        response: Result<RateLimitSample, u16>,
        calls: AtomicUsize,
    }

    impl StaticSource {
        fn ok(limit: u64, remaining: u64) -> Arc<Self> {
            Arc::new(Self {
                response: Ok(RateLimitSample {
                    limit,
                    remaining,
                    reset: 0,
                }),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(status: u16) -> Arc<Self> {
            Arc::new(Self {
                response: Err(status),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl LimitSource for StaticSource {
        async fn collect(&self) -> Result<RateLimitSample, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response
                .map_err(|status| ClientError::Registry { status })
        }
    }

    #[tokio::test]
    async fn test_scrape_renders_both_gauges() {
        let collector = LimitCollector::new(StaticSource::ok(200, 150));

        let body = collector.scrape().await.unwrap();

        assert!(body.contains(
            "dockerhub_limit_max_requests_total{limit=\"max_requests_total\"} 200"
        ));
        assert!(body.contains(
            "dockerhub_limit_remaining_requests_total{limit=\"remaining_requests_total\"} 150"
        ));
        assert!(body.contains("# TYPE dockerhub_limit_max_requests_total gauge"));
        assert!(body.contains(
            "# HELP dockerhub_limit_remaining_requests_total Docker Hub Rate Limit Remaining Requests"
        ));
    }

    #[tokio::test]
    async fn test_every_scrape_collects() {
        let source = StaticSource::ok(100, 99);
        let collector = LimitCollector::new(source.clone());

        collector.scrape().await.unwrap();
        collector.scrape().await.unwrap();

        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_collection_is_an_error() {
        let collector = LimitCollector::new(StaticSource::failing(503));

        let result = collector.scrape().await;
        assert!(matches!(
            result,
            Err(CoreError::Client(ClientError::Registry { status: 503 }))
        ));
    }

    #[tokio::test]
    async fn test_collectors_do_not_share_gauges() {
        let first = LimitCollector::new(StaticSource::ok(100, 10));
        let second = LimitCollector::new(StaticSource::ok(200, 20));

        first.collect().await.unwrap();
        let body = second.scrape().await.unwrap();

        assert!(body.contains("{limit=\"max_requests_total\"} 200"));
        assert!(!body.contains("{limit=\"max_requests_total\"} 100"));
    }

    #[tokio::test]
    async fn test_poll_task_keeps_running_after_failures() {
        let source = StaticSource::failing(500);
        let collector = Arc::new(LimitCollector::new(source.clone()));

        let task = spawn_poll_task(collector, Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(100)).await;
        task.abort();

        assert!(source.calls.load(Ordering::SeqCst) >= 2);
    }
}

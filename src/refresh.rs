//! One refresh cycle and the loop that drives it.
//!
//! ```text
//! build_topology() ──▶ compute_metrics() ──▶ TrendEstimator::observe() ──▶ aggregate()
//!                                                                            │
//!                                          watch::Sender<Arc<MetricSnapshot>> ◀┘
//! ```
//!
//! Readers hold a [`watch::Receiver`] and only ever see complete snapshots;
//! the estimator windows never leave the refresher.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use flowscore_types::{current_timestamp_ms, keys, MetricSnapshot};
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::config::Settings;
use crate::error::Result;
use crate::graph::{GraphBuilder, DEFAULT_CRAWL_CONCURRENCY};
use crate::metrics::MetricsEngine;
use crate::score::{ScoreAggregator, ScoreWeights};
use crate::source::{paths, FlowApi};
use crate::trend::TrendEstimator;

/// Runs refresh cycles against one flow API and publishes each snapshot.
///
/// Cycles take `&mut self`, so two can never overlap on the same refresher.
#[derive(Debug)]
pub struct Refresher {
    api: Arc<dyn FlowApi>,
    root_group: String,
    concurrency: usize,
    trend: TrendEstimator,
    aggregator: ScoreAggregator,
    sender: watch::Sender<Arc<MetricSnapshot>>,
    cycles: u64,
}

impl Refresher {
    /// A refresher starting at the `root` group with default estimators.
    pub fn new(api: Arc<dyn FlowApi>) -> Self {
        let (sender, _) = watch::channel(Arc::new(MetricSnapshot::new()));
        Self {
            api,
            root_group: paths::ROOT_ALIAS.to_string(),
            concurrency: DEFAULT_CRAWL_CONCURRENCY,
            trend: TrendEstimator::default(),
            aggregator: ScoreAggregator::default(),
            sender,
            cycles: 0,
        }
    }

    /// A refresher configured from [`Settings`].
    pub fn from_settings(api: Arc<dyn FlowApi>, settings: &Settings) -> Self {
        Self::new(api)
            .with_root_group(settings.poll.root_group.clone())
            .with_concurrency(settings.poll.crawl_concurrency)
            .with_trend(TrendEstimator::new(
                settings.trend.heap_window,
                settings.cpu_window_capacity(),
                settings.trend.cpu_source,
            ))
    }

    pub fn with_root_group(mut self, root_group: impl Into<String>) -> Self {
        self.root_group = root_group.into();
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_trend(mut self, trend: TrendEstimator) -> Self {
        self.trend = trend;
        self
    }

    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.aggregator = ScoreAggregator::new(weights);
        self
    }

    /// Receiver that observes every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<MetricSnapshot>> {
        self.sender.subscribe()
    }

    /// The most recently published snapshot.
    pub fn latest(&self) -> Arc<MetricSnapshot> {
        self.sender.borrow().clone()
    }

    /// Completed cycles, successful or not.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Run one cycle and publish its snapshot.
    ///
    /// An empty topology publishes an empty snapshot and leaves the trend
    /// estimators untouched. Only a failure to resolve the root group is an
    /// error; in that case nothing is published.
    pub async fn refresh(&mut self) -> Result<Arc<MetricSnapshot>> {
        self.cycles += 1;
        let now_ms = current_timestamp_ms();

        let topology = GraphBuilder::new(self.api.as_ref())
            .with_concurrency(self.concurrency)
            .build_topology(&self.root_group)
            .await?;

        let engine = MetricsEngine::new(self.api.as_ref());
        let mut snapshot = engine
            .compute_metrics(&topology.graph, &topology.tree, topology.ports)
            .await;
        snapshot.timestamp_ms = now_ms;

        if !snapshot.is_empty() {
            let diagnostics = engine.system_diagnostics().await;
            snapshot.merge(&self.trend.observe(now_ms, diagnostics.as_ref()));

            let score = self.aggregator.aggregate(&snapshot);
            snapshot.insert(keys::FCS_SCORE, score);

            info!(
                "Refresh #{} of {}: fcsScore={:.2}, {} processors, depth {}, qbp {:.1}%",
                self.cycles,
                self.api.description(),
                score,
                snapshot.get_or_zero(keys::PROCESSOR_COUNT),
                snapshot.get_or_zero(keys::MAX_PATH_DEPTH),
                snapshot.get_or_zero(keys::QBP_PCT)
            );
        }
        debug!("Publishing snapshot with {} metrics", snapshot.len());

        let snapshot = Arc::new(snapshot);
        self.sender.send_replace(snapshot.clone());
        Ok(snapshot)
    }

    /// Refresh every `period` until `shutdown` completes.
    ///
    /// Ticks missed while a slow cycle runs are skipped, not queued. A
    /// failed cycle is logged and the loop carries on.
    pub async fn run<F>(&mut self, period: Duration, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!(
            "Polling {} every {:?} from group '{}'",
            self.api.description(),
            period,
            self.root_group
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.refresh().await {
                        error!("Refresh #{} failed: {}", self.cycles, e);
                    }
                }
                _ = &mut shutdown => {
                    info!("Shutting down after {} refresh cycles", self.cycles);
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticFlowApi;
    use crate::trend::CpuSource;
    use serde_json::{json, Value};

    fn processor(id: &str, name: &str, kind: &str) -> Value {
        json!({"status": {"aggregateSnapshot": {
            "id": id, "name": name, "type": kind, "activeThreadCount": 1
        }}})
    }

    fn diagnostics(used_mb: u64) -> Value {
        json!({"systemDiagnostics": {"aggregateSnapshot": {
            "usedHeapBytes": used_mb * 1024 * 1024,
            "maxHeapBytes": 1024u64 * 1024 * 1024,
            "processorLoadAverage": 0.5,
            "availableProcessors": 2
        }}})
    }

    fn flow_api() -> StaticFlowApi {
        StaticFlowApi::new()
            .with("/process-groups/root", json!({"id": "pg", "component": {"name": "Flow"}}))
            .with("/process-groups/pg", json!({"id": "pg", "component": {"name": "Flow"}}))
            .with("/process-groups/pg/process-groups", json!({"processGroups": []}))
            .with(
                "/process-groups/pg/processors",
                json!({"processors": [
                    processor("a", "Generate", "org.GenerateFlowFile"),
                    processor("b", "Run", "org.apache.nifi.processors.script.ExecuteScript")
                ]}),
            )
            .with(
                "/process-groups/pg/connections",
                json!({"connections": [
                    {"component": {"source": {"id": "a"}, "destination": {"id": "b"}}}
                ]}),
            )
            .with("/process-groups/pg/input-ports", json!({"inputPorts": []}))
            .with("/process-groups/pg/output-ports", json!({"outputPorts": []}))
            .with("/flow/status", json!({"connectionStatus": []}))
            .with("/process-groups/root/connections", json!({"connections": []}))
            .with("/system-diagnostics", diagnostics(256))
    }

    #[tokio::test]
    async fn test_refresh_publishes_full_snapshot() {
        let mut refresher = Refresher::new(Arc::new(flow_api()));
        let mut receiver = refresher.subscribe();

        let snapshot = refresher.refresh().await.unwrap();
        assert!(receiver.has_changed().unwrap());
        assert_eq!(*receiver.borrow_and_update(), snapshot);

        assert_eq!(snapshot.get(keys::PROCESSOR_COUNT), Some(2.0));
        assert_eq!(snapshot.get(keys::SCRIPTED_PCT), Some(50.0));
        assert_eq!(snapshot.get(keys::HEAP_USED_MB), Some(256.0));
        assert_eq!(snapshot.get(keys::HEAP_GROWTH_MB_PER_MIN), Some(0.0));
        assert_eq!(snapshot.get(keys::INSTANTANEOUS_CPU_USAGE), Some(25.0));

        // 2 processors + 0 depth + 0.5 fan-out + 2 threads + 50% scripted
        assert_eq!(snapshot.get(keys::FCS_SCORE), Some(54.5));
    }

    #[tokio::test]
    async fn test_weights_change_score() {
        let weights = ScoreWeights::default().with_scripted_pct(0.0);
        let mut refresher = Refresher::new(Arc::new(flow_api())).with_weights(weights);
        let snapshot = refresher.refresh().await.unwrap();
        assert_eq!(snapshot.get(keys::FCS_SCORE), Some(4.5));
    }

    #[tokio::test]
    async fn test_root_failure_publishes_nothing() {
        let mut refresher = Refresher::new(Arc::new(StaticFlowApi::new()));
        let receiver = refresher.subscribe();

        assert!(matches!(refresher.refresh().await, Err(crate::Error::RootFetch { .. })));
        assert!(!receiver.has_changed().unwrap());
        assert!(refresher.latest().is_empty());
        assert_eq!(refresher.cycles(), 1);
    }

    #[tokio::test]
    async fn test_empty_topology_skips_trends() {
        let api = StaticFlowApi::new()
            .with("/process-groups/root", json!({"id": "pg"}))
            .with("/process-groups/pg/process-groups", json!({"processGroups": []}))
            .with("/process-groups/pg/processors", json!({"processors": []}))
            .with("/process-groups/pg/connections", json!({"connections": []}))
            .with("/system-diagnostics", diagnostics(100));

        let mut refresher = Refresher::new(Arc::new(api));
        let snapshot = refresher.refresh().await.unwrap();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.get(keys::FCS_SCORE), None);
    }

    #[tokio::test]
    async fn test_from_settings() {
        let mut settings = Settings::default();
        settings.poll.root_group = "pg".to_string();
        settings.trend.cpu_source = CpuSource::Disabled;

        let mut refresher = Refresher::from_settings(Arc::new(flow_api()), &settings);
        let snapshot = refresher.refresh().await.unwrap();
        assert_eq!(snapshot.get(keys::PROCESSOR_COUNT), Some(2.0));
        assert_eq!(snapshot.get(keys::INSTANTANEOUS_CPU_USAGE), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_until_shutdown() {
        let mut refresher = Refresher::new(Arc::new(flow_api()));
        let receiver = refresher.subscribe();

        refresher
            .run(
                Duration::from_secs(10),
                tokio::time::sleep(Duration::from_secs(25)),
            )
            .await;

        assert_eq!(refresher.cycles(), 3);
        assert_eq!(receiver.borrow().get(keys::PROCESSOR_COUNT), Some(2.0));
    }
}

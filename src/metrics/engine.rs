//! Topology metrics assembled into a snapshot.

use flowscore_types::{keys, MetricSnapshot};
use tracing::{debug, warn};

use super::{backpressure_pct, is_scripted, SystemDiagnostics};
use crate::error::Result;
use crate::graph::{max_path_depth, GraphBuilder, PortCounts, ProcessGroupTree, ProcessorGraph};
use crate::source::FlowApi;

/// A processor with more than this many connections counts towards `ipd`.
pub const IPD_DEGREE_THRESHOLD: usize = 2;

/// Stateless per-cycle metric computation.
///
/// Holds the API only for the two on-demand facts the graphs do not carry:
/// queue backpressure and system diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct MetricsEngine<'a> {
    api: &'a dyn FlowApi,
}

impl<'a> MetricsEngine<'a> {
    pub fn new(api: &'a dyn FlowApi) -> Self {
        Self { api }
    }

    /// Compute the topology metrics for one cycle.
    ///
    /// Returns an empty snapshot when either graph is empty, meaning there
    /// is nothing to report this cycle.
    pub async fn compute_metrics(
        &self,
        graph: &ProcessorGraph,
        tree: &ProcessGroupTree,
        ports: PortCounts,
    ) -> MetricSnapshot {
        if graph.is_empty() || tree.is_empty() {
            warn!(
                "Empty topology from {} ({} processors, {} groups), nothing to report",
                self.api.description(),
                graph.len(),
                tree.len()
            );
            return MetricSnapshot::new();
        }

        let qbp_pct = backpressure_pct(self.api).await;
        structural_metrics(graph, tree, ports, qbp_pct)
    }

    pub async fn system_diagnostics(&self) -> Option<SystemDiagnostics> {
        SystemDiagnostics::fetch(self.api).await
    }
}

/// The graph-only formulas, with backpressure supplied by the caller.
pub fn structural_metrics(
    graph: &ProcessorGraph,
    tree: &ProcessGroupTree,
    ports: PortCounts,
    qbp_pct: f64,
) -> MetricSnapshot {
    let processor_count = graph.len();

    let mut total_fan_out = 0usize;
    let mut ipd = 0usize;
    let mut active_threads = 0u64;
    let mut scripted = 0usize;
    for node in graph.nodes() {
        total_fan_out += node.fan_out();
        if node.degree() > IPD_DEGREE_THRESHOLD {
            ipd += 1;
        }
        active_threads += node.active_thread_count;
        if is_scripted(node) {
            scripted += 1;
        }
    }

    let avg_fan_out = if processor_count == 0 {
        0.0
    } else {
        total_fan_out as f64 / processor_count as f64
    };
    let scripted_pct = 100.0 * scripted as f64 / processor_count.max(1) as f64;
    let processor_count_final =
        processor_count as f64 - ports.input as f64 - ports.output as f64;

    debug!(
        "{} processors ({} scripted), {} hubs, {} active threads",
        processor_count, scripted, ipd, active_threads
    );

    MetricSnapshot::builder()
        .metric(keys::PROCESSOR_COUNT, processor_count as f64)
        .metric(keys::PROCESSOR_COUNT_FINAL, processor_count_final)
        .metric(keys::MAX_PATH_DEPTH, max_path_depth(tree) as f64)
        .metric(keys::AVG_FAN_OUT, avg_fan_out)
        .metric(keys::AVG_F, avg_fan_out)
        .metric(keys::IPD, ipd as f64)
        .metric(keys::ACTIVE_THREADS, active_threads as f64)
        .metric(keys::SCRIPTED_PCT, scripted_pct)
        .metric(keys::QBP_PCT, qbp_pct)
        .metric(keys::INPUT_PORT_COUNT, ports.input as f64)
        .metric(keys::OUTPUT_PORT_COUNT, ports.output as f64)
        .build()
}

/// Structural metrics for an arbitrary process group and everything below it.
///
/// No trend or score state is involved, so this can be run ad hoc against
/// any group id (or the `root` alias).
pub async fn collect_group_metrics(
    api: &dyn FlowApi,
    group_id: &str,
    concurrency: usize,
) -> Result<MetricSnapshot> {
    let topology = GraphBuilder::new(api)
        .with_concurrency(concurrency)
        .build_topology(group_id)
        .await?;

    Ok(MetricsEngine::new(api)
        .compute_metrics(&topology.graph, &topology.tree, topology.ports)
        .await)
}

//! Recursive topology crawl over the flow API.

use std::collections::{BTreeSet, HashSet};

use futures_util::stream::{self, StreamExt};
use serde_json::Value;
use tracing::{debug, warn};

use super::{PortCounts, ProcessGroupNode, ProcessGroupTree, ProcessorGraph, ProcessorNode};
use crate::error::{Error, Result};
use crate::source::{fields, paths, FlowApi};

/// Per-group fetches in flight at once during a crawl.
pub const DEFAULT_CRAWL_CONCURRENCY: usize = 4;

/// Which kind of port to count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
    Input,
    Output,
}

impl PortDirection {
    fn path(self, group_id: &str) -> String {
        match self {
            PortDirection::Input => paths::input_ports(group_id),
            PortDirection::Output => paths::output_ports(group_id),
        }
    }

    fn field(self) -> &'static str {
        match self {
            PortDirection::Input => "inputPorts",
            PortDirection::Output => "outputPorts",
        }
    }
}

/// Both graphs and the port counts from one crawl of a group hierarchy.
#[derive(Debug, Clone)]
pub struct Topology {
    pub graph: ProcessorGraph,
    pub tree: ProcessGroupTree,
    pub ports: PortCounts,
}

/// Everything one process group contributes to the processor graph.
#[derive(Debug, Default)]
struct GroupContents {
    processors: Vec<ProcessorNode>,
    connections: Vec<(String, String)>,
}

/// Builds [`ProcessorGraph`] and [`ProcessGroupTree`] by crawling the
/// process-group hierarchy.
///
/// A failed fetch below the starting group is logged and that group's
/// contribution is dropped; the crawl always continues. Only failing to
/// fetch the starting group itself is an error.
///
/// # Example
///
/// ```
/// use flowscore::graph::GraphBuilder;
/// use flowscore::StaticFlowApi;
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let api = StaticFlowApi::new()
///     .with("/process-groups/root", json!({"id": "pg"}))
///     .with("/process-groups/pg/process-groups", json!({"processGroups": []}))
///     .with("/process-groups/pg/processors", json!({"processors": [
///         {"status": {"aggregateSnapshot": {"id": "p1", "name": "Fetch", "type": "FetchFile"}}}
///     ]}))
///     .with("/process-groups/pg/connections", json!({"connections": []}));
///
/// let graph = GraphBuilder::new(&api).build_processor_graph("root").await.unwrap();
/// assert_eq!(graph.len(), 1);
/// # });
/// ```
#[derive(Debug, Clone, Copy)]
pub struct GraphBuilder<'a> {
    api: &'a dyn FlowApi,
    concurrency: usize,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(api: &'a dyn FlowApi) -> Self {
        Self {
            api,
            concurrency: DEFAULT_CRAWL_CONCURRENCY,
        }
    }

    /// Set how many per-group fetches may run concurrently (minimum 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Fetch the starting group and return its canonical id and document.
    ///
    /// `group_id` may be the `root` alias; the returned id is the real one.
    pub async fn resolve_group(&self, group_id: &str) -> Result<(String, Value)> {
        let document = self
            .api
            .fetch(&paths::group(group_id))
            .await
            .map_err(|source| Error::RootFetch {
                id: group_id.to_string(),
                source,
            })?;

        let id = fields::text_at(&document, &["id"])
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::RootMissingId(group_id.to_string()))?;

        Ok((id, document))
    }

    /// Build the processor graph for `root_group_id` and every nested group.
    ///
    /// An empty id yields an empty graph without touching the API.
    pub async fn build_processor_graph(&self, root_group_id: &str) -> Result<ProcessorGraph> {
        if root_group_id.is_empty() {
            return Ok(ProcessorGraph::new());
        }
        let (root_id, _) = self.resolve_group(root_group_id).await?;
        let group_ids = self.crawl(&root_id).await;
        Ok(self.processor_graph_for(&group_ids).await)
    }

    /// Build the containment tree rooted at `root_group_id`.
    pub async fn build_process_group_tree(&self, root_group_id: &str) -> Result<ProcessGroupTree> {
        if root_group_id.is_empty() {
            return Ok(ProcessGroupTree::new(""));
        }
        let (root_id, root_document) = self.resolve_group(root_group_id).await?;
        let (tree, _) = self.crawl_hierarchy(&root_id, root_document).await;
        Ok(tree)
    }

    /// Count distinct ports of `direction` in `root_group_id` and every nested group.
    pub async fn count_ports(&self, direction: PortDirection, root_group_id: &str) -> Result<usize> {
        if root_group_id.is_empty() {
            return Ok(0);
        }
        let (root_id, _) = self.resolve_group(root_group_id).await?;
        let group_ids = self.crawl(&root_id).await;
        Ok(self.count_ports_for(direction, &group_ids).await)
    }

    /// Resolve `root_group_id` once and build everything a refresh needs.
    ///
    /// The hierarchy is crawled once. Its pre-order group ids feed the
    /// processor graph and both port counts, so all three cover the same groups.
    pub async fn build_topology(&self, root_group_id: &str) -> Result<Topology> {
        if root_group_id.is_empty() {
            return Ok(Topology {
                graph: ProcessorGraph::new(),
                tree: ProcessGroupTree::new(""),
                ports: PortCounts::default(),
            });
        }
        let (root_id, root_document) = self.resolve_group(root_group_id).await?;
        let (tree, group_ids) = self.crawl_hierarchy(&root_id, root_document).await;

        let graph = self.processor_graph_for(&group_ids).await;
        let ports = PortCounts {
            input: self.count_ports_for(PortDirection::Input, &group_ids).await,
            output: self.count_ports_for(PortDirection::Output, &group_ids).await,
        };

        debug!(
            "Crawled {} groups under {}: {} processors, {} input / {} output ports",
            group_ids.len(),
            root_id,
            graph.len(),
            ports.input,
            ports.output
        );
        Ok(Topology { graph, tree, ports })
    }

    /// Depth-first pre-order list of `root_group_id` and all nested group ids.
    ///
    /// Does not fetch the root document itself. A group reached a second
    /// time (diamond or cycle in the API response) is not expanded again.
    pub async fn crawl(&self, root_group_id: &str) -> Vec<String> {
        let mut order = Vec::new();
        if root_group_id.is_empty() {
            return order;
        }

        let mut seen = HashSet::new();
        let mut stack = vec![root_group_id.to_string()];

        while let Some(group_id) = stack.pop() {
            if !seen.insert(group_id.clone()) {
                debug!("Process group {} reached twice, not expanding again", group_id);
                continue;
            }

            match self.api.fetch(&paths::child_groups(&group_id)).await {
                Ok(document) => {
                    let children: Vec<String> = fields::array(&document, "processGroups")
                        .iter()
                        .filter_map(fields::entity_id)
                        .collect();
                    // Reversed so the first child is popped first
                    stack.extend(children.into_iter().rev());
                }
                Err(e) => {
                    warn!("Error crawling child process groups for {}: {}", group_id, e);
                }
            }

            order.push(group_id);
        }

        order
    }

    /// Build the processor graph from an already crawled list of group ids.
    pub async fn processor_graph_for(&self, group_ids: &[String]) -> ProcessorGraph {
        let contents: Vec<GroupContents> = stream::iter(group_ids)
            .map(|group_id| self.group_contents(group_id))
            .buffered(self.concurrency)
            .collect()
            .await;

        // Folded in crawl order so the result does not depend on fetch timing
        let mut graph = ProcessorGraph::new();
        for group in contents {
            for processor in group.processors {
                graph.upsert(processor);
            }
            for (source, destination) in &group.connections {
                graph.connect(source, destination);
            }
        }

        graph
    }

    /// Count distinct ports across an already crawled list of group ids.
    pub async fn count_ports_for(&self, direction: PortDirection, group_ids: &[String]) -> usize {
        let per_group: Vec<Vec<String>> = stream::iter(group_ids)
            .map(|group_id| self.port_ids(direction, group_id))
            .buffered(self.concurrency)
            .collect()
            .await;

        per_group.into_iter().flatten().collect::<BTreeSet<_>>().len()
    }

    async fn group_contents(&self, group_id: &str) -> GroupContents {
        let mut contents = GroupContents::default();

        let processors = match self.api.fetch(&paths::processors(group_id)).await {
            Ok(document) => document,
            Err(e) => {
                warn!("Error processing process group {}: {}", group_id, e);
                return contents;
            }
        };
        if !fields::has_array(&processors, "processors") {
            warn!("Process group {} returned no processors list", group_id);
        }
        contents.processors = fields::array(&processors, "processors")
            .iter()
            .filter_map(parse_processor)
            .collect();

        let connections = match self.api.fetch(&paths::connections(group_id)).await {
            Ok(document) => document,
            Err(e) => {
                warn!("Error processing connections of process group {}: {}", group_id, e);
                return contents;
            }
        };
        contents.connections = fields::array(&connections, "connections")
            .iter()
            .filter_map(parse_connection)
            .collect();

        debug!(
            "Process group {}: {} processors, {} connections",
            group_id,
            contents.processors.len(),
            contents.connections.len()
        );
        contents
    }

    async fn port_ids(&self, direction: PortDirection, group_id: &str) -> Vec<String> {
        match self.api.fetch(&direction.path(group_id)).await {
            Ok(document) => fields::array(&document, direction.field())
                .iter()
                .filter_map(fields::entity_id)
                .collect(),
            Err(e) => {
                warn!("Error listing {} of process group {}: {}", direction.field(), group_id, e);
                Vec::new()
            }
        }
    }

    /// Containment tree plus the pre-order ids of every group visited.
    ///
    /// A group whose document cannot be read is still listed but not expanded.
    async fn crawl_hierarchy(
        &self,
        root_id: &str,
        root_document: Value,
    ) -> (ProcessGroupTree, Vec<String>) {
        let mut tree = ProcessGroupTree::new(root_id);
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![root_id.to_string()];
        let mut root_document = Some(root_document);

        while let Some(group_id) = stack.pop() {
            if !seen.insert(group_id.clone()) {
                continue;
            }
            order.push(group_id.clone());

            let document = match root_document.take() {
                Some(document) if group_id == root_id => document,
                _ => match self.api.fetch(&paths::group(&group_id)).await {
                    Ok(document) => document,
                    Err(e) => {
                        warn!("Error fetching process group {}: {}", group_id, e);
                        continue;
                    }
                },
            };
            if !document.is_object() {
                debug!("Process group {} returned a non-object document", group_id);
                continue;
            }

            let name = fields::text_at(&document, &["component", "name"])
                .unwrap_or_else(|| "-".to_string());
            let mut node = ProcessGroupNode::new(group_id.clone(), name);

            match self.api.fetch(&paths::child_groups(&group_id)).await {
                Ok(children) => {
                    node.children = fields::array(&children, "processGroups")
                        .iter()
                        .filter_map(fields::entity_id)
                        .collect();
                    stack.extend(
                        node.children
                            .iter()
                            .rev()
                            .filter(|child| !seen.contains(*child))
                            .cloned(),
                    );
                }
                Err(e) => {
                    warn!("Error crawling child process groups for {}: {}", group_id, e);
                }
            }

            tree.insert(node);
        }

        (tree, order)
    }
}

// Processor entry: prefer status.aggregateSnapshot, fall back to the entity itself
fn parse_processor(entry: &Value) -> Option<ProcessorNode> {
    let snapshot = fields::at(entry, &["status", "aggregateSnapshot"]);
    let from_snapshot = |key: &str| snapshot.and_then(|s| fields::text_at(s, &[key]));

    let id = from_snapshot("id")
        .or_else(|| fields::entity_id(entry))
        .filter(|id| !id.is_empty())?;
    let name = from_snapshot("name").or_else(|| fields::text_at(entry, &["component", "name"]));
    let kind = from_snapshot("type").or_else(|| fields::text_at(entry, &["component", "type"]));
    let threads = snapshot
        .and_then(|s| fields::u64_at(s, &["activeThreadCount"]))
        .or_else(|| fields::u64_at(entry, &["status", "activeThreadCount"]))
        .unwrap_or(0);

    Some(ProcessorNode::new(id, name, kind).with_active_threads(threads))
}

fn parse_connection(entry: &Value) -> Option<(String, String)> {
    let component = entry.get("component")?;
    let source = fields::text_at(component, &["source", "id"]).filter(|id| !id.is_empty())?;
    let destination =
        fields::text_at(component, &["destination", "id"]).filter(|id| !id.is_empty())?;
    Some((source, destination))
}

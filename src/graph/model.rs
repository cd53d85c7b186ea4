//! Graph data models.
//!
//! Both graphs are rebuilt from scratch on every refresh cycle; nothing here
//! carries identity across cycles.

use std::collections::{BTreeMap, BTreeSet};

/// Name given to processors that are only known from a connection source.
pub const UNKNOWN_SOURCE_NAME: &str = "unknown-src";
/// Name given to processors that are only known from a connection destination.
pub const UNKNOWN_DESTINATION_NAME: &str = "unknown-dst";
pub const DEFAULT_NAME: &str = "-";
pub const DEFAULT_TYPE: &str = "unknown";

/// A processor, port or funnel in the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorNode {
    pub id: String,
    /// Display name, `"-"` when the API gave none.
    pub name: String,
    /// Fully qualified processor type, `"unknown"` when the API gave none.
    pub kind: String,
    /// Destination ids of outgoing connections.
    pub outgoing: BTreeSet<String>,
    /// Source ids of incoming connections.
    pub incoming: BTreeSet<String>,
    /// Last observed active thread count.
    pub active_thread_count: u64,
}

impl ProcessorNode {
    pub fn new(id: impl Into<String>, name: Option<String>, kind: Option<String>) -> Self {
        Self {
            id: id.into(),
            name: name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
            kind: kind.unwrap_or_else(|| DEFAULT_TYPE.to_string()),
            outgoing: BTreeSet::new(),
            incoming: BTreeSet::new(),
            active_thread_count: 0,
        }
    }

    pub fn with_active_threads(mut self, count: u64) -> Self {
        self.active_thread_count = count;
        self
    }

    /// Number of outgoing connections.
    pub fn fan_out(&self) -> usize {
        self.outgoing.len()
    }

    /// Incoming plus outgoing connections.
    pub fn degree(&self) -> usize {
        self.incoming.len() + self.outgoing.len()
    }
}

/// Processors keyed by id.
///
/// Every id referenced by any node's `incoming`/`outgoing` set is itself a
/// key: [`ProcessorGraph::connect`] materialises unseen endpoints as
/// placeholders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessorGraph {
    nodes: BTreeMap<String, ProcessorNode>,
}

impl ProcessorGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a declared processor.
    ///
    /// If the id is already present (for example as a placeholder created by
    /// an earlier connection) its name, type and thread count are replaced
    /// and its edges are kept.
    pub fn upsert(&mut self, node: ProcessorNode) {
        match self.nodes.get_mut(&node.id) {
            Some(existing) => {
                existing.name = node.name;
                existing.kind = node.kind;
                existing.active_thread_count = node.active_thread_count;
                existing.outgoing.extend(node.outgoing);
                existing.incoming.extend(node.incoming);
            }
            None => {
                self.nodes.insert(node.id.clone(), node);
            }
        }
    }

    /// Record a connection `source -> destination`.
    pub fn connect(&mut self, source: &str, destination: &str) {
        self.nodes.entry(source.to_string()).or_insert_with(|| {
            ProcessorNode::new(
                source,
                Some(UNKNOWN_SOURCE_NAME.to_string()),
                Some(DEFAULT_TYPE.to_string()),
            )
        });
        self.nodes.entry(destination.to_string()).or_insert_with(|| {
            ProcessorNode::new(
                destination,
                Some(UNKNOWN_DESTINATION_NAME.to_string()),
                Some(DEFAULT_TYPE.to_string()),
            )
        });

        if let Some(node) = self.nodes.get_mut(source) {
            node.outgoing.insert(destination.to_string());
        }
        if let Some(node) = self.nodes.get_mut(destination) {
            node.incoming.insert(source.to_string());
        }
    }

    pub fn get(&self, id: &str) -> Option<&ProcessorNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &ProcessorNode> {
        self.nodes.values()
    }
}

/// Distinct input and output ports across a crawled hierarchy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortCounts {
    pub input: usize,
    pub output: usize,
}

/// A process group and the ids of its direct children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessGroupNode {
    pub id: String,
    pub name: String,
    pub children: Vec<String>,
}

impl ProcessGroupNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            children: Vec::new(),
        }
    }
}

/// The process-group containment hierarchy.
///
/// Expected to be a tree, but never trusted to be one: consumers must guard
/// against cycles (see [`crate::graph::max_path_depth`]).
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessGroupTree {
    root_id: String,
    groups: BTreeMap<String, ProcessGroupNode>,
}

impl ProcessGroupTree {
    pub fn new(root_id: impl Into<String>) -> Self {
        Self {
            root_id: root_id.into(),
            groups: BTreeMap::new(),
        }
    }

    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    pub fn insert(&mut self, node: ProcessGroupNode) {
        self.groups.insert(node.id.clone(), node);
    }

    pub fn get(&self, id: &str) -> Option<&ProcessGroupNode> {
        self.groups.get(id)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &String> {
        self.groups.keys()
    }

    pub fn groups(&self) -> impl Iterator<Item = &ProcessGroupNode> {
        self.groups.values()
    }
}

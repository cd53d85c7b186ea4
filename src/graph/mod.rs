//! Topology reconstruction.
//!
//! Turns the tree of paginated process-group documents into two typed graphs:
//!
//! - [`ProcessorGraph`]: processors (and connection endpoints) with their
//!   incoming/outgoing edges
//! - [`ProcessGroupTree`]: the process-group containment hierarchy
//!
//! ## Data Flow
//!
//! ```text
//! /process-groups/{root}
//!        │
//!        ▼
//! GraphBuilder::crawl()  ──▶ [pg ids, pre-order]
//!        │
//!        ├──▶ processor_graph_for()  ──▶ ProcessorGraph
//!        ├──▶ count_ports_for()      ──▶ input / output port counts
//!        └──▶ build_process_group_tree() ──▶ ProcessGroupTree ──▶ max_path_depth()
//! ```

mod builder;
mod depth;
mod model;

pub use builder::{GraphBuilder, PortDirection, Topology, DEFAULT_CRAWL_CONCURRENCY};
pub use depth::{max_path_depth, DepthResolver};
pub use model::{PortCounts, ProcessGroupNode, ProcessGroupTree, ProcessorGraph, ProcessorNode};

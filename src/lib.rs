//! # flowscore
//!
//! Flow complexity and runtime-health scoring for data-flow orchestration
//! engines exposing a NiFi-style REST API.
//!
//! Each refresh crawls the process-group hierarchy, rebuilds the processor
//! graph and the containment tree, derives structural metrics from them,
//! folds heap and CPU samples into streaming trend estimators and combines
//! everything into a single Flow Complexity Score.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                            Refresher                             │
//! │  ┌─────────┐   ┌─────────┐   ┌─────────┐   ┌───────┐   ┌───────┐ │
//! │  │  graph  │──▶│ metrics │──▶│  trend  │──▶│ score │──▶│ watch │ │
//! │  │ (crawl) │   │(formulas)   │(windows)│   │ (fcs) │   │channel│ │
//! │  └────┬────┘   └────┬────┘   └─────────┘   └───────┘   └───────┘ │
//! │       │             │                                            │
//! │       ▼             ▼                                            │
//! │  ┌──────────────────────┐                                        │
//! │  │ source (FlowApi)     │◀── NifiAdapter | StaticFlowApi         │
//! │  └──────────────────────┘                                        │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: the [`FlowApi`] trait ("fetch the JSON at this path") with
//!   an HTTP implementation and an in-memory one
//! - **[`graph`]**: [`GraphBuilder`](graph::GraphBuilder) and the processor
//!   graph and process-group tree it produces
//! - **[`metrics`]**: depth, fan-out, hub count, scriptedness and backpressure
//! - **[`trend`]**: heap growth regression and CPU spike detection, the only
//!   state kept between cycles
//! - **[`score`]**: the weighted Flow Complexity Score
//! - **[`refresh`]**: one cycle end to end, and the polling loop
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Poll a NiFi instance every 30 seconds
//! flowscore --endpoint https://nifi:8443/nifi-api --token "$NIFI_TOKEN"
//!
//! # One cycle, printed as JSON
//! flowscore --once
//!
//! # Structural metrics of one process group
//! flowscore --group 3f2a1c4e-0187-1000-ffff-ffffd1e2b3c4
//! ```
//!
//! ### As a library
//!
//! ```
//! use std::sync::Arc;
//! use flowscore::{keys, Refresher, StaticFlowApi};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let api = StaticFlowApi::new()
//!     .with("/process-groups/root", json!({"id": "pg"}))
//!     .with("/process-groups/pg/process-groups", json!({"processGroups": []}))
//!     .with("/process-groups/pg/processors", json!({"processors": [
//!         {"status": {"aggregateSnapshot": {"id": "p1", "name": "Fetch", "type": "FetchFile"}}}
//!     ]}))
//!     .with("/process-groups/pg/connections", json!({"connections": []}));
//!
//! let mut refresher = Refresher::new(Arc::new(api));
//! let snapshot = refresher.refresh().await.unwrap();
//! assert_eq!(snapshot.get(keys::PROCESSOR_COUNT), Some(1.0));
//! assert!(snapshot.get(keys::FCS_SCORE).is_some());
//! # });
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod metrics;
pub mod refresh;
pub mod score;
pub mod source;
pub mod trend;

// Re-export main types for convenience
pub use config::Settings;
pub use error::{Error, Result};
pub use flowscore_types::{keys, MetricSnapshot, SchemaVersion};
pub use metrics::{collect_group_metrics, MetricsEngine};
pub use refresh::Refresher;
pub use score::{ScoreAggregator, ScoreWeights};
pub use source::{AdapterError, FlowApi, StaticFlowApi};
pub use trend::{CpuSource, TrendEstimator};

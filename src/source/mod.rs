//! Flow API abstraction for fetching topology documents.
//!
//! Everything downstream of this module sees the remote engine only as
//! "fetch the JSON document at this path". Transport concerns (auth headers,
//! TLS, timeouts) belong to the implementation.

pub mod fields;
mod fixture;
mod http;

pub use fixture::StaticFlowApi;

use std::fmt::Debug;

use async_trait::async_trait;
use serde_json::Value;

pub use flowscore_adapters::AdapterError;

/// Trait for fetching loosely typed JSON documents from the flow API.
///
/// Implementations must enforce their own request timeout: a fetch that
/// never returns stalls the refresh cycle that issued it.
///
/// # Example
///
/// ```
/// use flowscore::{FlowApi, StaticFlowApi};
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let api = StaticFlowApi::new().with("/process-groups/root", json!({"id": "pg-1"}));
/// let root = api.fetch("/process-groups/root").await.unwrap();
/// assert_eq!(root["id"], "pg-1");
/// # });
/// ```
#[async_trait]
pub trait FlowApi: Send + Sync + Debug {
    /// Fetch the document at `path`, relative to the API root.
    async fn fetch(&self, path: &str) -> Result<Value, AdapterError>;

    /// Returns a human-readable description of the API being polled.
    ///
    /// Used in log lines.
    fn description(&self) -> &str;
}

/// REST paths consumed by the engine.
pub mod paths {
    pub const ROOT_ALIAS: &str = "root";
    pub const FLOW_STATUS: &str = "/flow/status";
    pub const SYSTEM_DIAGNOSTICS: &str = "/system-diagnostics";
    pub const ROOT_CONNECTIONS: &str = "/process-groups/root/connections";

    pub fn group(id: &str) -> String {
        format!("/process-groups/{}", id)
    }

    pub fn child_groups(id: &str) -> String {
        format!("/process-groups/{}/process-groups", id)
    }

    pub fn processors(id: &str) -> String {
        format!("/process-groups/{}/processors", id)
    }

    pub fn connections(id: &str) -> String {
        format!("/process-groups/{}/connections", id)
    }

    pub fn input_ports(id: &str) -> String {
        format!("/process-groups/{}/input-ports", id)
    }

    pub fn output_ports(id: &str) -> String {
        format!("/process-groups/{}/output-ports", id)
    }
}

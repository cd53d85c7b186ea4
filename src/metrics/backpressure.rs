//! Queue backpressure percentage.

use serde_json::Value;
use tracing::warn;

use crate::source::{fields, paths, AdapterError, FlowApi};

/// Percentage of connections whose queued count meets or exceeds their
/// backpressure object threshold.
///
/// Connections come from the flow status document; only when that yields
/// none does this fall back to the root group's own connection listing.
/// Any fetch failure degrades to 0.0.
pub async fn backpressure_pct(api: &dyn FlowApi) -> f64 {
    match connection_statuses(api).await {
        Ok(connections) => backpressure_pct_of(&connections),
        Err(e) => {
            warn!("Error computing backpressure percent: {}", e);
            0.0
        }
    }
}

/// Backpressure percentage over already fetched connection entries.
///
/// 0.0 when there are no connections.
pub fn backpressure_pct_of(connections: &[Value]) -> f64 {
    if connections.is_empty() {
        return 0.0;
    }
    let over = connections.iter().filter(|c| is_over_threshold(c)).count();
    100.0 * over as f64 / connections.len() as f64
}

async fn connection_statuses(api: &dyn FlowApi) -> Result<Vec<Value>, AdapterError> {
    let status = api.fetch(paths::FLOW_STATUS).await?;
    let connections = fields::array(&status, "connectionStatus");
    if !connections.is_empty() {
        return Ok(connections.to_vec());
    }

    let root = api.fetch(paths::ROOT_CONNECTIONS).await?;
    Ok(fields::array(&root, "connections").to_vec())
}

// An absent threshold is infinite; a zero threshold disables backpressure
fn is_over_threshold(entry: &Value) -> bool {
    let component = entry.get("component").unwrap_or(entry);

    let queued = fields::u64_at(component, &["queuedCount"])
        .or_else(|| fields::u64_at(entry, &["status", "aggregateSnapshot", "queuedCount"]))
        .unwrap_or(0);
    let threshold = fields::u64_at(component, &["backPressureObjectThreshold"]);

    threshold.is_some_and(|t| t > 0 && queued >= t)
}

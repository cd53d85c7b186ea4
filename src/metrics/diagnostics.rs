//! Heap and load figures from the system diagnostics document.

use serde_json::Value;
use tracing::{debug, warn};

use crate::source::{fields, paths, FlowApi};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// The parts of `systemDiagnostics.aggregateSnapshot` the engine uses.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SystemDiagnostics {
    pub used_heap_bytes: u64,
    pub max_heap_bytes: u64,
    /// The API's own utilisation figure, kept only for cross-checking.
    pub reported_heap_utilization: Option<f64>,
    pub processor_load_average: Option<f64>,
    pub available_processors: Option<u64>,
}

impl SystemDiagnostics {
    /// Fetch and parse `/system-diagnostics`. Failures are logged and yield `None`.
    pub async fn fetch(api: &dyn FlowApi) -> Option<Self> {
        match api.fetch(paths::SYSTEM_DIAGNOSTICS).await {
            Ok(document) => {
                let parsed = Self::from_document(&document);
                if parsed.is_none() {
                    warn!("System diagnostics response has no aggregateSnapshot");
                }
                parsed
            }
            Err(e) => {
                warn!("Failed to fetch system diagnostics: {}", e);
                None
            }
        }
    }

    pub fn from_document(document: &Value) -> Option<Self> {
        let snapshot = fields::at(document, &["systemDiagnostics", "aggregateSnapshot"])?;
        if !snapshot.is_object() {
            return None;
        }

        let diagnostics = Self {
            used_heap_bytes: fields::u64_at(snapshot, &["usedHeapBytes"]).unwrap_or(0),
            max_heap_bytes: fields::u64_at(snapshot, &["maxHeapBytes"]).unwrap_or(0),
            reported_heap_utilization: fields::text_at(snapshot, &["heapUtilization"])
                .and_then(|s| s.trim().trim_end_matches('%').trim().parse().ok()),
            processor_load_average: fields::f64_at(snapshot, &["processorLoadAverage"]),
            available_processors: fields::u64_at(snapshot, &["availableProcessors"]),
        };

        if let Some(reported) = diagnostics.reported_heap_utilization {
            let computed = diagnostics.heap_utilization_pct();
            if (reported - computed).abs() > 1.0 {
                debug!(
                    "Reported heap utilisation {:.2}% differs from used/max {:.2}%",
                    reported, computed
                );
            }
        }

        Some(diagnostics)
    }

    pub fn used_heap_mb(&self) -> f64 {
        self.used_heap_bytes as f64 / BYTES_PER_MB
    }

    pub fn max_heap_mb(&self) -> f64 {
        self.max_heap_bytes as f64 / BYTES_PER_MB
    }

    /// `used / max * 100`, or 0.0 when max is unknown.
    pub fn heap_utilization_pct(&self) -> f64 {
        if self.max_heap_bytes == 0 {
            return 0.0;
        }
        100.0 * self.used_heap_bytes as f64 / self.max_heap_bytes as f64
    }

    /// Load average per core as a percentage, if both figures are present.
    pub fn load_cpu_pct(&self) -> Option<f64> {
        let load = self.processor_load_average.filter(|l| l.is_finite() && *l >= 0.0)?;
        let cores = self.available_processors.filter(|c| *c > 0)?;
        Some(100.0 * load / cores as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticFlowApi;
    use serde_json::json;

    fn document() -> Value {
        json!({"systemDiagnostics": {"aggregateSnapshot": {
            "usedHeapBytes": 512 * 1024 * 1024u64,
            "maxHeapBytes": 2048 * 1024 * 1024u64,
            "heapUtilization": "25.0%",
            "processorLoadAverage": 2.0,
            "availableProcessors": 8
        }}})
    }

    #[test]
    fn test_parse() {
        let diag = SystemDiagnostics::from_document(&document()).unwrap();
        assert_eq!(diag.used_heap_mb(), 512.0);
        assert_eq!(diag.max_heap_mb(), 2048.0);
        assert_eq!(diag.heap_utilization_pct(), 25.0);
        assert_eq!(diag.reported_heap_utilization, Some(25.0));
        assert_eq!(diag.load_cpu_pct(), Some(25.0));
    }

    #[test]
    fn test_missing_snapshot() {
        assert!(SystemDiagnostics::from_document(&json!({"systemDiagnostics": {}})).is_none());
        assert!(SystemDiagnostics::from_document(&json!({})).is_none());
    }

    #[test]
    fn test_zero_max_heap() {
        let diag = SystemDiagnostics::default();
        assert_eq!(diag.heap_utilization_pct(), 0.0);
        assert_eq!(diag.load_cpu_pct(), None);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_none() {
        let api = StaticFlowApi::new().with_failure("/system-diagnostics");
        assert!(SystemDiagnostics::fetch(&api).await.is_none());

        let api = StaticFlowApi::new().with("/system-diagnostics", document());
        assert!(SystemDiagnostics::fetch(&api).await.is_some());
    }
}

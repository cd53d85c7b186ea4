//! MetricSnapshot - a point-in-time view of derived flow metrics.

use std::collections::BTreeMap;

use crate::SchemaVersion;

/// A point-in-time snapshot of every derived metric.
///
/// Produced once per refresh cycle and handed to exporters by value. An
/// empty snapshot (no values) means the cycle had nothing meaningful to
/// report, e.g. the topology crawl found no processors.
///
/// # Example
///
/// ```rust
/// use flowscore_types::{keys, MetricSnapshot};
///
/// let snapshot = MetricSnapshot::builder()
///     .metric(keys::QBP_PCT, 25.0)
///     .build();
///
/// assert_eq!(snapshot.len(), 1);
/// assert_eq!(snapshot.get_or_zero(keys::FCS_SCORE), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricSnapshot {
    /// Schema version for forward compatibility.
    pub version: SchemaVersion,

    /// Unix timestamp in milliseconds when this snapshot was taken.
    pub timestamp_ms: u64,

    /// Metric values keyed by name (see [`crate::keys`]).
    pub values: BTreeMap<String, f64>,
}

impl MetricSnapshot {
    /// Create an empty snapshot with the current timestamp.
    pub fn new() -> Self {
        Self::with_timestamp(current_timestamp_ms())
    }

    /// Create an empty snapshot with a specific timestamp.
    pub fn with_timestamp(timestamp_ms: u64) -> Self {
        Self {
            version: SchemaVersion::current(),
            timestamp_ms,
            values: BTreeMap::new(),
        }
    }

    pub fn builder() -> MetricSnapshotBuilder {
        MetricSnapshotBuilder::new()
    }

    /// True if no metric could be computed.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    /// Value for `key`, or 0.0 if absent.
    pub fn get_or_zero(&self, key: &str) -> f64 {
        self.get(key).unwrap_or(0.0)
    }

    /// Insert or overwrite a value.
    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        self.values.insert(key.into(), value);
    }

    /// Copy every value from `other` into this snapshot, overwriting on conflict.
    pub fn merge(&mut self, other: &MetricSnapshot) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), *value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.values.iter()
    }
}

impl Default for MetricSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing `MetricSnapshot` instances.
#[derive(Debug)]
pub struct MetricSnapshotBuilder {
    timestamp_ms: Option<u64>,
    values: BTreeMap<String, f64>,
}

impl MetricSnapshotBuilder {
    pub fn new() -> Self {
        Self {
            timestamp_ms: None,
            values: BTreeMap::new(),
        }
    }

    /// Set a specific timestamp (milliseconds since Unix epoch).
    pub fn timestamp_ms(mut self, ts: u64) -> Self {
        self.timestamp_ms = Some(ts);
        self
    }

    pub fn metric(mut self, key: impl Into<String>, value: f64) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    pub fn build(self) -> MetricSnapshot {
        MetricSnapshot {
            version: SchemaVersion::current(),
            timestamp_ms: self.timestamp_ms.unwrap_or_else(current_timestamp_ms),
            values: self.values,
        }
    }
}

impl Default for MetricSnapshotBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Get current timestamp in milliseconds since Unix epoch.
pub fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys;

    #[test]
    fn test_snapshot_builder() {
        let snapshot = MetricSnapshot::builder()
            .timestamp_ms(1703160000000)
            .metric(keys::PROCESSOR_COUNT, 4.0)
            .metric(keys::IPD, 1.0)
            .build();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.timestamp_ms, 1703160000000);
        assert_eq!(snapshot.get(keys::IPD), Some(1.0));
        assert_eq!(snapshot.get(keys::QBP_PCT), None);
        assert!(snapshot.version.is_compatible());
    }

    #[test]
    fn test_merge_overwrites() {
        let mut base = MetricSnapshot::builder()
            .metric(keys::HEAP_USED_MB, 10.0)
            .metric(keys::IPD, 2.0)
            .build();
        let update = MetricSnapshot::builder().metric(keys::HEAP_USED_MB, 12.5).build();

        base.merge(&update);

        assert_eq!(base.get(keys::HEAP_USED_MB), Some(12.5));
        assert_eq!(base.get(keys::IPD), Some(2.0));
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = MetricSnapshot::with_timestamp(5);
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.get_or_zero(keys::FCS_SCORE), 0.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serialized_keys_are_flat() {
        let snapshot = MetricSnapshot::builder()
            .timestamp_ms(1703160000000)
            .metric(keys::FCS_SCORE, 42.5)
            .build();

        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["values"]["fcsScore"], 42.5);
        assert_eq!(json["version"]["major"], 1);
    }
}

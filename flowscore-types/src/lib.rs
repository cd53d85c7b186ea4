//! # flowscore-types
//!
//! The produced interface of flowscore: a flat, versioned map from metric
//! name to value, plus the fixed vocabulary of metric names.
//!
//! Downstream exporters (gauge registries, file writers, dashboards) consume
//! [`MetricSnapshot`] verbatim and rely only on key stability. Every key the
//! engine can emit is a constant in [`keys`].
//!
//! ## Features
//!
//! - `serde`: JSON/etc. serialization via serde
//!
//! ## Example
//!
//! ```rust
//! use flowscore_types::{keys, MetricSnapshot};
//!
//! let snapshot = MetricSnapshot::builder()
//!     .timestamp_ms(1703160000000)
//!     .metric(keys::PROCESSOR_COUNT, 12.0)
//!     .metric(keys::MAX_PATH_DEPTH, 3.0)
//!     .build();
//!
//! assert_eq!(snapshot.get(keys::PROCESSOR_COUNT), Some(12.0));
//! ```

pub mod keys;
mod snapshot;
mod version;

pub use snapshot::*;
pub use version::*;

/// Current schema version.
///
/// Bump when a key is renamed or removed. Adding keys is a minor change.
pub const SCHEMA_VERSION: u32 = 1;

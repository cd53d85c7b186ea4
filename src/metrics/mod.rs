//! Derived scalar metrics over the reconstructed graphs.
//!
//! - [`engine`]: the topology formulas (depth, fan-out, ipd, scriptedness)
//!   assembled into a [`MetricSnapshot`](flowscore_types::MetricSnapshot)
//! - [`backpressure`]: percentage of connections at or over their queue threshold
//! - [`classify`]: scripted-processor detection
//! - [`diagnostics`]: heap and load figures from the system diagnostics document

pub mod backpressure;
pub mod classify;
pub mod diagnostics;
pub mod engine;

pub use backpressure::{backpressure_pct, backpressure_pct_of};
pub use classify::{contains_expression_language, is_scripted, is_scripted_type};
pub use diagnostics::SystemDiagnostics;
pub use engine::{collect_group_metrics, structural_metrics, MetricsEngine, IPD_DEGREE_THRESHOLD};

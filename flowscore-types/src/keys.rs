//! The fixed metric key vocabulary.
//!
//! Exporters key gauges and spreadsheet columns off these strings, so they
//! are part of the public contract. Two pairs are aliases kept for consumers
//! of older snapshots: [`AVG_F`] mirrors [`AVG_FAN_OUT`] and
//! [`SPIKE_RECOVERY_TIME_SEC`] mirrors [`SPIKE_RECOVERY_TIME_MS`] in seconds.

// Topology
pub const PROCESSOR_COUNT: &str = "processorCount";
pub const PROCESSOR_COUNT_FINAL: &str = "processorCountFinal";
pub const MAX_PATH_DEPTH: &str = "maxPathDepth";
pub const AVG_FAN_OUT: &str = "avgFanOut";
pub const AVG_F: &str = "avgF";
pub const IPD: &str = "ipd";
pub const ACTIVE_THREADS: &str = "activeThreads";
pub const SCRIPTED_PCT: &str = "scriptedPct";
pub const QBP_PCT: &str = "qbpPct";
pub const INPUT_PORT_COUNT: &str = "inputPortCount";
pub const OUTPUT_PORT_COUNT: &str = "outputPortCount";

// Heap
pub const HEAP_USED_MB: &str = "heapUsedMb";
pub const HEAP_MAX_MB: &str = "heapMaxMb";
pub const HEAP_UTILIZATION_PCT: &str = "heapUtilizationPct";
pub const HEAP_GROWTH_MB_PER_MIN: &str = "heapGrowthMbPerMin";

// CPU
pub const WINDOW_AVG_CPU_USAGE: &str = "windowAvgCpuUsage";
pub const INSTANTANEOUS_CPU_USAGE: &str = "instantaneousCpuUsage";
pub const SPIKE_RECOVERY_TIME_MS: &str = "spikeRecoveryTimeMs";
pub const SPIKE_RECOVERY_TIME_SEC: &str = "spikeRecoveryTimeSec";

// Aggregate
pub const FCS_SCORE: &str = "fcsScore";

/// Keys produced from the topology crawl, in a stable display order.
pub const TOPOLOGY: &[&str] = &[
    PROCESSOR_COUNT,
    PROCESSOR_COUNT_FINAL,
    MAX_PATH_DEPTH,
    AVG_FAN_OUT,
    AVG_F,
    IPD,
    ACTIVE_THREADS,
    SCRIPTED_PCT,
    QBP_PCT,
    INPUT_PORT_COUNT,
    OUTPUT_PORT_COUNT,
];

/// Keys produced by the trend estimators.
pub const TRENDS: &[&str] = &[
    HEAP_USED_MB,
    HEAP_MAX_MB,
    HEAP_UTILIZATION_PCT,
    HEAP_GROWTH_MB_PER_MIN,
    WINDOW_AVG_CPU_USAGE,
    INSTANTANEOUS_CPU_USAGE,
    SPIKE_RECOVERY_TIME_MS,
    SPIKE_RECOVERY_TIME_SEC,
];

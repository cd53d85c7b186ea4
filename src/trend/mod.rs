//! Streaming trend estimators.
//!
//! The only state that survives between refresh cycles lives here: the heap
//! sample window behind the growth regression and the CPU window behind the
//! spike detector. Each cycle feeds one observation and gets back the trend
//! keys of the snapshot.

mod cpu;
mod heap;
mod probe;
mod window;

pub use cpu::{CpuReading, SpikeDetector, SpikeState, MIN_SPIKE_THRESHOLD, SPIKE_THRESHOLD_FACTOR};
pub use heap::{least_squares_slope, HeapGrowthEstimator, DEFAULT_HEAP_WINDOW, SMOOTHING_FACTOR};
pub use probe::{CpuSampler, CpuSource, HostCpuProbe};
pub use window::{Sample, TimeSeriesWindow};

use std::time::Duration;

use flowscore_types::{keys, MetricSnapshot};

use crate::metrics::SystemDiagnostics;

/// CPU history the spike detector averages over.
pub const DEFAULT_CPU_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// Number of CPU samples covering `window` at one sample per `interval`.
pub fn cpu_window_capacity(window: Duration, interval: Duration) -> usize {
    let interval_ms = interval.as_millis().max(1);
    (window.as_millis() / interval_ms).max(1) as usize
}

/// Heap growth and CPU spike estimators, fed once per refresh.
#[derive(Debug)]
pub struct TrendEstimator {
    heap: HeapGrowthEstimator,
    cpu: SpikeDetector,
    sampler: CpuSampler,
    last_cpu: Option<CpuReading>,
}

impl TrendEstimator {
    pub fn new(heap_window: usize, cpu_window: usize, cpu_source: CpuSource) -> Self {
        Self {
            heap: HeapGrowthEstimator::new(heap_window),
            cpu: SpikeDetector::new(cpu_window),
            sampler: CpuSampler::new(cpu_source),
            last_cpu: None,
        }
    }

    /// Feed one cycle's diagnostics and return the trend metrics.
    ///
    /// `heapGrowthMbPerMin` is always present. Heap figures need diagnostics.
    /// `instantaneousCpuUsage` is only present when the configured source
    /// produced a sample this cycle. The window average and spike recovery
    /// time carry over from the last sample taken.
    pub fn observe(&mut self, now_ms: u64, diagnostics: Option<&SystemDiagnostics>) -> MetricSnapshot {
        let mut snapshot = MetricSnapshot::with_timestamp(now_ms);

        if let Some(diag) = diagnostics {
            self.heap.observe(now_ms, diag.used_heap_bytes);
            snapshot.insert(keys::HEAP_USED_MB, diag.used_heap_mb());
            snapshot.insert(keys::HEAP_MAX_MB, diag.max_heap_mb());
            snapshot.insert(keys::HEAP_UTILIZATION_PCT, diag.heap_utilization_pct());
        }
        snapshot.insert(keys::HEAP_GROWTH_MB_PER_MIN, self.heap.growth_mb_per_min());

        if let Some(cpu_pct) = self.sampler.sample(diagnostics) {
            let reading = self.cpu.observe(now_ms, cpu_pct);
            snapshot.insert(keys::INSTANTANEOUS_CPU_USAGE, reading.instantaneous);
            self.last_cpu = Some(reading);
        }
        if let Some(reading) = self.last_cpu {
            snapshot.insert(keys::WINDOW_AVG_CPU_USAGE, reading.window_average);
            snapshot.insert(keys::SPIKE_RECOVERY_TIME_MS, reading.recovery_ms as f64);
            snapshot.insert(keys::SPIKE_RECOVERY_TIME_SEC, reading.recovery_ms as f64 / 1000.0);
        }

        snapshot
    }

    pub fn heap_growth_mb_per_min(&self) -> f64 {
        self.heap.growth_mb_per_min()
    }

    pub fn spike_state(&self) -> SpikeState {
        self.cpu.state()
    }
}

impl Default for TrendEstimator {
    fn default() -> Self {
        Self::new(
            DEFAULT_HEAP_WINDOW,
            cpu_window_capacity(DEFAULT_CPU_WINDOW, Duration::from_secs(30)),
            CpuSource::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MB: u64 = 1024 * 1024;

    fn diagnostics(used_mb: u64, load: f64) -> SystemDiagnostics {
        SystemDiagnostics {
            used_heap_bytes: used_mb * MB,
            max_heap_bytes: 1024 * MB,
            reported_heap_utilization: None,
            processor_load_average: Some(load),
            available_processors: Some(1),
        }
    }

    #[test]
    fn test_cpu_window_capacity() {
        let day = Duration::from_secs(86_400);
        assert_eq!(cpu_window_capacity(day, Duration::from_secs(30)), 2_880);
        assert_eq!(cpu_window_capacity(Duration::from_secs(1), Duration::from_secs(60)), 1);
        assert_eq!(cpu_window_capacity(day, Duration::ZERO), 86_400_000);
    }

    #[test]
    fn test_observe_emits_trend_keys() {
        let mut trend = TrendEstimator::new(20, 10, CpuSource::Diagnostics);
        let first = trend.observe(0, Some(&diagnostics(256, 0.1)));
        assert_eq!(first.get(keys::HEAP_USED_MB), Some(256.0));
        assert_eq!(first.get(keys::HEAP_UTILIZATION_PCT), Some(25.0));
        assert_eq!(first.get(keys::HEAP_GROWTH_MB_PER_MIN), Some(0.0));
        assert_eq!(first.get(keys::INSTANTANEOUS_CPU_USAGE), Some(10.0));
        assert_eq!(first.get(keys::SPIKE_RECOVERY_TIME_MS), Some(0.0));

        let second = trend.observe(60_000, Some(&diagnostics(266, 0.1)));
        assert!((second.get_or_zero(keys::HEAP_GROWTH_MB_PER_MIN) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_diagnostics_keeps_growth() {
        let mut trend = TrendEstimator::new(20, 10, CpuSource::Disabled);
        trend.observe(0, Some(&diagnostics(100, 0.0)));
        trend.observe(60_000, Some(&diagnostics(160, 0.0)));

        let snapshot = trend.observe(120_000, None);
        assert!((snapshot.get_or_zero(keys::HEAP_GROWTH_MB_PER_MIN) - 60.0).abs() < 1e-9);
        assert_eq!(snapshot.get(keys::HEAP_USED_MB), None);
        assert_eq!(snapshot.get(keys::INSTANTANEOUS_CPU_USAGE), None);
    }

    #[test]
    fn test_spike_recovery_reported_in_both_units() {
        let mut trend = TrendEstimator::new(20, 100, CpuSource::Diagnostics);
        for i in 0..20u64 {
            trend.observe(i * 1_000, Some(&diagnostics(100, 0.1)));
        }
        trend.observe(20_000, Some(&diagnostics(100, 0.9)));
        assert!(trend.spike_state().is_spiking());

        let snapshot = trend.observe(22_500, Some(&diagnostics(100, 0.1)));
        assert_eq!(snapshot.get(keys::SPIKE_RECOVERY_TIME_MS), Some(2_500.0));
        assert_eq!(snapshot.get(keys::SPIKE_RECOVERY_TIME_SEC), Some(2.5));
    }

    #[test]
    fn test_unsampled_cycle_has_no_instantaneous_cpu() {
        let mut trend = TrendEstimator::new(20, 10, CpuSource::Diagnostics);
        let sampled = trend.observe(0, Some(&diagnostics(100, 0.1)));
        assert_eq!(sampled.get(keys::INSTANTANEOUS_CPU_USAGE), Some(10.0));

        let unsampled = trend.observe(1_000, None);
        assert_eq!(unsampled.get(keys::INSTANTANEOUS_CPU_USAGE), None);
        assert_eq!(unsampled.get(keys::WINDOW_AVG_CPU_USAGE), Some(10.0));
        assert_eq!(unsampled.get(keys::SPIKE_RECOVERY_TIME_MS), Some(0.0));
    }
}

//! Adaptive CPU spike detection.

use tracing::debug;

use super::TimeSeriesWindow;

/// A sample above `window average * SPIKE_THRESHOLD_FACTOR` is a spike.
pub const SPIKE_THRESHOLD_FACTOR: f64 = 1.2;

/// Floor for the adaptive threshold, in percent.
pub const MIN_SPIKE_THRESHOLD: f64 = 1.0;

/// Spike state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpikeState {
    #[default]
    Normal,
    /// A spike in progress since the given timestamp.
    Spiking { since_ms: u64 },
}

impl SpikeState {
    pub fn is_spiking(&self) -> bool {
        matches!(self, SpikeState::Spiking { .. })
    }
}

/// What the detector reports after each sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpuReading {
    pub instantaneous: f64,
    pub window_average: f64,
    pub threshold: f64,
    pub state: SpikeState,
    /// Duration of the last completed spike, 0 while one is in progress.
    pub recovery_ms: u64,
}

/// Tracks CPU utilisation samples and classifies spikes against a
/// threshold derived from the window average.
#[derive(Debug, Clone)]
pub struct SpikeDetector {
    window: TimeSeriesWindow,
    state: SpikeState,
    recovery_ms: u64,
}

impl SpikeDetector {
    pub fn new(capacity: usize) -> Self {
        Self {
            window: TimeSeriesWindow::new(capacity),
            state: SpikeState::Normal,
            recovery_ms: 0,
        }
    }

    /// Record a CPU percentage sample taken at `timestamp_ms`.
    ///
    /// The sample is judged against the average of the samples before it
    /// and only then joins the window. On an empty window the sample is its
    /// own average, so the first sample never spikes.
    pub fn observe(&mut self, timestamp_ms: u64, cpu_pct: f64) -> CpuReading {
        let window_average = self.window.mean().unwrap_or(cpu_pct);
        let threshold = (window_average * SPIKE_THRESHOLD_FACTOR).max(MIN_SPIKE_THRESHOLD);
        let above = cpu_pct > threshold;
        self.window.push(timestamp_ms, cpu_pct);

        match self.state {
            SpikeState::Normal if above => {
                debug!("CPU spike: {:.2}% over threshold {:.2}%", cpu_pct, threshold);
                self.state = SpikeState::Spiking { since_ms: timestamp_ms };
                self.recovery_ms = 0;
            }
            SpikeState::Spiking { since_ms } if !above => {
                self.recovery_ms = timestamp_ms.saturating_sub(since_ms);
                debug!("CPU spike recovered after {} ms", self.recovery_ms);
                self.state = SpikeState::Normal;
            }
            _ => {}
        }

        CpuReading {
            instantaneous: cpu_pct,
            window_average,
            threshold,
            state: self.state,
            recovery_ms: self.recovery_ms,
        }
    }

    pub fn state(&self) -> SpikeState {
        self.state
    }

    pub fn recovery_ms(&self) -> u64 {
        self.recovery_ms
    }
}

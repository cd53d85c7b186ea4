//! Heap growth as a smoothed least-squares slope.

use super::TimeSeriesWindow;

/// Heap samples kept for the regression.
pub const DEFAULT_HEAP_WINDOW: usize = 20;

/// Weight of the newest slope in the exponential smoothing.
pub const SMOOTHING_FACTOR: f64 = 0.3;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const MS_PER_MINUTE: f64 = 60_000.0;
const DEGENERATE_DENOMINATOR: f64 = 1e-12;
const NEGLIGIBLE_MINUTES: f64 = 1e-9;

/// Ordinary least-squares slope of value against minutes since the first sample.
///
/// Falls back to the first-to-last delta when the fit is degenerate, and
/// returns `None` with fewer than two samples or no elapsed time.
pub fn least_squares_slope(window: &TimeSeriesWindow) -> Option<f64> {
    if window.len() < 2 {
        return None;
    }
    let first = *window.first()?;
    let last = *window.last()?;
    let minutes_since = |ts: u64| ts.saturating_sub(first.timestamp_ms) as f64 / MS_PER_MINUTE;

    let n = window.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
    for sample in window.iter() {
        let x = minutes_since(sample.timestamp_ms);
        let y = sample.value;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }

    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator.abs() > DEGENERATE_DENOMINATOR {
        return Some((n * sum_xy - sum_x * sum_y) / denominator);
    }

    let minutes = minutes_since(last.timestamp_ms);
    if minutes < NEGLIGIBLE_MINUTES {
        return None;
    }
    Some((last.value - first.value) / minutes)
}

/// Streaming heap growth estimate in MB per minute.
#[derive(Debug, Clone)]
pub struct HeapGrowthEstimator {
    window: TimeSeriesWindow,
    smoothed: Option<f64>,
}

impl HeapGrowthEstimator {
    pub fn new(capacity: usize) -> Self {
        Self {
            window: TimeSeriesWindow::new(capacity),
            smoothed: None,
        }
    }

    /// Record a used-heap sample and update the smoothed growth rate.
    ///
    /// The first computable slope is taken as-is; later ones are blended
    /// with [`SMOOTHING_FACTOR`].
    pub fn observe(&mut self, timestamp_ms: u64, used_heap_bytes: u64) -> f64 {
        self.window.push(timestamp_ms, used_heap_bytes as f64);

        if let Some(bytes_per_minute) = least_squares_slope(&self.window) {
            let mb_per_minute = bytes_per_minute / BYTES_PER_MB;
            self.smoothed = Some(match self.smoothed {
                Some(previous) => {
                    SMOOTHING_FACTOR * mb_per_minute + (1.0 - SMOOTHING_FACTOR) * previous
                }
                None => mb_per_minute,
            });
        }

        self.growth_mb_per_min()
    }

    /// The current smoothed rate, 0.0 until a slope has been computed.
    pub fn growth_mb_per_min(&self) -> f64 {
        self.smoothed.unwrap_or(0.0)
    }

    pub fn window(&self) -> &TimeSeriesWindow {
        &self.window
    }
}

impl Default for HeapGrowthEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_HEAP_WINDOW)
    }
}

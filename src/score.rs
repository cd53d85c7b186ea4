//! Flow complexity score.
//!
//! A weighted sum over a fixed set of snapshot keys. The default weights are
//! named constants so each term can be re-tuned on its own.

use flowscore_types::{keys, MetricSnapshot};

/// Weight of `processorCountFinal`.
pub const ALPHA: f64 = 1.0;
/// Weight of `maxPathDepth`.
pub const BETA: f64 = 1.0;
/// Weight of `avgFanOut`.
pub const GAMMA: f64 = 1.0;
/// Weight of `activeThreads`.
pub const DELTA: f64 = 1.0;
/// Weight of `scriptedPct`.
pub const EPSILON: f64 = 1.0;
/// Weight of `qbpPct`.
pub const ZETA: f64 = 1.0;
/// Weight of `heapGrowthMbPerMin`.
pub const ETA: f64 = 1.0;

/// Per-term weights of the score. Negative weights are clamped to 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub processor_count_final: f64,
    pub max_path_depth: f64,
    pub avg_fan_out: f64,
    pub active_threads: f64,
    pub scripted_pct: f64,
    pub qbp_pct: f64,
    pub heap_growth_mb_per_min: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            processor_count_final: ALPHA,
            max_path_depth: BETA,
            avg_fan_out: GAMMA,
            active_threads: DELTA,
            scripted_pct: EPSILON,
            qbp_pct: ZETA,
            heap_growth_mb_per_min: ETA,
        }
    }
}

impl ScoreWeights {
    pub fn with_processor_count_final(mut self, weight: f64) -> Self {
        self.processor_count_final = weight.max(0.0);
        self
    }

    pub fn with_max_path_depth(mut self, weight: f64) -> Self {
        self.max_path_depth = weight.max(0.0);
        self
    }

    pub fn with_avg_fan_out(mut self, weight: f64) -> Self {
        self.avg_fan_out = weight.max(0.0);
        self
    }

    pub fn with_active_threads(mut self, weight: f64) -> Self {
        self.active_threads = weight.max(0.0);
        self
    }

    pub fn with_scripted_pct(mut self, weight: f64) -> Self {
        self.scripted_pct = weight.max(0.0);
        self
    }

    pub fn with_qbp_pct(mut self, weight: f64) -> Self {
        self.qbp_pct = weight.max(0.0);
        self
    }

    pub fn with_heap_growth(mut self, weight: f64) -> Self {
        self.heap_growth_mb_per_min = weight.max(0.0);
        self
    }

    /// `(key, weight)` for every contributing term.
    pub fn terms(&self) -> [(&'static str, f64); 7] {
        [
            (keys::PROCESSOR_COUNT_FINAL, self.processor_count_final),
            (keys::MAX_PATH_DEPTH, self.max_path_depth),
            (keys::AVG_FAN_OUT, self.avg_fan_out),
            (keys::ACTIVE_THREADS, self.active_threads),
            (keys::SCRIPTED_PCT, self.scripted_pct),
            (keys::QBP_PCT, self.qbp_pct),
            (keys::HEAP_GROWTH_MB_PER_MIN, self.heap_growth_mb_per_min),
        ]
    }
}

/// Combines a snapshot into the single `fcsScore` value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreAggregator {
    weights: ScoreWeights,
}

impl ScoreAggregator {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Weighted sum of the contributing metrics; absent keys count as 0.
    pub fn aggregate(&self, snapshot: &MetricSnapshot) -> f64 {
        self.weights
            .terms()
            .iter()
            .map(|(key, weight)| weight * snapshot.get_or_zero(key))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> MetricSnapshot {
        MetricSnapshot::builder()
            .metric(keys::PROCESSOR_COUNT, 12.0)
            .metric(keys::PROCESSOR_COUNT_FINAL, 10.0)
            .metric(keys::MAX_PATH_DEPTH, 2.0)
            .metric(keys::AVG_FAN_OUT, 1.5)
            .metric(keys::AVG_F, 1.5)
            .metric(keys::ACTIVE_THREADS, 4.0)
            .metric(keys::SCRIPTED_PCT, 20.0)
            .metric(keys::QBP_PCT, 50.0)
            .metric(keys::HEAP_GROWTH_MB_PER_MIN, 0.5)
            .build()
    }

    #[test]
    fn test_default_weights_sum_terms() {
        // processorCount and the avgF alias do not contribute
        let score = ScoreAggregator::default().aggregate(&snapshot());
        assert!((score - 88.0).abs() < 1e-9);
    }

    #[test]
    fn test_reweighting_one_term() {
        let weights = ScoreWeights::default().with_qbp_pct(0.0).with_max_path_depth(10.0);
        let score = ScoreAggregator::new(weights).aggregate(&snapshot());
        assert!((score - 56.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_weight_clamped() {
        let weights = ScoreWeights::default().with_scripted_pct(-3.0);
        assert_eq!(weights.scripted_pct, 0.0);
    }

    #[test]
    fn test_empty_snapshot_scores_zero() {
        assert_eq!(ScoreAggregator::default().aggregate(&MetricSnapshot::new()), 0.0);
    }
}

//! Bounded FIFO of timestamped samples.

use std::collections::VecDeque;

/// One `(timestamp, value)` observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Unix epoch milliseconds.
    pub timestamp_ms: u64,
    pub value: f64,
}

/// A window holding at most `capacity` samples; the oldest is evicted first.
#[derive(Debug, Clone)]
pub struct TimeSeriesWindow {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl TimeSeriesWindow {
    /// Create an empty window. A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity.min(4096)),
            capacity,
        }
    }

    /// Append a sample, evicting from the front once over capacity.
    pub fn push(&mut self, timestamp_ms: u64, value: f64) {
        self.samples.push_back(Sample { timestamp_ms, value });
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> Option<&Sample> {
        self.samples.front()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// Arithmetic mean of the values, `None` when empty.
    pub fn mean(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let sum: f64 = self.samples.iter().map(|s| s.value).sum();
        Some(sum / self.samples.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_oldest() {
        let mut window = TimeSeriesWindow::new(3);
        for i in 0..5u64 {
            window.push(i, i as f64);
        }
        assert_eq!(window.len(), 3);
        assert_eq!(window.first().unwrap().timestamp_ms, 2);
        assert_eq!(window.last().unwrap().value, 4.0);
        assert_eq!(window.mean(), Some(3.0));
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let mut window = TimeSeriesWindow::new(0);
        window.push(1, 1.0);
        window.push(2, 2.0);
        assert_eq!(window.capacity(), 1);
        assert_eq!(window.len(), 1);
        assert!(TimeSeriesWindow::new(4).mean().is_none());
    }
}

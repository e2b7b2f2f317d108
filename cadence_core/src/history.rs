// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rolling window of recent durations with percentile queries.

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use crate::time::Duration;

/// Number of samples each history keeps unless configured otherwise.
pub const DEFAULT_HISTORY_CAPACITY: usize = 60;

/// A fixed-capacity FIFO of recent [`Duration`] samples for one pipeline
/// quantity.
///
/// Inserting past capacity evicts the oldest sample. Percentiles depend only
/// on the multiset of retained samples, never on insertion order.
#[derive(Clone, Debug)]
pub struct RollingDurationEstimator {
    samples: VecDeque<Duration>,
    capacity: usize,
}

impl RollingDurationEstimator {
    /// Creates an empty history holding at most `capacity` samples.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "history capacity must be positive");
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a sample, evicting the oldest one if the window is full.
    pub fn insert_sample(&mut self, sample: Duration) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Returns the sample at percentile `percent` (0–100).
    ///
    /// Selects rank `ceil(percent / 100 * n)` (1-based) over the sorted
    /// samples, clamped to the valid range. An empty history yields
    /// [`Duration::ZERO`].
    #[must_use]
    pub fn percentile(&self, percent: f64) -> Duration {
        let n = self.samples.len();
        if n == 0 {
            return Duration::ZERO;
        }

        let mut sorted: Vec<Duration> = self.samples.iter().copied().collect();
        sorted.sort_unstable();

        let fraction = percent / 100.0;
        if fraction <= 0.0 {
            return sorted[0];
        }
        if fraction >= 1.0 {
            return sorted[n - 1];
        }

        #[expect(
            clippy::cast_possible_truncation,
            reason = "fraction is in (0, 1) so the rank is in 1..=n"
        )]
        let rank = libm::ceil(fraction * n as f64) as usize;
        sorted[rank.saturating_sub(1).min(n - 1)]
    }

    /// Removes every sample. Capacity is unchanged.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Returns the number of retained samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns `true` if no samples are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the maximum number of retained samples.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for RollingDurationEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(values: &[u64]) -> RollingDurationEstimator {
        let mut h = RollingDurationEstimator::new(DEFAULT_HISTORY_CAPACITY);
        for &v in values {
            h.insert_sample(Duration(v));
        }
        h
    }

    #[test]
    fn empty_history_is_zero_at_every_percentile() {
        let h = RollingDurationEstimator::default();
        for p in [0.0, 1.0, 50.0, 90.0, 99.9, 100.0] {
            assert_eq!(h.percentile(p), Duration::ZERO, "p={p}");
        }
    }

    #[test]
    fn cleared_history_is_zero_and_keeps_capacity() {
        let mut h = filled(&[5, 10, 15]);
        h.clear();
        assert!(h.is_empty());
        assert_eq!(h.capacity(), DEFAULT_HISTORY_CAPACITY);
        assert_eq!(h.percentile(100.0), Duration::ZERO);
        assert_eq!(h.percentile(0.0), Duration::ZERO);
    }

    #[test]
    fn percentile_uses_ceiling_rank() {
        // 10 samples: 1..=10.
        let h = filled(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        assert_eq!(h.percentile(0.0), Duration(1));
        assert_eq!(h.percentile(5.0), Duration(1)); // ceil(0.5) = 1
        assert_eq!(h.percentile(10.0), Duration(1));
        assert_eq!(h.percentile(11.0), Duration(2)); // ceil(1.1) = 2
        assert_eq!(h.percentile(50.0), Duration(5));
        assert_eq!(h.percentile(90.0), Duration(9));
        assert_eq!(h.percentile(91.0), Duration(10));
        assert_eq!(h.percentile(100.0), Duration(10));
    }

    #[test]
    fn single_sample_answers_every_percentile() {
        let h = filled(&[42]);
        assert_eq!(h.percentile(0.0), Duration(42));
        assert_eq!(h.percentile(50.0), Duration(42));
        assert_eq!(h.percentile(100.0), Duration(42));
    }

    #[test]
    fn percentile_is_independent_of_insertion_order() {
        let forward = [3, 1, 4, 1, 5, 9, 2, 6, 5, 3, 5];
        let mut reversed = forward;
        reversed.reverse();
        let mut rotated = forward;
        rotated.rotate_left(4);

        let a = filled(&forward);
        let b = filled(&reversed);
        let c = filled(&rotated);
        for p in 0..=100 {
            let p = f64::from(p);
            assert_eq!(a.percentile(p), b.percentile(p), "p={p}");
            assert_eq!(a.percentile(p), c.percentile(p), "p={p}");
        }
    }

    #[test]
    fn eviction_keeps_most_recent_window() {
        let mut h = RollingDurationEstimator::new(4);
        // Large values first so that eviction is visible through the max.
        for v in [100, 90, 1, 2, 3, 4] {
            h.insert_sample(Duration(v));
        }
        assert_eq!(h.len(), 4);
        assert_eq!(h.percentile(100.0), Duration(4));
        assert_eq!(h.percentile(0.0), Duration(1));
    }

    #[test]
    fn default_capacity_evicts_after_sixty() {
        let mut h = RollingDurationEstimator::default();
        let values: Vec<u64> = (1..=70).rev().collect();
        for &v in &values {
            h.insert_sample(Duration(v));
        }
        // The last 60 inserted are 60..=1.
        assert_eq!(h.len(), DEFAULT_HISTORY_CAPACITY);
        assert_eq!(h.percentile(100.0), Duration(60));
    }

    #[test]
    #[should_panic(expected = "history capacity must be positive")]
    fn zero_capacity_is_rejected() {
        let _ = RollingDurationEstimator::new(0);
    }
}
